//! Named shared buffers for workers of a single job.
//!
//! The owner allocates a buffer under a unique name, workers attach to it by name, and
//! the owner destroys it once everyone has released their views:
//!
//! ```
//! use paraseq_core_rs::shared::{Shape, Store};
//!
//! let store = Store::new();
//! let owner = store.allocate::<u32>("scores", Shape::new(2, 3)).unwrap();
//! let worker = store.attach::<u32>("scores").unwrap();
//! worker.set(1, 2, 5).unwrap();
//! assert_eq!(owner.get(1, 2).unwrap(), 5);
//!
//! store.release(worker, false).unwrap();
//! store.release(owner, true).unwrap();
//! assert!(!store.contains("scores"));
//! ```

pub use element::Element;
pub use error::StoreError;
pub use matrix::{Handle, Shape};
pub use store::Store;

mod element;
mod error;
mod matrix;
mod store;
