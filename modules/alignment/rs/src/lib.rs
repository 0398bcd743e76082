pub use error::{Error, Phase};
pub use local::find_local_alignments;
pub use scoring::Scoring;

mod error;
pub mod local;
mod scoring;
