use derive_more::{Display, Error};

use super::Shape;

/// Failures of the shared matrix store.
///
/// `AlreadyAllocated` and `EmptyShape` are allocation errors, `NotFound` means a worker
/// tried to attach before allocation or after destruction. Both are lifecycle bugs
/// that abort the job before any computation starts.
#[derive(Clone, PartialEq, Eq, Debug, Display, Error)]
pub enum StoreError {
    #[display("buffer '{name}' is already allocated")]
    AlreadyAllocated { name: String },
    #[display("buffer '{name}' can't be allocated with an empty shape {shape}")]
    EmptyShape { name: String, shape: Shape },
    #[display("buffer '{name}' is not registered")]
    NotFound { name: String },
    #[display("buffer '{name}' holds {actual} items, but {requested} items were requested")]
    TypeMismatch {
        name: String,
        requested: &'static str,
        actual: &'static str,
    },
    #[display("buffer '{name}' is still attached by {handles} other handle(s)")]
    InUse { name: String, handles: usize },
    #[display("cell ({row}, {col}) is outside of buffer '{name}' with shape {shape}")]
    OutOfBounds {
        name: String,
        row: usize,
        col: usize,
        shape: Shape,
    },
}

impl StoreError {
    /// True for errors raised while allocating a new buffer.
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            StoreError::AlreadyAllocated { .. } | StoreError::EmptyShape { .. }
        )
    }
}
