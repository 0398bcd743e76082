use derive_more::{Display, Error};

use paraseq_core_rs::shared::{Shape, StoreError};

/// Stage of an alignment job.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum Phase {
    #[display("fill")]
    Fill,
    #[display("backtrack")]
    Backtrack,
}

/// Failures of an alignment job. None of them leaves a usable partial result.
#[derive(Debug, Display, Error)]
pub enum Error {
    #[display("shared matrix store failed")]
    Store(StoreError),
    #[display("matrices of shape {actual} can't hold an alignment of shape {expected}")]
    ShapeMismatch { expected: Shape, actual: Shape },
    #[display("score of cell ({x}, {y}) doesn't fit into the score matrix")]
    ScoreOverflow { x: usize, y: usize },
    #[display("cell ({x}, {y}) has a positive score but no traceback direction")]
    BrokenTrace { x: usize, y: usize },
    #[display("worker failed during the {phase} phase: {reason}")]
    WorkerFailure { phase: Phase, reason: String },
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        Error::Store(value)
    }
}
