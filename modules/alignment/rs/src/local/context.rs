use paraseq_core_rs::shared::Shape;

use crate::Scoring;

/// Immutable inputs of a single alignment job, shared by every task of the job.
///
/// The target spans the matrix columns and the query spans the rows; both carry an
/// extra leading gap row/column.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Context<'a> {
    target: &'a [u8],
    query: &'a [u8],
    scoring: Scoring,
}

impl<'a> Context<'a> {
    pub fn new(target: &'a [u8], query: &'a [u8], scoring: Scoring) -> Self {
        Self {
            target,
            query,
            scoring,
        }
    }

    pub fn target(&self) -> &'a [u8] {
        self.target
    }

    pub fn query(&self) -> &'a [u8] {
        self.query
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    /// Shape of the score and direction matrices: (|query| + 1) x (|target| + 1).
    pub fn shape(&self) -> Shape {
        Shape::new(self.query.len() + 1, self.target.len() + 1)
    }
}
