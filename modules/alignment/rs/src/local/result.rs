use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use paraseq_core_rs::shared::Shape;

use super::Alignment;

/// Bookkeeping of a finished alignment job.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Constructor, Getters)]
pub struct Summary {
    shape: Shape,
    antidiagonals: usize,
    /// Cells holding the maximum score that were traced back. Zero when the job took
    /// the zero-score shortcut.
    start_cells: usize,
    /// Alignments reconstructed by all workers, duplicates included.
    paths: usize,
}

/// Best local alignment score and every alignment attaining it.
#[derive(Clone, PartialEq, Eq, Debug, Constructor, Getters, Dissolve)]
pub struct Outcome {
    score: u32,
    /// Unique alignments in no particular order, see [`Outcome::canonical`].
    alignments: Vec<Alignment>,
    summary: Summary,
}

impl Outcome {
    /// Sorts alignments by start positions and aligned strings.
    pub fn canonical(mut self) -> Self {
        self.alignments.sort();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }
}
