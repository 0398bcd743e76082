//! All optimal local alignments of two sequences with linear gap penalties.
//!
//! The score and direction matrices are filled one antidiagonal at a time, with the
//! cells of each antidiagonal computed in parallel. Every cell holding the maximum score
//! is then traced back in parallel, following all recorded moves, and the resulting
//! alignments are deduplicated.

pub use aggregate::Aggregator;
pub use alignment::Alignment;
pub use cell::{score_cell, Directions, Move};
pub use context::Context;
pub use engine::{find_local_alignments, Engine, EngineBuilder};
pub use matrices::{Matrices, MatrixNames};
pub use result::{Outcome, Summary};
pub use traceback::Backtracker;
pub use wavefront::{antidiagonal, antidiagonals, Fill, Wavefront};

use crate::Error;

mod aggregate;
mod alignment;
mod cell;
mod context;
mod engine;
mod matrices;
mod result;
mod traceback;
mod wavefront;

pub(crate) fn ensure_shape(ctx: &Context<'_>, matrices: &Matrices) -> Result<(), Error> {
    let expected = ctx.shape();
    for actual in [matrices.score.shape(), matrices.directions.shape()] {
        if actual != expected {
            return Err(Error::ShapeMismatch { expected, actual });
        }
    }
    Ok(())
}
