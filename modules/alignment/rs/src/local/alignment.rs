use std::fmt::{Display, Formatter};

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

/// An optimal local alignment.
///
/// Start positions are 1-based coordinates of the first aligned symbol in the original
/// sequences, and '-' marks a gap in either aligned string. The derived ordering (by
/// start positions, then aligned strings) is the canonical order of reported alignments.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Constructor, Getters, Dissolve)]
pub struct Alignment {
    target_start: usize,
    query_start: usize,
    target: String,
    query: String,
}

impl Alignment {
    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// The same alignment with target and query roles exchanged.
    pub fn swapped(&self) -> Self {
        Self {
            target_start: self.query_start,
            query_start: self.target_start,
            target: self.query.clone(),
            query: self.target.clone(),
        }
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Target start pos: {}", self.target_start)?;
        writeln!(f, "Query start pos: {}", self.query_start)?;
        writeln!(f, "Target sequence: {}", self.target)?;
        write!(f, "Query sequence:  {}", self.query)
    }
}
