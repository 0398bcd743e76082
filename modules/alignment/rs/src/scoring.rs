use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

/// Linear scoring scheme of a local alignment.
///
/// All values are non-negative: `mismatch` and `gap` are subtracted from the running
/// score, `match_score` is added to it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Constructor, Getters, Dissolve)]
pub struct Scoring {
    match_score: u32,
    mismatch: u32,
    gap: u32,
}

impl Scoring {
    /// Score of aligning `a` against `b`.
    #[inline(always)]
    pub fn substitution(&self, a: u8, b: u8) -> i64 {
        if a == b {
            self.match_score as i64
        } else {
            -(self.mismatch as i64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let scoring = Scoring::new(3, 2, 1);
        assert_eq!(scoring.substitution(b'A', b'A'), 3);
        assert_eq!(scoring.substitution(b'A', b'C'), -2);
        assert_eq!(scoring.substitution(b'N', b'N'), 3);
        assert_eq!(*scoring.gap(), 1);
        assert_eq!(scoring.dissolve(), (3, 2, 1));
    }
}
