use derive_more::{BitOr, BitOrAssign, From, Into};

use super::{Context, Matrices};
use crate::Error;

/// Set of traceback moves that attained a cell's score. Ties keep several bits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, BitOr, BitOrAssign, From, Into)]
pub struct Directions(u8);

impl Directions {
    pub const NONE: Directions = Directions(0);
    /// Gap in the target, the cell above.
    pub const UP: Directions = Directions(1);
    /// Match or mismatch, the cell above and to the left.
    pub const DIAG: Directions = Directions(2);
    /// Gap in the query, the cell to the left.
    pub const LEFT: Directions = Directions(4);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Directions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Moves encoded in the set, in the UP, DIAG, LEFT order.
    pub fn moves(self) -> impl Iterator<Item = Move> {
        [Move::Up, Move::Diag, Move::Left]
            .into_iter()
            .filter(move |step| self.contains(step.direction()))
    }
}

/// A single traceback step.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    Up,
    Diag,
    Left,
}

impl Move {
    pub fn direction(self) -> Directions {
        match self {
            Move::Up => Directions::UP,
            Move::Diag => Directions::DIAG,
            Move::Left => Directions::LEFT,
        }
    }

    /// Coordinates of the predecessor of cell (x, y) along this move.
    pub fn origin(self, x: usize, y: usize) -> Option<(usize, usize)> {
        match self {
            Move::Up => Some((x, y.checked_sub(1)?)),
            Move::Diag => Some((x.checked_sub(1)?, y.checked_sub(1)?)),
            Move::Left => Some((x.checked_sub(1)?, y)),
        }
    }
}

/// Computes and commits the score and directions of cell (x, y).
///
/// Reads only the three predecessors of the cell, which all lie on the previous
/// antidiagonal, and writes only the cell itself. Any number of cells of the same
/// antidiagonal can therefore be scored at once.
#[inline]
pub fn score_cell(
    ctx: &Context<'_>,
    matrices: &Matrices,
    x: usize,
    y: usize,
) -> Result<u32, Error> {
    // Gap row and column stay zero
    if x == 0 || y == 0 {
        return Ok(0);
    }

    let score = &matrices.score;
    let gap = *ctx.scoring().gap() as i64;

    let insertion = score.get(y, x - 1)? as i64 - gap;
    let deletion = score.get(y - 1, x)? as i64 - gap;
    let (a, b) = (ctx.target()[x - 1], ctx.query()[y - 1]);
    let diagonal = score.get(y - 1, x - 1)? as i64 + ctx.scoring().substitution(a, b);

    let best = 0i64.max(diagonal).max(deletion).max(insertion);
    let mut directions = Directions::NONE;
    if best > 0 {
        if best == deletion {
            directions |= Directions::UP;
        }
        if best == diagonal {
            directions |= Directions::DIAG;
        }
        if best == insertion {
            directions |= Directions::LEFT;
        }
    }

    let Ok(best) = u32::try_from(best) else {
        return Err(Error::ScoreOverflow { x, y });
    };
    score.set(y, x, best)?;
    matrices.directions.set(y, x, directions.into())?;
    Ok(best)
}
