use std::ops::Range;

use rayon::prelude::*;

use paraseq_core_rs::shared::Shape;

use super::{score_cell, Context, Matrices};
use crate::Error;

// Scoring a cell is a handful of instructions, smaller tasks are not worth stealing
const MIN_CELLS_PER_TASK: usize = 64;

/// Number of antidiagonals in a matrix of the given shape.
pub fn antidiagonals(shape: Shape) -> usize {
    if shape.is_empty() {
        0
    } else {
        shape.rows + shape.cols - 1
    }
}

/// Rows crossed by the k-th antidiagonal.
fn span(k: usize, shape: Shape) -> Range<usize> {
    if k >= antidiagonals(shape) {
        return 0..0;
    }
    let first = k.saturating_sub(shape.cols - 1);
    let last = k.min(shape.rows - 1);
    first..last + 1
}

/// Coordinates (x, y) of the cells with x + y = k, ordered by ascending y.
pub fn antidiagonal(k: usize, shape: Shape) -> impl ExactSizeIterator<Item = (usize, usize)> {
    span(k, shape).map(move |y| (k - y, y))
}

/// Summary of a filled matrix pair.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Fill {
    /// Maximum score over the whole matrix
    pub score: u32,
    pub antidiagonals: usize,
    pub cells: usize,
}

/// Fills the score and direction matrices one antidiagonal at a time.
///
/// Cells of an antidiagonal depend only on the previous antidiagonal, so each one is
/// scored in parallel, and the next antidiagonal starts only after every cell of the
/// current one has been committed.
pub struct Wavefront<'a, 'c> {
    ctx: &'c Context<'a>,
    matrices: &'c Matrices,
}

impl<'a, 'c> Wavefront<'a, 'c> {
    pub fn new(ctx: &'c Context<'a>, matrices: &'c Matrices) -> Result<Self, Error> {
        super::ensure_shape(ctx, matrices)?;
        Ok(Self { ctx, matrices })
    }

    /// Runs on the current rayon pool and returns the maximum committed score.
    pub fn fill(&self) -> Result<Fill, Error> {
        let shape = self.matrices.shape();
        let mut fill = Fill {
            score: 0,
            antidiagonals: antidiagonals(shape),
            cells: 0,
        };

        for k in 0..fill.antidiagonals {
            let rows = span(k, shape);
            fill.cells += rows.len();

            // Returns only after the whole antidiagonal is committed
            let best = rows
                .into_par_iter()
                .with_min_len(MIN_CELLS_PER_TASK)
                .map(|y| score_cell(self.ctx, self.matrices, k - y, y))
                .try_reduce(|| 0, |a, b| Ok(a.max(b)))?;
            fill.score = fill.score.max(best);
        }

        log::debug!(
            "Filled {} matrices over {} antidiagonals, max score {}",
            shape,
            fill.antidiagonals,
            fill.score
        );
        Ok(fill)
    }
}

#[cfg(test)]
mod tests {
    use paraseq_core_rs::shared::Store;

    use super::super::MatrixNames;
    use super::*;
    use crate::Scoring;

    fn coords(k: usize, rows: usize, cols: usize) -> Vec<(usize, usize)> {
        antidiagonal(k, Shape::new(rows, cols)).collect()
    }

    #[test]
    fn test_antidiagonal_wide() {
        let (rows, cols) = (3, 5);
        assert_eq!(coords(0, rows, cols), vec![(0, 0)]);
        assert_eq!(coords(1, rows, cols), vec![(1, 0), (0, 1)]);
        assert_eq!(coords(2, rows, cols), vec![(2, 0), (1, 1), (0, 2)]);
        assert_eq!(coords(3, rows, cols), vec![(3, 0), (2, 1), (1, 2)]);
        assert_eq!(coords(4, rows, cols), vec![(4, 0), (3, 1), (2, 2)]);
        assert_eq!(coords(5, rows, cols), vec![(4, 1), (3, 2)]);
        assert_eq!(coords(6, rows, cols), vec![(4, 2)]);
        assert_eq!(coords(7, rows, cols), Vec::<(usize, usize)>::new());
    }

    #[test]
    fn test_antidiagonal_tall() {
        let (rows, cols) = (5, 3);
        assert_eq!(coords(0, rows, cols), vec![(0, 0)]);
        assert_eq!(coords(1, rows, cols), vec![(1, 0), (0, 1)]);
        assert_eq!(coords(2, rows, cols), vec![(2, 0), (1, 1), (0, 2)]);
        assert_eq!(coords(3, rows, cols), vec![(2, 1), (1, 2), (0, 3)]);
        assert_eq!(coords(4, rows, cols), vec![(2, 2), (1, 3), (0, 4)]);
        assert_eq!(coords(5, rows, cols), vec![(2, 3), (1, 4)]);
        assert_eq!(coords(6, rows, cols), vec![(2, 4)]);
    }

    #[test]
    fn test_antidiagonal_degenerate() {
        assert_eq!(coords(0, 0, 0), Vec::<(usize, usize)>::new());
        assert_eq!(coords(3, 1, 1), Vec::<(usize, usize)>::new());
        assert_eq!(coords(0, 1, 1), vec![(0, 0)]);
        assert_eq!(antidiagonals(Shape::new(0, 4)), 0);
        assert_eq!(antidiagonals(Shape::new(1, 1)), 1);
    }

    #[test]
    fn test_antidiagonals_cover_matrix_once() {
        for (rows, cols) in [(1, 1), (1, 7), (7, 1), (3, 3), (4, 9), (13, 7)] {
            let shape = Shape::new(rows, cols);
            let mut seen = vec![vec![0; cols]; rows];
            for k in 0..antidiagonals(shape) {
                for (x, y) in antidiagonal(k, shape) {
                    assert_eq!(x + y, k);
                    seen[y][x] += 1;
                }
            }
            assert!(seen.iter().flatten().all(|x| *x == 1), "{rows}x{cols}");
            assert_eq!(antidiagonals(shape), rows + cols - 1);
        }
    }

    fn fill(target: &str, query: &str, scoring: Scoring) -> Fill {
        let store = Store::new();
        let ctx = Context::new(target.as_bytes(), query.as_bytes(), scoring);
        let names = MatrixNames::new("fill", 0);
        let matrices = Matrices::allocate(&store, &names, ctx.shape()).unwrap();
        let wavefront = Wavefront::new(&ctx, &matrices).unwrap();
        let result = wavefront.fill().unwrap();
        matrices.release(&store, true).unwrap();
        result
    }

    #[test]
    fn test_fill_max_score() {
        let scoring = Scoring::new(2, 2, 1);
        for (target, query, expected) in [
            ("ATTTCG", "TTT", 6),
            ("TTT", "ATTTCG", 6),
            ("TTAAAT", "ATTTCG", 4),
            ("TTT", "AAAAAA", 0),
            ("AAAAAA", "AAAAAA", 12),
            ("ACGGTC", "TGGATCTCCAACG", 7),
            ("", "ACGT", 0),
            ("ACGT", "", 0),
        ] {
            let score = fill(target, query, scoring).score;
            assert_eq!(score, expected, "{target} vs {query}");
        }
        assert_eq!(fill("TTT", "ATTTCG", Scoring::new(0, 0, 0)).score, 0);
    }

    #[test]
    fn test_fill_visits_every_cell() {
        let result = fill("ATTTCG", "TTT", Scoring::new(2, 2, 1));
        assert_eq!(result.antidiagonals, 10);
        assert_eq!(result.cells, 28);
    }

    #[test]
    fn test_fill_matches_sequential_scoring() {
        // Long enough to split antidiagonals between several tasks
        let target = "ACGT".repeat(60);
        let query = "AGCTTGCA".repeat(40);
        let ctx = Context::new(target.as_bytes(), query.as_bytes(), Scoring::new(2, 1, 1));
        let store = Store::new();

        let shape = ctx.shape();

        let names = MatrixNames::new("par", 0);
        let parallel = Matrices::allocate(&store, &names, shape).unwrap();
        let wavefront = Wavefront::new(&ctx, &parallel).unwrap();
        let score = wavefront.fill().unwrap().score;

        let names = MatrixNames::new("seq", 0);
        let sequential = Matrices::allocate(&store, &names, shape).unwrap();
        let mut expected = 0;
        for y in 0..shape.rows {
            for x in 0..shape.cols {
                expected = expected.max(score_cell(&ctx, &sequential, x, y).unwrap());
            }
        }

        assert_eq!(score, expected);
        assert_eq!(parallel.score.rows(), sequential.score.rows());
        assert_eq!(parallel.directions.rows(), sequential.directions.rows());

        parallel.release(&store, true).unwrap();
        sequential.release(&store, true).unwrap();
    }

    #[test]
    fn test_shape_mismatch() {
        let store = Store::new();
        let ctx = Context::new(b"ACGT", b"AC", Scoring::new(1, 1, 1));
        let names = MatrixNames::new("shape", 0);
        let shape = Shape::new(2, 2);
        let matrices = Matrices::allocate(&store, &names, shape).unwrap();
        assert!(matches!(
            Wavefront::new(&ctx, &matrices),
            Err(Error::ShapeMismatch { .. })
        ));
        matrices.release(&store, true).unwrap();
    }
}
