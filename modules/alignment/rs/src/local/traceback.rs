use std::rc::Rc;

use rayon::prelude::*;

use super::{Alignment, Context, Directions, Matrices, Move};
use crate::Error;

/// Moves of an in-flight path, newest (closest to the terminus) first. Forks share
/// the suffix they have in common.
struct Trail {
    step: Move,
    next: Option<Rc<Trail>>,
}

impl Drop for Trail {
    // Unlink iteratively: long trails would overflow the stack with a recursive drop
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

struct Frame {
    x: usize,
    y: usize,
    trail: Option<Rc<Trail>>,
}

/// Reconstructs optimal local alignments from filled, read-only matrices.
pub struct Backtracker<'a, 'c> {
    ctx: &'c Context<'a>,
    matrices: &'c Matrices,
}

impl<'a, 'c> Backtracker<'a, 'c> {
    pub fn new(ctx: &'c Context<'a>, matrices: &'c Matrices) -> Result<Self, Error> {
        super::ensure_shape(ctx, matrices)?;
        Ok(Self { ctx, matrices })
    }

    /// Cells (x, y) holding exactly `score`, in row-major order.
    pub fn start_cells(&self, score: u32) -> Result<Vec<(usize, usize)>, Error> {
        let shape = self.matrices.shape();
        let rows = (0..shape.rows)
            .into_par_iter()
            .map(|y| {
                let mut hits = Vec::new();
                for x in 0..shape.cols {
                    if self.matrices.score.get(y, x)? == score {
                        hits.push((x, y));
                    }
                }
                Ok::<_, Error>(hits)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().flatten().collect())
    }

    /// Walks every optimal path ending at cell (x, y) back to a zero-score cell and
    /// passes each resulting alignment to `emit`. Returns the number of emitted
    /// alignments.
    ///
    /// The walk is an explicit-stack depth-first search, a cell with several direction
    /// bits forks the path once per bit. The number of paths may grow combinatorially
    /// with the length of tied regions.
    pub fn trace(
        &self,
        x: usize,
        y: usize,
        mut emit: impl FnMut(Alignment),
    ) -> Result<usize, Error> {
        let mut emitted = 0;
        let mut stack = vec![Frame { x, y, trail: None }];

        while let Some(Frame { x, y, trail }) = stack.pop() {
            if self.matrices.score.get(y, x)? == 0 {
                // A path that hasn't moved is not an alignment
                if let Some(trail) = trail {
                    emit(self.materialize(x, y, &trail));
                    emitted += 1;
                }
                continue;
            }

            let directions = Directions::from(self.matrices.directions.get(y, x)?);
            if directions.is_empty() {
                return Err(Error::BrokenTrace { x, y });
            }
            for step in directions.moves() {
                let (px, py) = step.origin(x, y).ok_or(Error::BrokenTrace { x, y })?;
                stack.push(Frame {
                    x: px,
                    y: py,
                    trail: Some(Rc::new(Trail {
                        step,
                        next: trail.clone(),
                    })),
                });
            }
        }
        Ok(emitted)
    }

    /// Spells out the path starting right after the terminus cell (x, y).
    fn materialize(&self, x: usize, y: usize, trail: &Rc<Trail>) -> Alignment {
        let (target, query) = (self.ctx.target(), self.ctx.query());
        let (mut tpos, mut qpos) = (x, y);
        let (mut aligned_target, mut aligned_query) = (String::new(), String::new());

        let mut node = Some(trail);
        while let Some(current) = node {
            match current.step {
                Move::Up => {
                    aligned_target.push('-');
                    aligned_query.push(char::from(query[qpos]));
                    qpos += 1;
                }
                Move::Diag => {
                    aligned_target.push(char::from(target[tpos]));
                    aligned_query.push(char::from(query[qpos]));
                    tpos += 1;
                    qpos += 1;
                }
                Move::Left => {
                    aligned_target.push(char::from(target[tpos]));
                    aligned_query.push('-');
                    tpos += 1;
                }
            }
            node = current.next.as_ref();
        }

        Alignment::new(x + 1, y + 1, aligned_target, aligned_query)
    }
}

#[cfg(test)]
mod tests {
    use paraseq_core_rs::shared::{Shape, Store};

    use super::super::{MatrixNames, Wavefront};
    use super::*;
    use crate::Scoring;

    type Traced = (Vec<(usize, usize)>, Vec<Alignment>);

    fn traced(target: &str, query: &str, scoring: Scoring) -> Traced {
        let store = Store::new();
        let ctx = Context::new(target.as_bytes(), query.as_bytes(), scoring);
        let names = MatrixNames::new("trace", 0);
        let matrices = Matrices::allocate(&store, &names, ctx.shape()).unwrap();
        let wavefront = Wavefront::new(&ctx, &matrices).unwrap();
        let score = wavefront.fill().unwrap().score;

        let backtracker = Backtracker::new(&ctx, &matrices).unwrap();
        let starts = backtracker.start_cells(score).unwrap();
        let mut alignments = Vec::new();
        for &(x, y) in &starts {
            let emitted = backtracker.trace(x, y, |a| alignments.push(a)).unwrap();
            assert!(emitted > 0);
        }
        alignments.sort();

        matrices.release(&store, true).unwrap();
        (starts, alignments)
    }

    fn alignment(tstart: usize, qstart: usize, target: &str, query: &str) -> Alignment {
        Alignment::new(tstart, qstart, target.to_string(), query.to_string())
    }

    #[test]
    fn test_single_path() {
        let (starts, alignments) = traced("ATTTCG", "TTT", Scoring::new(2, 2, 1));
        assert_eq!(starts, vec![(4, 3)]);
        assert_eq!(alignments, vec![alignment(2, 1, "TTT", "TTT")]);
    }

    #[test]
    fn test_gapped_path() {
        let (_, alignments) = traced("TTTACATATCGGTGTC", "ACGCG", Scoring::new(2, 2, 1));
        assert_eq!(alignments, vec![alignment(8, 1, "ATCG-G", "A-CGCG")]);

        let (_, alignments) = traced("ACGCG", "TTTACATATCGGTGTC", Scoring::new(2, 2, 1));
        assert_eq!(alignments, vec![alignment(1, 8, "A-CGCG", "ATCG-G")]);
    }

    #[test]
    fn test_forked_paths() {
        let target = [
            "ATGCGTACGTAGCTAGCTAGCTAGCTAACGATCGATCGATCG",
            "ATCGTTAGCATCGATCGATCGTACGTAGCTAGCTAGCTAACG",
        ]
        .concat();
        let (starts, alignments) = traced(&target, "AAAATTTAAAAA", Scoring::new(2, 2, 1));
        assert_eq!(starts.len(), 2);
        assert_eq!(
            alignments,
            vec![
                alignment(43, 4, "ATCGTTA", "AT--TTA"),
                alignment(43, 4, "ATCGTTAGCA", "AT--TTA--A"),
            ]
        );
    }

    #[test]
    fn test_several_start_cells() {
        let (starts, alignments) = traced("TTAAAT", "ATTTCG", Scoring::new(2, 2, 1));
        assert_eq!(starts.len(), 3);
        assert_eq!(
            alignments,
            vec![
                alignment(1, 2, "TT", "TT"),
                alignment(1, 3, "TT", "TT"),
                alignment(5, 1, "AT", "AT"),
            ]
        );
    }

    #[test]
    fn test_long_path() {
        // Deep enough to overflow the stack with a recursive walk or drop
        let target = "ACGT".repeat(50_000);
        let store = Store::new();
        let ctx = Context::new(target.as_bytes(), b"A", Scoring::new(1, 1, 1));
        let shape = ctx.shape();
        let names = MatrixNames::new("long", 0);
        let matrices = Matrices::allocate(&store, &names, shape).unwrap();

        // One match followed by a gap spanning the rest of the target
        let (diag, left) = (Directions::DIAG.bits(), Directions::LEFT.bits());
        matrices.score.set(1, 1, 1).unwrap();
        matrices.directions.set(1, 1, diag).unwrap();
        for x in 2..shape.cols {
            matrices.score.set(1, x, 1).unwrap();
            matrices.directions.set(1, x, left).unwrap();
        }

        let backtracker = Backtracker::new(&ctx, &matrices).unwrap();
        let mut alignments = Vec::new();
        let last = shape.cols - 1;
        let emitted = backtracker.trace(last, 1, |a| alignments.push(a)).unwrap();
        assert_eq!(emitted, 1);

        let expected = format!("A{}", "-".repeat(target.len() - 1));
        assert_eq!(alignments, vec![alignment(1, 1, &target, &expected)]);

        matrices.release(&store, true).unwrap();
    }

    #[test]
    fn test_broken_trace() {
        let store = Store::new();
        let ctx = Context::new(b"AC", b"AC", Scoring::new(1, 1, 1));
        let names = MatrixNames::new("broken", 0);
        let shape = Shape::new(3, 3);
        let matrices = Matrices::allocate(&store, &names, shape).unwrap();
        matrices.score.set(2, 2, 1).unwrap();

        let backtracker = Backtracker::new(&ctx, &matrices).unwrap();
        assert!(matches!(
            backtracker.trace(2, 2, |_| {}),
            Err(Error::BrokenTrace { x: 2, y: 2 })
        ));

        // Positive boundary cells have nowhere to go
        matrices.score.set(0, 2, 1).unwrap();
        let up = Directions::UP.bits();
        matrices.directions.set(0, 2, up).unwrap();
        assert!(matches!(
            backtracker.trace(2, 0, |_| {}),
            Err(Error::BrokenTrace { x: 2, y: 0 })
        ));

        matrices.release(&store, true).unwrap();
    }
}
