use itertools::Itertools;

use paraseq_core_rs::shared::{Handle, Shape, Store, StoreError};

/// Buffer names of a single job. Every job gets its own pair, so concurrent jobs never
/// meet in the same store.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MatrixNames {
    pub score: String,
    pub directions: String,
}

impl MatrixNames {
    pub fn new(prefix: &str, job: u64) -> Self {
        Self {
            score: format!("{prefix}-{job}-score"),
            directions: format!("{prefix}-{job}-directions"),
        }
    }
}

/// Score and direction matrices of a job, as seen by one participant.
#[derive(Debug)]
pub struct Matrices {
    pub score: Handle<u32>,
    pub directions: Handle<u8>,
}

impl Matrices {
    /// Creates both zero-filled matrices. Nothing stays registered if either fails.
    pub fn allocate(store: &Store, names: &MatrixNames, shape: Shape) -> Result<Self, StoreError> {
        let score = store.allocate(&names.score, shape)?;
        let directions = match store.allocate(&names.directions, shape) {
            Ok(directions) => directions,
            Err(err) => {
                store.release(score, true)?;
                return Err(err);
            }
        };
        Ok(Self { score, directions })
    }

    pub fn attach(store: &Store, names: &MatrixNames) -> Result<Self, StoreError> {
        Ok(Self {
            score: store.attach(&names.score)?,
            directions: store.attach(&names.directions)?,
        })
    }

    /// Releases both views, destroying the underlying buffers if requested.
    pub fn release(self, store: &Store, destroy: bool) -> Result<(), StoreError> {
        let score = store.release(self.score, destroy);
        let directions = store.release(self.directions, destroy);
        score.and(directions)
    }

    pub fn shape(&self) -> Shape {
        self.score.shape()
    }

    /// Human-readable rendering of both matrices, one matrix row per line.
    pub fn dump(&self) -> String {
        let render = |rows: Vec<Vec<String>>| {
            let width = rows.iter().flatten().map(String::len).max().unwrap_or(1);
            rows.into_iter()
                .map(|row| row.iter().map(|x| format!("{x:>width$}")).join(" "))
                .join("\n")
        };
        let scores: Vec<Vec<String>> = self
            .score
            .rows()
            .into_iter()
            .map(|row| row.iter().map(u32::to_string).collect())
            .collect();
        let directions: Vec<Vec<String>> = self
            .directions
            .rows()
            .into_iter()
            .map(|row| row.iter().map(u8::to_string).collect())
            .collect();
        format!(
            "score matrix ({}):\n{}\n\ndirections matrix ({}):\n{}",
            self.score.name(),
            render(scores),
            self.directions.name(),
            render(directions)
        )
    }
}
