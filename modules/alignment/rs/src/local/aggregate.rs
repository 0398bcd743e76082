use ahash::AHashSet;

use super::Alignment;

/// Duplicate-free union of alignments reported by independent workers.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    unique: AHashSet<Alignment>,
    received: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the alignment was not reported before.
    pub fn add(&mut self, alignment: Alignment) -> bool {
        self.received += 1;
        self.unique.insert(alignment)
    }

    pub fn merge(&mut self, other: Aggregator) {
        self.received += other.received;
        self.unique.extend(other.unique);
    }

    /// Drains per-worker aggregators into a single one.
    pub fn collapse<'a>(workers: impl Iterator<Item = &'a mut Aggregator>) -> Aggregator {
        let mut result = Aggregator::new();
        for worker in workers {
            result.merge(std::mem::take(worker));
        }
        result
    }

    /// Number of unique alignments.
    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }

    /// Number of reported alignments, duplicates included.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Unique alignments in no particular order.
    pub fn into_vec(self) -> Vec<Alignment> {
        self.unique.into_iter().collect()
    }
}
