use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eyre::Result;
use rayon::prelude::*;
use rayon::ThreadPool;
use thread_local::ThreadLocal;

use paraseq_core_rs::parallelism;
use paraseq_core_rs::shared::Store;

use super::Wavefront;
use super::{Aggregator, Alignment, Backtracker, Context, Matrices, MatrixNames, Outcome, Summary};
use crate::{Error, Phase, Scoring};

const DEFAULT_PREFIX: &str = "paraseq";

// Jobs of all engines draw from the same counter, so names never repeat in a process
static JOBS: AtomicU64 = AtomicU64::new(0);

pub struct EngineBuilder {
    threads: Option<isize>,
    thread_pool: Option<ThreadPool>,
    store: Option<Arc<Store>>,
    prefix: String,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            threads: None,
            thread_pool: None,
            store: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl EngineBuilder {
    /// Run on a dedicated pool with the given number of workers, resolved with
    /// [`parallelism::workers`]. Without it the global rayon pool is used.
    pub fn threads(mut self, threads: isize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Run on an existing pool. Takes precedence over [`EngineBuilder::threads`].
    pub fn thread_pool(mut self, pool: ThreadPool) -> Self {
        self.thread_pool = Some(pool);
        self
    }

    /// Registry for the job matrices, [`Store::global`] by default.
    pub fn store(mut self, store: Arc<Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Prefix of the job matrix names.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn build(self) -> Result<Engine> {
        let thread_pool = match (self.thread_pool, self.threads) {
            (Some(pool), _) => Some(pool),
            (None, Some(threads)) => Some(parallelism::pool(threads)?),
            (None, None) => None,
        };
        Ok(Engine {
            thread_pool,
            store: self.store.unwrap_or_else(Store::global),
            prefix: self.prefix,
        })
    }
}

/// Finds all optimal local alignments of two sequences.
///
/// Every job allocates its own pair of matrices in the store, fills them wavefront by
/// wavefront, traces all maximum-score cells in parallel and destroys the matrices
/// before returning, whether the job succeeded or not.
pub struct Engine {
    thread_pool: Option<ThreadPool>,
    store: Arc<Store>,
    prefix: String,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn run(&self, target: &[u8], query: &[u8], scoring: Scoring) -> Result<Outcome> {
        let job = JOBS.fetch_add(1, Ordering::Relaxed);
        let names = MatrixNames::new(&self.prefix, job);
        let ctx = Context::new(target, query, scoring);

        let matrices = Matrices::allocate(&self.store, &names, ctx.shape())
            .map_err(Error::from)?;
        let outcome = self.execute(&ctx, &names);
        let released = matrices.release(&self.store, true).map_err(Error::from);

        let outcome = outcome?;
        released?;
        Ok(outcome)
    }

    fn execute(&self, ctx: &Context<'_>, names: &MatrixNames) -> Result<Outcome, Error> {
        log::info!("Filling score and directions matrices...");
        let fill = self.install(Phase::Fill, || {
            let views = Matrices::attach(&self.store, names)?;
            let fill = Wavefront::new(ctx, &views).and_then(|x| x.fill());
            if fill.is_ok() && log::log_enabled!(log::Level::Trace) {
                log::trace!("{}", views.dump());
            }
            views.release(&self.store, false)?;
            fill
        })?;

        if fill.score == 0 {
            log::debug!("Maximum score is zero, there is nothing to trace back");
            let summary = Summary::new(ctx.shape(), fill.antidiagonals, 0, 0);
            return Ok(Outcome::new(0, Vec::new(), summary));
        }

        log::info!("Reconstructing best local alignments...");
        let (starts, aggregated) = self.install(Phase::Backtrack, || {
            let views = Matrices::attach(&self.store, names)?;
            let backtracker = Backtracker::new(ctx, &views);
            let result = backtracker.and_then(|x| Self::backtrack(&x, fill.score));
            views.release(&self.store, false)?;
            result
        })?;

        log::debug!(
            "Traced {} path(s) from {} start cell(s) into {} unique alignment(s)",
            aggregated.received(),
            starts,
            aggregated.len()
        );
        let traced = aggregated.received();
        let summary = Summary::new(ctx.shape(), fill.antidiagonals, starts, traced);
        Ok(Outcome::new(fill.score, aggregated.into_vec(), summary))
    }

    fn backtrack(
        backtracker: &Backtracker<'_, '_>,
        score: u32,
    ) -> Result<(usize, Aggregator), Error> {
        let starts = backtracker.start_cells(score)?;

        let mut workers: ThreadLocal<RefCell<Aggregator>> = ThreadLocal::new();
        starts.par_iter().try_for_each(|&(x, y)| {
            let mut worker = workers.get_or_default().borrow_mut();
            backtracker.trace(x, y, |alignment| {
                worker.add(alignment);
            })?;
            Ok::<_, Error>(())
        })?;

        let aggregated = Aggregator::collapse(workers.iter_mut().map(RefCell::get_mut));
        Ok((starts.len(), aggregated))
    }

    /// Runs the phase on the engine's pool. A panicking task fails the whole phase.
    fn install<R, F>(&self, phase: Phase, job: F) -> Result<R, Error>
    where
        R: Send,
        F: FnOnce() -> Result<R, Error> + Send,
    {
        let task = AssertUnwindSafe(|| match &self.thread_pool {
            Some(pool) => pool.install(job),
            None => job(),
        });
        let result = panic::catch_unwind(task);
        result.unwrap_or_else(|payload| {
            let reason = panic_message(payload.as_ref());
            log::error!("Alignment {phase} phase failed: {reason}");
            Err(Error::WorkerFailure { phase, reason })
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Best local alignment score of `target` and `query` with all alignments attaining it.
///
/// Runs on a default [`Engine`]; see [`Engine::run`] for a configurable entry point.
pub fn find_local_alignments(
    target: &str,
    query: &str,
    match_score: u32,
    mismatch: u32,
    gap: u32,
) -> Result<(u32, Vec<Alignment>)> {
    let engine = Engine::builder().build()?;
    let scoring = Scoring::new(match_score, mismatch, gap);
    let outcome = engine.run(target.as_bytes(), query.as_bytes(), scoring)?;
    let (score, alignments, _) = outcome.dissolve();
    Ok((score, alignments))
}
