use std::thread::available_parallelism;

use eyre::Result;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Clamps a worker request to `1..=max`. Non-positive requests are relative to `max`:
/// 0 asks for a single worker, -1 for every core, -2 for every core but one.
fn resolve(requested: isize, max: isize) -> usize {
    let workers = match requested {
        1.. => requested,
        0 => 1,
        _ => max + 1 + requested,
    };
    workers.clamp(1, max.max(1)) as usize
}

/// Number of workers to run for the requested amount on this machine.
pub fn workers(requested: isize) -> Result<usize> {
    let max = available_parallelism()?.get() as isize;
    Ok(resolve(requested, max))
}

/// Bounded worker pool with the resolved number of threads.
pub fn pool(requested: isize) -> Result<ThreadPool> {
    let threads = workers(requested)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|ind| format!("paraseq-worker-{ind}"))
        .build()?;
    log::debug!("Started a worker pool with {threads} thread(s)");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_requests_are_capped() {
        assert_eq!(resolve(1, 16), 1);
        assert_eq!(resolve(6, 16), 6);
        assert_eq!(resolve(16, 16), 16);
        assert_eq!(resolve(17, 16), 16);
        assert_eq!(resolve(isize::MAX, 2), 2);
    }

    #[test]
    fn test_zero_means_single_worker() {
        assert_eq!(resolve(0, 16), 1);
        assert_eq!(resolve(0, 1), 1);
    }

    #[test]
    fn test_negative_requests_count_back() {
        for (requested, expected) in [(-1, 12), (-2, 11), (-4, 9), (-11, 2), (-12, 1), (-64, 1)] {
            assert_eq!(resolve(requested, 12), expected, "requested {requested}");
        }
        assert_eq!(resolve(isize::MIN + 1, 12), 1);
    }

    #[test]
    fn test_pool_is_bounded() -> Result<()> {
        let pool = pool(1)?;
        assert_eq!(pool.current_num_threads(), 1);

        let max = workers(-1)?;
        assert!(max >= 1);
        assert_eq!(workers(isize::MAX)?, max);
        Ok(())
    }
}
