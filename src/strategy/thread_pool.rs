use std::{num::NonZeroUsize, thread};

use anyhow::Context;
use futures::executor::block_on;
use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;

use crate::{
    fetcher::Fetcher,
    job::{self, FetchJob, FetchResult},
};

/// Upper bound for the default pool size
const MAX_DEFAULT_WORKERS: usize = 32;

/// Default pool size: I/O bound work, so a few more threads than cores
pub fn default_workers() -> usize {
    let cores = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    (cores + 4).min(MAX_DEFAULT_WORKERS)
}

/// Run jobs on a dedicated fixed-size pool of worker threads.
///
/// Each job blocks its worker for the whole request, so the pool is never the
/// global one. Results come back in input order.
pub fn run(
    jobs: Vec<FetchJob>,
    fetcher: &dyn Fetcher,
    workers: Option<usize>,
    bar: &ProgressBar,
) -> anyhow::Result<Vec<FetchResult>> {
    let total = jobs.len();
    let workers = workers
        .unwrap_or_else(default_workers)
        .clamp(1, total.max(1));
    debug!("Running {total} jobs on {workers} worker threads");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|idx| format!("fetch-worker-{idx}"))
        .build()
        .context("failed to build fetch worker pool")?;

    let results = pool.install(|| {
        jobs.into_par_iter()
            // One job per task, so a slow page never holds back queued ones.
            .with_max_len(1)
            .map(|job| {
                let result = block_on(job::save_page(fetcher, job));
                bar.inc(1);
                result
            })
            .collect()
    });
    Ok(results)
}
