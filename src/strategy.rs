use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    path::Path,
    time::{Duration, Instant},
};

use anyhow::anyhow;

use clap::ValueEnum;
use indicatif::ProgressBar;
use log::{debug, info};

use crate::{
    fetcher::{HttpFetcherOptions, blocking::BlockingHttpFetcher, http::HttpFetcher},
    job::{FetchJob, FetchResult, Outcome},
};

pub mod cooperative;
pub mod sequential;
pub mod thread_pool;

/// Scheduling model used to run a batch of jobs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Strategy {
    /// One job at a time on the calling thread
    #[value(name = "sequential", alias = "sync")]
    Sequential,
    /// Fixed-size pool of OS threads doing blocking I/O
    #[value(name = "thread-pool", alias = "threaded")]
    ThreadPool,
    /// All jobs multiplexed on a single-threaded event loop
    #[value(name = "cooperative", alias = "async")]
    Cooperative,
}

impl Strategy {
    /// Every strategy, in the order a full comparison runs them
    pub const ALL: [Strategy; 3] = [
        Strategy::Cooperative,
        Strategy::Sequential,
        Strategy::ThreadPool,
    ];

    /// Folder the strategy saves into unless one is given explicitly
    pub fn default_folder_name(self) -> &'static str {
        match self {
            Strategy::Sequential => "output_sync",
            Strategy::ThreadPool => "output_threaded",
            Strategy::Cooperative => "output_async",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Sequential => "sequential",
            Strategy::ThreadPool => "thread-pool",
            Strategy::Cooperative => "cooperative",
        };
        f.write_str(s)
    }
}

/// Settings shared by all strategies for one batch
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    pub http: HttpFetcherOptions,
    /// Thread pool size; `None` picks a default from the available parallelism
    pub workers: Option<usize>,
}

/// Summary of a finished batch
#[derive(Clone, Debug)]
pub struct BatchReport {
    pub strategy: Strategy,
    pub results: Vec<FetchResult>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn bytes_written(&self) -> u64 {
        self.results
            .iter()
            .map(|r| match r.outcome {
                Outcome::Success { bytes_written, .. } => bytes_written,
                Outcome::Failure(_) => 0,
            })
            .sum()
    }

    /// Folder the saved pages landed in, if any page was saved
    pub fn output_folder(&self) -> Option<&Path> {
        self.results.iter().find_map(|r| match &r.outcome {
            Outcome::Success { path, .. } => path.parent(),
            Outcome::Failure(_) => None,
        })
    }
}

/// Fetch every URL with the given strategy and save each body under
/// `<output_dir>/<folder_name>`.
///
/// A failing URL never stops the batch; each gets its own result, returned in input order.
/// Errors are reserved for problems outside any single job: client, pool or
/// event loop setup, and a panic in any job, which abandons the whole batch.
pub fn run(
    urls: &[String],
    strategy: Strategy,
    folder_name: &str,
    output_dir: Option<&Path>,
    options: &RunOptions,
    bar: &ProgressBar,
) -> anyhow::Result<BatchReport> {
    let started = Instant::now();
    let jobs: Vec<FetchJob> = urls
        .iter()
        .map(|url| FetchJob::new(url.as_str(), output_dir, folder_name))
        .collect();

    let results = match strategy {
        Strategy::Sequential => {
            let fetcher = BlockingHttpFetcher::new(&options.http)?;
            catch_panics(strategy, || sequential::run(jobs, &fetcher, bar))?
        }
        Strategy::ThreadPool => {
            let fetcher = BlockingHttpFetcher::new(&options.http)?;
            catch_panics(strategy, || {
                thread_pool::run(jobs, &fetcher, options.workers, bar)
            })??
        }
        Strategy::Cooperative => {
            let fetcher = HttpFetcher::new(&options.http)?;
            catch_panics(strategy, || cooperative::run(jobs, &fetcher, bar))??
        }
    };

    if let Some(slowest) = results.iter().max_by_key(|r| r.elapsed) {
        debug!(
            "Slowest {strategy} job: '{}' ({:.2?})",
            slowest.job.url, slowest.elapsed
        );
    }

    let report = BatchReport {
        strategy,
        results,
        elapsed: started.elapsed(),
    };
    info!(
        "{strategy} finished in {:.2?}: {} saved, {} failed",
        report.elapsed,
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

/// Run a scheduler, turning a panic in any of its jobs into an error
fn catch_panics<T>(strategy: Strategy, schedule: impl FnOnce() -> T) -> anyhow::Result<T> {
    panic::catch_unwind(AssertUnwindSafe(schedule)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown cause".to_string());
        anyhow!("{strategy} fetch job panicked: {message}")
    })
}
