use anyhow::Context;
use futures::future::join_all;
use indicatif::ProgressBar;

use crate::{
    fetcher::Fetcher,
    job::{self, FetchJob, FetchResult},
};

/// Launch every job at once on a single-threaded event loop and wait for all of them
pub fn run(
    jobs: Vec<FetchJob>,
    fetcher: &dyn Fetcher,
    bar: &ProgressBar,
) -> anyhow::Result<Vec<FetchResult>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build event loop")?;

    let pending = jobs.into_iter().map(|job| async move {
        let result = job::save_page(fetcher, job).await;
        bar.inc(1);
        result
    });
    Ok(runtime.block_on(join_all(pending)))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{fetcher::http::HttpFetcher, test_server::TestServer};

    mod run {
        use super::*;

        #[test]
        fn slow_jobs_overlap() {
            let server = TestServer::start();
            let root = std::env::temp_dir()
                .join("pagesaver-tests")
                .join(uuid::Uuid::new_v4().to_string());
            let jobs: Vec<_> = (0..5)
                .map(|i| FetchJob::new(server.slow_url(&format!("slow-{i}")), Some(root.as_path()), "out"))
                .collect();
            let fetcher = HttpFetcher::new(&TestServer::fetcher_options()).unwrap();

            let started = Instant::now();
            let results = run(jobs, &fetcher, &ProgressBar::hidden()).unwrap();

            // Five sequential timeouts would take at least five seconds.
            assert!(started.elapsed() < Duration::from_secs(4), "{:?}", started.elapsed());
            assert_eq!(results.len(), 5);
            assert!(results.iter().all(|r| !r.is_success()));
            std::fs::remove_dir_all(root).unwrap();
        }
    }
}
