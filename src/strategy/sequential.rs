use futures::executor::block_on;
use indicatif::ProgressBar;

use crate::{
    fetcher::Fetcher,
    job::{self, FetchJob, FetchResult},
};

/// Run jobs one after another on the calling thread
pub fn run(jobs: Vec<FetchJob>, fetcher: &dyn Fetcher, bar: &ProgressBar) -> Vec<FetchResult> {
    jobs.into_iter()
        .map(|job| {
            bar.set_message(job.url.clone());
            let result = block_on(job::save_page(fetcher, job));
            bar.inc(1);
            result
        })
        .collect()
}
