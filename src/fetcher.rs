use std::time::Duration;

use clap::Args;
use log::debug;
use validator::Validate;

use crate::job::FailureKind;

pub mod blocking;
pub mod http;

/// Request timeout covering connect and response, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Fetcher interface shared by every scheduling strategy
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Return the body of a `200 OK` response to GET `url`
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FailureKind>;
}

/// Options for building HTTP clients
#[derive(Clone, Debug, Args, Validate)]
pub struct HttpFetcherOptions {
    #[arg(
        long = "timeout",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help = "Timeout in seconds for each request (connect and response)"
    )]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    #[arg(long = "no-proxy", help = "Ignore proxy settings from the environment")]
    pub no_proxy: bool,
}

impl Default for HttpFetcherOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            no_proxy: false,
        }
    }
}

impl HttpFetcherOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Map a client error to the failure recorded for the job
pub fn classify(url: &str, err: &reqwest::Error) -> FailureKind {
    debug!("GET '{url}' failed: {err:?}");
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_builder() {
        FailureKind::InvalidUrl
    } else {
        // DNS errors, refused connections and broken bodies alike
        FailureKind::ConnectionFailure
    }
}
