use anyhow::Context;
use reqwest::StatusCode;

use crate::{
    fetcher::{Fetcher, HttpFetcherOptions, classify},
    job::FailureKind,
};

/// Fetcher that blocks the calling thread for the whole request.
///
/// Must be driven from plain OS threads (never from inside a tokio runtime),
/// e.g. with `futures::executor::block_on`.
pub struct BlockingHttpFetcher {
    client: reqwest::blocking::Client,
}

impl BlockingHttpFetcher {
    pub fn new(options: &HttpFetcherOptions) -> anyhow::Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .connect_timeout(options.timeout())
            .timeout(options.timeout());
        if options.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .context("failed to build blocking reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for BlockingHttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FailureKind> {
        let res = self
            .client
            .get(url)
            .send()
            .map_err(|err| classify(url, &err))?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(FailureKind::BadStatus(status.as_u16()));
        }

        let body = res.bytes().map_err(|err| classify(url, &err))?;
        Ok(body.to_vec())
    }
}
