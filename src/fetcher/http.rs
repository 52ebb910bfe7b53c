use anyhow::Context;
use reqwest::StatusCode;

use crate::{
    fetcher::{Fetcher, HttpFetcherOptions, classify},
    job::FailureKind,
};

/// Non-blocking fetcher; suspends at connect and read so sibling jobs can progress
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(options: &HttpFetcherOptions) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(options.timeout())
            .timeout(options.timeout());
        if options.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("failed to build reqwest client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FailureKind> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| classify(url, &err))?;

        let status = res.status();
        if status != StatusCode::OK {
            return Err(FailureKind::BadStatus(status.as_u16()));
        }

        let body = res.bytes().await.map_err(|err| classify(url, &err))?;
        Ok(body.to_vec())
    }
}
