use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::normalize::PatchUrl;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Where patch bodies come from.
pub trait PatchSource {
    fn fetch(&self, url: &PatchUrl) -> Result<Vec<u8>>;
}

/// Downloads patches over HTTPS. No retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `None` lets a request block for as long as the server keeps it open.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build the HTTP client")?;
        Ok(Self { client })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .context("Failed to download the patch file")?;
        Ok(body.to_vec())
    }
}

impl PatchSource for HttpFetcher {
    fn fetch(&self, url: &PatchUrl) -> Result<Vec<u8>> {
        self.download(url.as_str())
    }
}
