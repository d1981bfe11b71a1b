//! Raw file retrieval over HTTP.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::{build_http_client, ArtifactSource};
use crate::changelog::ChangelogError;

/// Downloads artifacts with a bounded per-request timeout.
pub struct RawFileFetcher {
    client: Client,
}

impl RawFileFetcher {
    /// Creates a fetcher with the standard request timeout.
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_http_client()?,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Downloading artifact");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to download {url}"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ChangelogError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;
        debug!(url, len = bytes.len(), "Downloaded artifact");
        Ok(bytes.to_vec())
    }
}

impl ArtifactSource for RawFileFetcher {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(self.download(url))
    }
}
