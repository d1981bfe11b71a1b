//! GitHub collaborators: the REST API and raw file retrieval.

pub mod api;
pub mod raw;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use api::GitHubClient;
pub use raw::RawFileFetcher;

use crate::changelog::ChangelogError;

/// Per-request timeout for every outbound call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// User agent sent with every request; GitHub rejects requests without one.
pub(crate) const USER_AGENT: &str = concat!("distro-changelog/", env!("CARGO_PKG_VERSION"));

/// A commit inside a compared range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit hash. May be empty in degenerate API responses.
    #[serde(default)]
    pub sha: String,
}

impl CommitRef {
    /// Creates a reference to `sha`.
    pub fn new(sha: impl Into<String>) -> Self {
        Self { sha: sha.into() }
    }
}

/// A pull request associated with a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Pull request number, unique per repository.
    pub number: u64,
    /// Title as written by the author.
    #[serde(default)]
    pub title: String,
    /// Markdown description, absent when the author left it blank.
    #[serde(default)]
    pub body: Option<String>,
    /// Browser URL of the pull request.
    #[serde(default)]
    pub html_url: String,
}

/// Source-control host that knows about commit ranges and review requests.
pub trait ReleaseHost: Send + Sync {
    /// Lists the commits between two refs, oldest first.
    fn compare_commits<'a>(
        &'a self,
        org: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CommitRef>>> + Send + 'a>>;

    /// Lists the pull requests associated with a commit.
    fn pull_requests_for_commit<'a>(
        &'a self,
        org: &'a str,
        repo: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PullRequest>>> + Send + 'a>>;
}

/// Retrieves the raw bytes of a release artifact.
pub trait ArtifactSource: Send + Sync {
    /// Fetches `url`, failing on any non-200 answer.
    fn fetch<'a>(&'a self, url: &'a str)
        -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}

/// Builds an HTTP client with the standard request timeout.
pub(crate) fn build_http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Checks an HTTP response for error status.
///
/// On success, returns the response unchanged for further processing.
/// On failure, returns a [`ChangelogError::HttpStatus`] naming the URL.
pub(crate) fn check_error_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(ChangelogError::HttpStatus {
        url: response.url().to_string(),
        status: status.as_u16(),
    }
    .into())
}
