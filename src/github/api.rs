//! GitHub REST API client.

use std::future::Future;
use std::pin::Pin;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use super::{build_http_client, check_error_response, CommitRef, PullRequest, ReleaseHost};

/// Default GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Commits requested per page of a comparison.
const COMPARE_PAGE_SIZE: usize = 100;

/// Comparison response, reduced to what the changelog needs.
#[derive(Deserialize)]
struct Comparison {
    #[serde(default)]
    total_commits: usize,
    #[serde(default)]
    commits: Vec<CommitRef>,
}

/// GitHub REST API client.
pub struct GitHubClient {
    /// HTTP client for API requests.
    client: Client,
    /// API root, e.g. `https://api.github.com`.
    base_url: Url,
    /// Optional bearer token.
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid GitHub API URL: {base_url}"))?;
        Ok(Self {
            client: build_http_client()?,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Creates a client for the public GitHub API.
    pub fn public(token: Option<String>) -> Result<Self> {
        Self::new(DEFAULT_API_URL, token)
    }

    /// Builds an endpoint URL from path segments, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("GitHub API URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GitHub API request");
        let mut builder = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("GitHub API request failed: {url}"))?;
        let response = check_error_response(response)?;
        response
            .json()
            .await
            .with_context(|| format!("Invalid response format from {url}"))
    }

    async fn compare(&self, org: &str, repo: &str, base: &str, head: &str) -> Result<Vec<CommitRef>> {
        let range = format!("{base}...{head}");
        let mut commits = Vec::new();
        let mut page = 1_usize;

        loop {
            let mut url = self.endpoint(&["repos", org, repo, "compare", &range])?;
            url.query_pairs_mut()
                .append_pair("per_page", &COMPARE_PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());

            let comparison: Comparison = self.get_json(url).await?;
            let received = comparison.commits.len();
            commits.extend(comparison.commits);

            if received < COMPARE_PAGE_SIZE || commits.len() >= comparison.total_commits {
                break;
            }
            page += 1;
        }

        info!(
            org,
            repo,
            range = %range,
            commits = commits.len(),
            "Compared release range"
        );
        Ok(commits)
    }

    async fn pulls(&self, org: &str, repo: &str, sha: &str) -> Result<Vec<PullRequest>> {
        let url = self.endpoint(&["repos", org, repo, "commits", sha, "pulls"])?;
        let pulls: Vec<PullRequest> = self.get_json(url).await?;
        debug!(sha, count = pulls.len(), "Pull requests for commit");
        Ok(pulls)
    }
}

impl ReleaseHost for GitHubClient {
    fn compare_commits<'a>(
        &'a self,
        org: &'a str,
        repo: &'a str,
        base: &'a str,
        head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CommitRef>>> + Send + 'a>> {
        Box::pin(self.compare(org, repo, base, head))
    }

    fn pull_requests_for_commit<'a>(
        &'a self,
        org: &'a str,
        repo: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PullRequest>>> + Send + 'a>> {
        Box::pin(self.pulls(org, repo, sha))
    }
}
