//! Generate command: builds the changelog report for a release.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use crate::changelog::product::DEFAULT_RAW_URL;
use crate::changelog::{ArtifactLocations, Collaborators, Repo};
use crate::data::{ChangelogReport, OutputFormat};
use crate::github::api::DEFAULT_API_URL;
use crate::github::{GitHubClient, RawFileFetcher};
use crate::utils::get_env_vars;

/// Environment variables holding a GitHub token, in lookup order.
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Generate command options.
#[derive(Parser)]
pub struct GenerateCommand {
    /// Product line: k3s or rke2.
    #[arg(value_name = "PRODUCT")]
    pub product: String,

    /// Release the commit range starts from (e.g. v1.27.2+k3s1).
    #[arg(value_name = "PREVIOUS")]
    pub previous: String,

    /// Release being reported (e.g. v1.27.3+k3s1).
    #[arg(value_name = "MILESTONE")]
    pub milestone: String,

    /// GitHub organisation (defaults to k3s-io for k3s, rancher for rke2).
    #[arg(long)]
    pub org: Option<String>,

    /// Output format: yaml (default), json.
    #[arg(long, default_value = "yaml")]
    pub format: String,

    /// GitHub API base URL.
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Base URL for raw repository content.
    #[arg(long, default_value = DEFAULT_RAW_URL)]
    pub raw_url: String,
}

impl GenerateCommand {
    /// Executes the generate command.
    pub async fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;
        let report = self.report().await?;
        println!("{}", report.render(format)?);
        Ok(())
    }

    /// Builds the report without printing it.
    pub async fn report(&self) -> Result<ChangelogReport> {
        let token = get_env_vars(&TOKEN_VARS).ok();
        debug!(authenticated = token.is_some(), "Resolved GitHub credentials");

        let client = GitHubClient::new(&self.api_url, token)?;
        let fetcher = RawFileFetcher::new()?;
        let locations = ArtifactLocations::new(&self.raw_url);
        let collaborators = Collaborators {
            host: &client,
            artifacts: &fetcher,
            locations: &locations,
        };

        let repo = Repo::new(
            collaborators,
            self.org.as_deref(),
            &self.product,
            &self.previous,
            &self.milestone,
        )
        .await
        .with_context(|| format!("Failed to load {} {}", self.product, self.milestone))?;

        let issues = repo.issues(&client).await?;
        Ok(ChangelogReport::new(&repo, issues))
    }
}
