//! Top-level aggregate for one changelog-generation run.

use anyhow::{Context, Result};
use tracing::info;

use crate::changelog::error::ChangelogError;
use crate::changelog::files::RepoFiles;
use crate::changelog::product::{ArtifactLocations, Product};
use crate::github::{ArtifactSource, CommitRef, ReleaseHost};

/// External collaborators needed to build a [`Repo`].
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Commit range and pull request queries.
    pub host: &'a dyn ReleaseHost,
    /// Raw artifact retrieval.
    pub artifacts: &'a dyn ArtifactSource,
    /// Where each product line keeps its artifacts.
    pub locations: &'a ArtifactLocations,
}

/// A release of one product line, with its commit range and artifacts.
///
/// Components are resolved on demand from [`Repo::files`] and issues are
/// correlated from [`Repo::commits`]; neither is stored.
#[derive(Debug, Clone)]
pub struct Repo {
    /// Product line.
    pub product: Product,
    /// Organisation owning the repository.
    pub organization: String,
    /// Release being reported.
    pub version: String,
    /// Release the range starts from.
    pub previous_version: String,
    /// Commits between the two releases, oldest first.
    pub commits: Vec<CommitRef>,
    /// Artifacts retrieved at `version`.
    pub files: RepoFiles,
}

impl Repo {
    /// Builds the aggregate for `product` at `milestone`.
    ///
    /// Both milestones are checked before any collaborator is called. The
    /// commit range is computed first, then every artifact is retrieved;
    /// the first failure aborts construction.
    pub async fn new(
        collaborators: Collaborators<'_>,
        organization: Option<&str>,
        product: &str,
        previous_milestone: &str,
        milestone: &str,
    ) -> Result<Self> {
        if milestone.is_empty() {
            return Err(ChangelogError::MissingArgument("milestone").into());
        }
        if previous_milestone.is_empty() {
            return Err(ChangelogError::MissingArgument("previous milestone").into());
        }
        let product: Product = product.parse()?;
        let organization = organization
            .filter(|org| !org.is_empty())
            .unwrap_or(product.default_organization())
            .to_string();

        let commits = collaborators
            .host
            .compare_commits(&organization, product.name(), previous_milestone, milestone)
            .await
            .with_context(|| {
                format!("Failed to compare {previous_milestone}...{milestone} for {product}")
            })?;

        let files = RepoFiles::fetch(
            collaborators.artifacts,
            collaborators.locations,
            product,
            milestone,
        )
        .await?;

        info!(
            %product,
            organization = %organization,
            milestone,
            commits = commits.len(),
            "Built release aggregate"
        );

        Ok(Self {
            product,
            organization,
            version: milestone.to_string(),
            previous_version: previous_milestone.to_string(),
            commits,
            files,
        })
    }

    /// Repository name.
    pub fn name(&self) -> &'static str {
        self.product.name()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        product: Product,
        organization: &str,
        version: &str,
        commits: Vec<CommitRef>,
        files: RepoFiles,
    ) -> Self {
        Self {
            product,
            organization: organization.to_string(),
            version: version.to_string(),
            previous_version: String::new(),
            commits,
            files,
        }
    }
}
