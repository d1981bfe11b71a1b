//! In-memory bundle of the artifacts retrieved for one release.

use std::borrow::Cow;

use anyhow::{Context, Result};
use tracing::info;

use crate::changelog::error::ChangelogError;
use crate::changelog::matchers::{self, ArtifactKind};
use crate::changelog::product::{ArtifactLocations, Product};
use crate::github::ArtifactSource;

/// Raw artifact contents for one product/version pair.
///
/// Populated once and read-only afterwards. The SQLite binding header is only
/// shipped for k3s and stays empty otherwise.
#[derive(Debug, Clone, Default)]
pub struct RepoFiles {
    /// Container build descriptor.
    pub dockerfile: Vec<u8>,
    /// Image list or image build script.
    pub image_list: Vec<u8>,
    /// Go module manifest.
    pub mod_file: Vec<u8>,
    /// SQLite binding header.
    pub sqlite_binding: Vec<u8>,
    /// Shell script exporting component versions.
    pub version_script: Vec<u8>,
}

impl RepoFiles {
    /// Retrieves every artifact for `product` at `version`, one after another.
    ///
    /// The first failing download aborts the sequence.
    pub async fn fetch(
        source: &dyn ArtifactSource,
        locations: &ArtifactLocations,
        product: Product,
        version: &str,
    ) -> Result<Self> {
        let get = |kind: ArtifactKind| async move {
            let url = locations
                .url(product, kind, version)
                .with_context(|| format!("No {kind} location for {product}"))?;
            source
                .fetch(&url)
                .await
                .with_context(|| format!("Failed to retrieve {kind} for {product} {version}"))
        };

        let dockerfile = get(ArtifactKind::BuildDescriptor).await?;
        let image_list = get(ArtifactKind::ImageManifest).await?;
        let version_script = get(ArtifactKind::VersionScript).await?;
        let mod_file = get(ArtifactKind::ModuleManifest).await?;

        let sqlite_binding = match product {
            Product::K3s => {
                let text = String::from_utf8_lossy(&mod_file);
                let module_version = matchers::go_dependency(&text, "go-sqlite3")
                    .context("Failed to locate go-sqlite3 in go.mod")?;
                let url = locations.sqlite_binding(&module_version);
                source.fetch(&url).await.with_context(|| {
                    format!("Failed to retrieve {} for {product} {version}", ArtifactKind::NativeHeader)
                })?
            }
            Product::Rke2 => Vec::new(),
        };

        info!(%product, version, "Retrieved release artifacts");

        Ok(Self {
            dockerfile,
            image_list,
            mod_file,
            sqlite_binding,
            version_script,
        })
    }

    fn text(bytes: &[u8]) -> Cow<'_, str> {
        String::from_utf8_lossy(bytes)
    }

    /// Chart version built from `/charts/<name>.yaml` in the Dockerfile.
    pub fn dockerfile_chart(&self, name: &str) -> Result<String, ChangelogError> {
        matchers::dockerfile_chart(&Self::text(&self.dockerfile), name)
    }

    /// Tag of the Dockerfile layer mentioning `name`.
    pub fn dockerfile_layer(&self, name: &str) -> Result<String, ChangelogError> {
        matchers::dockerfile_layer(&Self::text(&self.dockerfile), name)
    }

    /// Version of the Go module whose path contains `name`.
    pub fn go_dependency(&self, name: &str) -> Result<String, ChangelogError> {
        matchers::go_dependency(&Self::text(&self.mod_file), name)
    }

    /// Tag of the image mentioning `name`.
    pub fn image(&self, name: &str) -> Result<String, ChangelogError> {
        matchers::image(&Self::text(&self.image_list), name)
    }

    /// Version assigned to `variable` in the version script.
    pub fn build_version(&self, variable: &str) -> Result<String, ChangelogError> {
        matchers::build_version(&Self::text(&self.version_script), variable)
    }

    /// SQLite version from the binding header.
    pub fn sqlite(&self) -> Result<String, ChangelogError> {
        matchers::sqlite_version(&Self::text(&self.sqlite_binding))
    }
}
