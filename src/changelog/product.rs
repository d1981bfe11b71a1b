//! Product lines and where their release artifacts live.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::changelog::error::ChangelogError;
use crate::changelog::matchers::ArtifactKind;

/// Default base URL for raw repository content.
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Distribution variants whose artifacts differ in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Lightweight Kubernetes.
    K3s,
    /// Security-focused Kubernetes distribution.
    Rke2,
}

impl Product {
    /// Repository name, also used as the product name on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::K3s => "k3s",
            Self::Rke2 => "rke2",
        }
    }

    /// GitHub organisation hosting the product repository.
    pub fn default_organization(self) -> &'static str {
        match self {
            Self::K3s => "k3s-io",
            Self::Rke2 => "rancher",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Product {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "k3s" => Ok(Self::K3s),
            "rke2" => Ok(Self::Rke2),
            _ => Err(ChangelogError::UnsupportedProduct(s.to_string())),
        }
    }
}

/// Builds artifact URLs relative to a raw-content host.
#[derive(Debug, Clone)]
pub struct ArtifactLocations {
    raw_base: String,
}

impl Default for ArtifactLocations {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_URL)
    }
}

impl ArtifactLocations {
    /// Creates locations rooted at `raw_base`.
    pub fn new(raw_base: &str) -> Self {
        Self {
            raw_base: raw_base.trim_end_matches('/').to_string(),
        }
    }

    /// URL of `kind` for `product` at `version`.
    ///
    /// Returns `None` for the native header, whose location depends on a
    /// module version rather than the release; see [`Self::sqlite_binding`].
    pub fn url(&self, product: Product, kind: ArtifactKind, version: &str) -> Option<String> {
        let path = match (product, kind) {
            (Product::K3s, ArtifactKind::BuildDescriptor) => "k3s-io/k3s/{v}/Dockerfile.dapper",
            (Product::K3s, ArtifactKind::ImageManifest) => "k3s-io/k3s/{v}/scripts/airgap/image-list.txt",
            (Product::K3s, ArtifactKind::VersionScript) => "k3s-io/k3s/{v}/scripts/version.sh",
            (Product::K3s, ArtifactKind::ModuleManifest) => "k3s-io/k3s/{v}/go.mod",
            (Product::Rke2, ArtifactKind::BuildDescriptor) => "rancher/rke2/{v}/Dockerfile",
            (Product::Rke2, ArtifactKind::ImageManifest) => "rancher/rke2/{v}/scripts/build-images",
            (Product::Rke2, ArtifactKind::VersionScript) => "rancher/rke2/{v}/scripts/version.sh",
            (Product::Rke2, ArtifactKind::ModuleManifest) => "rancher/rke2/{v}/go.mod",
            (_, ArtifactKind::NativeHeader) => return None,
        };
        Some(format!("{}/{}", self.raw_base, path.replace("{v}", version)))
    }

    /// URL of the SQLite binding header shipped with go-sqlite3 `module_version`.
    pub fn sqlite_binding(&self, module_version: &str) -> String {
        format!(
            "{}/mattn/go-sqlite3/{module_version}/sqlite3-binding.h",
            self.raw_base
        )
    }
}
