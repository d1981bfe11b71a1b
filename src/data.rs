//! Report structures and serialization.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::changelog::{Component, Issue, Product, Repo};

pub mod yaml;

pub use yaml::to_yaml;

/// Version shown for components whose resolution failed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Complete changelog for one release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogReport {
    /// Product line.
    pub product: Product,
    /// Release being reported.
    pub version: String,
    /// Release the commit range starts from.
    pub previous_version: String,
    /// Version of the tool that produced the report.
    pub tool_version: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Components shipped by the product line, in catalogue order.
    pub components: Vec<Component>,
    /// Pull requests merged in the range, in commit order.
    pub issues: Vec<Issue>,
}

impl ChangelogReport {
    /// Assembles the report for `repo`.
    ///
    /// Components the product line does not ship are omitted. A component
    /// whose resolution fails is logged and kept with an `N/A` version.
    pub fn new(repo: &Repo, issues: Vec<Issue>) -> Self {
        let components = repo
            .components()
            .into_iter()
            .filter_map(|(kind, result)| match result {
                Ok(component) if component.is_available() => Some(component),
                Ok(_) => None,
                Err(err) => {
                    warn!(component = kind.name(), error = %err, "Failed to resolve component");
                    Some(Component {
                        name: kind.name().to_string(),
                        version: NOT_AVAILABLE.to_string(),
                        ..Component::default()
                    })
                }
            })
            .collect();

        Self {
            product: repo.product,
            version: repo.version.clone(),
            previous_version: repo.previous_version.clone(),
            tool_version: crate::VERSION.to_string(),
            generated_at: Utc::now(),
            components,
            issues,
        }
    }

    /// Renders the report in `format`.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Yaml => to_yaml(self),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
        }
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML with block scalars for release notes.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown output format '{s}'. Expected yaml or json"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}
