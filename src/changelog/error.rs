//! Changelog-specific error handling.

use thiserror::Error;

use crate::changelog::matchers::ArtifactKind;

/// Errors raised while extracting versions or assembling a changelog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChangelogError {
    /// The expected pattern is absent from the artifact.
    #[error("{key} not found in {kind}")]
    NotFound {
        /// Artifact that was searched.
        kind: ArtifactKind,
        /// Lookup key that failed to match.
        key: String,
    },

    /// Extracted text is not a semantic version where one is required.
    #[error("version is not valid: {0:?}")]
    InvalidVersion(String),

    /// A required argument was empty.
    #[error("{0} is empty")]
    MissingArgument(&'static str),

    /// Product name outside the known product lines.
    #[error("unknown product {0:?}")]
    UnsupportedProduct(String),

    /// The module manifest could not be parsed.
    #[error("go.mod:{line}: {reason}")]
    ModuleManifest {
        /// 1-based line number of the offending directive.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A remote endpoint answered with a non-success status.
    #[error("GET {url} returned status code {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

impl ChangelogError {
    /// Shorthand for a [`ChangelogError::NotFound`].
    pub(crate) fn not_found(kind: ArtifactKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Returns `true` for the recoverable "pattern absent" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
