//! Pattern-based extraction rules, one per artifact kind.
//!
//! Every matcher takes the raw artifact text and a lookup key and returns the
//! first match. Line-oriented matchers only apply their pattern to lines that
//! contain the key; the first such line with a match wins. No attempt is made
//! to detect conflicting declarations further down the file.

use std::fmt;
use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;

use crate::changelog::error::ChangelogError;
use crate::changelog::gomod::ModFile;

/// `vX.Y.Z` optionally followed by a k3s pre-release tag such as `-k3s1`.
static BUILD_SCRIPT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(v\d+\.\d+\.\d+(?:-k3s\.?\w+)?)").unwrap());

/// `CHART_VERSION="<version>-<qualifier>"`, qualifier excluded from the capture.
static CHART_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"CHART_VERSION="([\w.]*)-?\S*""#).unwrap());

/// `FROM <image-ref>:<tag>`.
static LAYER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FROM\s+[\w./-]+:([\w.]+)").unwrap());

/// The tag following the first colon of an image reference.
static IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":([\w.]+)").unwrap());

static SQLITE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"define\s*.*SQLITE_VERSION\s*"(.+)""#).unwrap());

/// Kinds of artifact retrieved for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Container build descriptor (Dockerfile).
    BuildDescriptor,
    /// Airgap image list or image build script.
    ImageManifest,
    /// Shell script exporting component versions.
    VersionScript,
    /// Go module manifest.
    ModuleManifest,
    /// SQLite amalgamation header.
    NativeHeader,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BuildDescriptor => "Dockerfile",
            Self::ImageManifest => "image list",
            Self::VersionScript => "version script",
            Self::ModuleManifest => "go.mod",
            Self::NativeHeader => "sqlite binding header",
        };
        f.write_str(name)
    }
}

/// Extraction rules exposed for targeted lookups.
///
/// Command-line names are the kebab-case variant names, e.g. `dockerfile-chart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Matcher {
    /// Chart version from a `/charts/<key>.yaml` build line.
    DockerfileChart,
    /// Tag of a `FROM` layer mentioning the key.
    DockerfileLayer,
    /// Module version, replace directives first.
    GoDependency,
    /// Image tag from the image manifest.
    Image,
    /// `vX.Y.Z` token on a version script line mentioning the key.
    BuildVersion,
    /// `SQLITE_VERSION` macro value. Ignores the key.
    Sqlite,
}

impl Matcher {
    /// Whether [`Self::apply`] uses its key.
    pub fn needs_key(self) -> bool {
        self != Self::Sqlite
    }

    /// Artifact this matcher reads.
    pub fn artifact(self) -> ArtifactKind {
        match self {
            Self::DockerfileChart | Self::DockerfileLayer => ArtifactKind::BuildDescriptor,
            Self::GoDependency => ArtifactKind::ModuleManifest,
            Self::Image => ArtifactKind::ImageManifest,
            Self::BuildVersion => ArtifactKind::VersionScript,
            Self::Sqlite => ArtifactKind::NativeHeader,
        }
    }

    /// Runs the matcher over raw artifact text.
    pub fn apply(self, text: &str, key: &str) -> Result<String, ChangelogError> {
        match self {
            Self::DockerfileChart => dockerfile_chart(text, key),
            Self::DockerfileLayer => dockerfile_layer(text, key),
            Self::GoDependency => go_dependency(text, key),
            Self::Image => image(text, key),
            Self::BuildVersion => build_version(text, key),
            Self::Sqlite => sqlite_version(text),
        }
    }
}

/// Applies `pattern` to the first line containing `needle` that it matches.
fn scan_lines(text: &str, needle: &str, pattern: &Regex) -> Option<String> {
    text.lines()
        .filter(|line| line.contains(needle))
        .find_map(|line| pattern.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Returns the chart version built from `/charts/<name>.yaml`.
pub fn dockerfile_chart(text: &str, name: &str) -> Result<String, ChangelogError> {
    let needle = format!("/charts/{name}.yaml");
    scan_lines(text, &needle, &CHART_PATTERN)
        .ok_or_else(|| ChangelogError::not_found(ArtifactKind::BuildDescriptor, name))
}

/// Returns the tag of the first `FROM` layer whose line mentions `name`.
pub fn dockerfile_layer(text: &str, name: &str) -> Result<String, ChangelogError> {
    scan_lines(text, name, &LAYER_PATTERN)
        .ok_or_else(|| ChangelogError::not_found(ArtifactKind::BuildDescriptor, name))
}

/// Returns the version token assigned on the first script line mentioning `variable`.
pub fn build_version(text: &str, variable: &str) -> Result<String, ChangelogError> {
    scan_lines(text, variable, &BUILD_SCRIPT_PATTERN)
        .ok_or_else(|| ChangelogError::not_found(ArtifactKind::VersionScript, variable))
}

/// Returns the tag of the first image reference mentioning `name`.
pub fn image(text: &str, name: &str) -> Result<String, ChangelogError> {
    scan_lines(text, name, &IMAGE_PATTERN)
        .ok_or_else(|| ChangelogError::not_found(ArtifactKind::ImageManifest, name))
}

/// Parses a module manifest and returns the version of the module whose path
/// contains `name`.
pub fn go_dependency(text: &str, name: &str) -> Result<String, ChangelogError> {
    ModFile::parse(text)?.dependency(name)
}

/// Returns the `SQLITE_VERSION` macro value from the binding header.
pub fn sqlite_version(text: &str) -> Result<String, ChangelogError> {
    SQLITE_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ChangelogError::not_found(ArtifactKind::NativeHeader, "SQLITE_VERSION"))
}
