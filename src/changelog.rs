//! Version extraction and changelog assembly for k3s and rke2 releases.
//!
//! Release artifacts are retrieved once into a [`RepoFiles`] bundle. Text
//! matchers pull individual versions out of that bundle, the component
//! resolvers wrap them into [`Component`] records with release-note links,
//! and the correlator maps the release's commit range to pull requests.

pub mod components;
pub mod error;
pub mod files;
pub mod gomod;
pub mod issues;
pub mod matchers;
pub mod product;
pub mod repo;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::{major_minor, Component, ComponentKind, Source};
pub use error::ChangelogError;
pub use files::RepoFiles;
pub use gomod::ModFile;
pub use issues::{correlate, extract_release_note, strip_backport_tag, Issue};
pub use matchers::{ArtifactKind, Matcher};
pub use product::{ArtifactLocations, Product};
pub use repo::{Collaborators, Repo};
