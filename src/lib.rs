//! # distro-changelog
//!
//! Component version extraction and changelog assembly for k3s and rke2
//! releases.
//!
//! ## Quick Start
//!
//! ```rust
//! use distro_changelog::changelog::matchers;
//!
//! let list = "docker.io/rancher/klipper-helm:v0.8.0\n";
//! assert_eq!(matchers::image(list, "klipper-helm").unwrap(), "v0.8.0");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod changelog;
pub mod cli;
pub mod data;
pub mod github;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of distro-changelog.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
