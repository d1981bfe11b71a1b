//! CLI interface for distro-changelog.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod extract;
pub mod generate;

pub use extract::ExtractCommand;
pub use generate::GenerateCommand;

/// distro-changelog: component versions and changelogs for k3s and rke2 releases.
#[derive(Parser)]
#[command(name = "distro-changelog")]
#[command(about = "Component versions and changelogs for k3s and rke2 releases", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generates the changelog for a release.
    Generate(GenerateCommand),
    /// Runs one version matcher against a local file.
    Extract(ExtractCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Generate(generate_cmd) => generate_cmd.execute().await,
            Commands::Extract(extract_cmd) => extract_cmd.execute(),
        }
    }
}
