//! Extract command: targeted version lookups against local files.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::changelog::{ChangelogError, Matcher};

/// Extract command options.
#[derive(Parser)]
pub struct ExtractCommand {
    /// Matcher to run.
    #[arg(value_name = "MATCHER", value_enum)]
    pub matcher: Matcher,

    /// Artifact file to search.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Lookup key (not used by the sqlite matcher).
    #[arg(value_name = "KEY")]
    pub key: Option<String>,
}

impl ExtractCommand {
    /// Executes the extract command.
    pub fn execute(self) -> Result<()> {
        println!("{}", self.run()?);
        Ok(())
    }

    /// Runs the lookup and returns the matched version.
    pub fn run(&self) -> Result<String> {
        let matcher = self.matcher;
        let key = self.key.as_deref().unwrap_or_default();
        if matcher.needs_key() && key.is_empty() {
            return Err(ChangelogError::MissingArgument("key").into());
        }

        let bytes = fs::read(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let text = String::from_utf8_lossy(&bytes);

        matcher
            .apply(&text, key)
            .with_context(|| {
                format!("No match in {} ({})", self.file.display(), matcher.artifact())
            })
    }
}
