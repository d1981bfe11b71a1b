//! Pull request correlation for a commit range.
//!
//! Every commit is mapped to the pull request that introduced it. Commits
//! attached to zero or several pull requests are skipped, and each pull
//! request is reported once, at the position of its first commit.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::changelog::repo::Repo;
use crate::github::{CommitRef, PullRequest, ReleaseHost};

const RELEASE_NOTE_FENCE: &str = "```release-note";
const CODE_FENCE: &str = "```";

/// Bodies that declare "no release note".
const EMPTY_NOTE_PLACEHOLDERS: [&str; 2] = ["```release-note\n\n```", "```release-note\nNONE\n```"];

/// A pull request as it appears in the changelog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Title with any backport prefix removed.
    pub title: String,
    /// Release note extracted from the body; empty when none was provided.
    pub note: String,
    /// Pull request number.
    pub number: u64,
    /// Browser URL of the pull request.
    pub url: String,
}

impl From<&PullRequest> for Issue {
    fn from(pull: &PullRequest) -> Self {
        Self {
            title: strip_backport_tag(&pull.title),
            note: extract_release_note(pull.body.as_deref().unwrap_or_default()),
            number: pull.number,
            url: pull.html_url.clone(),
        }
    }
}

/// Removes a leading `[Release-x.y]` style backport marker.
///
/// Applies only when the title mentions "release" (any case) and contains a
/// `[`; everything up to and including the first `]` is dropped. The result
/// is trimmed either way.
pub fn strip_backport_tag(title: &str) -> String {
    let title = title.trim();
    if !(title.to_lowercase().contains("release") && title.contains('[')) {
        return title.to_string();
    }
    match title.split_once(']') {
        Some((_, rest)) => rest.trim().to_string(),
        None => title.to_string(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NoteState {
    Before,
    Inside,
}

/// Extracts the first fenced ```` ```release-note ```` block from a body.
///
/// Blank lines inside the block are dropped and the remaining lines joined
/// with `\n`. Bodies without a block, or with an empty or `NONE` block,
/// yield an empty string.
pub fn extract_release_note(body: &str) -> String {
    let body = body.replace("\r\n", "\n").replace('\r', "\n");
    if EMPTY_NOTE_PLACEHOLDERS.iter().any(|p| body.contains(p)) {
        return String::new();
    }

    let mut state = NoteState::Before;
    let mut lines = Vec::new();
    for line in body.lines() {
        match state {
            NoteState::Before if line.contains(RELEASE_NOTE_FENCE) => state = NoteState::Inside,
            NoteState::Before => {}
            NoteState::Inside if line.contains(CODE_FENCE) => break,
            NoteState::Inside => {
                if !line.trim().is_empty() {
                    lines.push(line);
                }
            }
        }
    }

    lines.join("\n").trim().to_string()
}

/// Correlates `commits` with their pull requests on `host`.
///
/// Queries are issued sequentially in commit order; the first failure
/// aborts the whole correlation.
pub async fn correlate(
    host: &dyn ReleaseHost,
    org: &str,
    repo: &str,
    commits: &[CommitRef],
) -> Result<Vec<Issue>> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();

    for commit in commits {
        if commit.sha.is_empty() {
            debug!("Skipping commit without SHA");
            continue;
        }

        let pulls = host
            .pull_requests_for_commit(org, repo, &commit.sha)
            .await
            .with_context(|| format!("Failed to list pull requests for {}", commit.sha))?;

        let [pull] = pulls.as_slice() else {
            debug!(
                sha = %commit.sha,
                count = pulls.len(),
                "Skipping commit not tied to exactly one pull request"
            );
            continue;
        };

        if !seen.insert(pull.number) {
            debug!(sha = %commit.sha, number = pull.number, "Pull request already listed");
            continue;
        }
        issues.push(Issue::from(pull));
    }

    info!(
        org,
        repo,
        commits = commits.len(),
        issues = issues.len(),
        "Correlated pull requests"
    );
    Ok(issues)
}

impl Repo {
    /// Pull requests merged between the previous and current release.
    pub async fn issues(&self, host: &dyn ReleaseHost) -> Result<Vec<Issue>> {
        correlate(host, &self.organization, self.name(), &self.commits).await
    }
}
