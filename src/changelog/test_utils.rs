//! Shared test utilities for the `changelog` module.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::changelog::files::RepoFiles;
use crate::changelog::matchers::ArtifactKind;
use crate::changelog::product::{ArtifactLocations, Product};
use crate::github::{ArtifactSource, CommitRef, PullRequest, ReleaseHost};

pub(crate) const K3S_DOCKERFILE: &str = "FROM rancher/hardened-build-base:v1.20.5b7\n";
pub(crate) const K3S_IMAGE_LIST: &str = include_str!("testdata/image-list.txt");
pub(crate) const K3S_VERSION_SCRIPT: &str = include_str!("testdata/k3s.version.sh.txt");
pub(crate) const K3S_GO_MOD: &str = include_str!("testdata/k3s.go.mod.txt");
pub(crate) const SQLITE_BINDING: &str = include_str!("testdata/sqlite-binding.h.txt");
pub(crate) const RKE2_DOCKERFILE: &str = include_str!("testdata/Dockerfile.txt");
pub(crate) const RKE2_BUILD_IMAGES: &str = include_str!("testdata/build-images.txt");
pub(crate) const RKE2_VERSION_SCRIPT: &str = include_str!("testdata/rke2.version.sh.txt");
pub(crate) const RKE2_GO_MOD: &str = include_str!("testdata/rke2.go.mod.txt");

/// Bundle built from the k3s fixtures.
pub(crate) fn k3s_files() -> RepoFiles {
    RepoFiles {
        dockerfile: K3S_DOCKERFILE.as_bytes().to_vec(),
        image_list: K3S_IMAGE_LIST.as_bytes().to_vec(),
        mod_file: K3S_GO_MOD.as_bytes().to_vec(),
        sqlite_binding: SQLITE_BINDING.as_bytes().to_vec(),
        version_script: K3S_VERSION_SCRIPT.as_bytes().to_vec(),
    }
}

/// Bundle built from the rke2 fixtures.
pub(crate) fn rke2_files() -> RepoFiles {
    RepoFiles {
        dockerfile: RKE2_DOCKERFILE.as_bytes().to_vec(),
        image_list: RKE2_BUILD_IMAGES.as_bytes().to_vec(),
        mod_file: RKE2_GO_MOD.as_bytes().to_vec(),
        sqlite_binding: Vec::new(),
        version_script: RKE2_VERSION_SCRIPT.as_bytes().to_vec(),
    }
}

/// Pull request with the given number, title and body.
pub(crate) fn pull(number: u64, title: &str, body: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        body: Some(body.to_string()),
        html_url: format!("https://github.com/k3s-io/k3s/pull/{number}"),
    }
}

/// Artifact source serving canned files by URL.
///
/// Unknown URLs fail with an error. Every requested URL is recorded in order.
#[derive(Default)]
pub(crate) struct MockArtifactSource {
    files: HashMap<String, Vec<u8>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockArtifactSource {
    /// Adds a file served at `url`.
    pub(crate) fn with_file(mut self, url: String, body: &str) -> Self {
        self.files.insert(url, body.as_bytes().to_vec());
        self
    }

    /// Serves the k3s fixtures at their canonical locations.
    pub(crate) fn k3s(locations: &ArtifactLocations, version: &str) -> Self {
        let url = |kind| locations.url(Product::K3s, kind, version).unwrap();
        Self::default()
            .with_file(url(ArtifactKind::BuildDescriptor), K3S_DOCKERFILE)
            .with_file(url(ArtifactKind::ImageManifest), K3S_IMAGE_LIST)
            .with_file(url(ArtifactKind::VersionScript), K3S_VERSION_SCRIPT)
            .with_file(url(ArtifactKind::ModuleManifest), K3S_GO_MOD)
            .with_file(locations.sqlite_binding("v1.14.17"), SQLITE_BINDING)
    }

    /// Serves the rke2 fixtures at their canonical locations.
    pub(crate) fn rke2(locations: &ArtifactLocations, version: &str) -> Self {
        let url = |kind| locations.url(Product::Rke2, kind, version).unwrap();
        Self::default()
            .with_file(url(ArtifactKind::BuildDescriptor), RKE2_DOCKERFILE)
            .with_file(url(ArtifactKind::ImageManifest), RKE2_BUILD_IMAGES)
            .with_file(url(ArtifactKind::VersionScript), RKE2_VERSION_SCRIPT)
            .with_file(url(ArtifactKind::ModuleManifest), RKE2_GO_MOD)
    }

    /// URLs requested so far.
    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl ArtifactSource for MockArtifactSource {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.requested.lock().unwrap().push(url.to_string());
            self.files
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("status code 404"))
        })
    }
}

/// Release host with a fixed commit range and a FIFO queue of pull request
/// responses, one per queried commit.
///
/// When the queue is exhausted, subsequent queries return
/// `Err("no more mock responses")`. Every queried SHA is recorded.
pub(crate) struct MockReleaseHost {
    commits: Vec<CommitRef>,
    responses: Arc<Mutex<VecDeque<Result<Vec<PullRequest>>>>>,
    queried: Arc<Mutex<Vec<String>>>,
}

impl MockReleaseHost {
    /// Creates a host returning `responses` in order.
    pub(crate) fn new(responses: Vec<Result<Vec<PullRequest>>>) -> Self {
        Self {
            commits: Vec::new(),
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            queried: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a host whose compared range is `shas`.
    pub(crate) fn with_commits(mut self, shas: &[&str]) -> Self {
        self.commits = shas.iter().map(|sha| CommitRef::new(*sha)).collect();
        self
    }

    /// SHAs queried so far.
    pub(crate) fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }

    /// Number of unconsumed responses remaining in the queue.
    pub(crate) fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl ReleaseHost for MockReleaseHost {
    fn compare_commits<'a>(
        &'a self,
        _org: &'a str,
        _repo: &'a str,
        _base: &'a str,
        _head: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CommitRef>>> + Send + 'a>> {
        let commits = self.commits.clone();
        Box::pin(async move { Ok(commits) })
    }

    fn pull_requests_for_commit<'a>(
        &'a self,
        _org: &'a str,
        _repo: &'a str,
        sha: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PullRequest>>> + Send + 'a>> {
        Box::pin(async move {
            self.queried.lock().unwrap().push(sha.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no more mock responses")))
        })
    }
}
