//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use repo_verify::{
    CommitInfo, Readme, RepositoryMetadata, RepositoryProvider, RepositorySnapshot, Result,
    SnapshotProvider, TreeEntry, VerifyError,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// A repository that satisfies every default requirement
pub fn healthy_snapshot() -> RepositorySnapshot {
    let now = Utc::now();
    let mut files = vec![
        "README.md".to_string(),
        "Cargo.toml".to_string(),
        "rustfmt.toml".to_string(),
        "tests/integration.rs".to_string(),
    ];
    for dir in 0..10 {
        for file in 0..4 {
            files.push(format!("crate{}/src/mod{}.rs", dir, file));
        }
    }

    RepositorySnapshot {
        repository: RepositoryMetadata {
            name: "widget".to_string(),
            full_name: "acme/widget".to_string(),
            url: "https://github.com/acme/widget".to_string(),
            description: Some("A carefully maintained widget toolkit".to_string()),
            stars: 1200,
            forks: 80,
            language: Some("Rust".to_string()),
            license: Some("MIT License".to_string()),
            created_at: now - Duration::days(900),
            updated_at: now - Duration::days(2),
            topics: vec!["widgets".to_string()],
            fork: false,
            parent: None,
            size_kb: Some(4096),
        },
        parent_stars: None,
        contributors: 12,
        files,
        readme: Some(format!("# widget\n\n{}", "Usage notes and examples. ".repeat(40))),
        commits: (0..20).map(|i| now - Duration::days(i * 10)).collect(),
        releases: 7,
    }
}

/// A week-old repository pushed in one sitting
pub fn rushed_snapshot() -> RepositorySnapshot {
    let now = Utc::now();
    let mut snapshot = healthy_snapshot();
    snapshot.repository.full_name = "someone/quick-demo".to_string();
    snapshot.repository.name = "quick-demo".to_string();
    snapshot.repository.description = Some("wip".to_string());
    snapshot.repository.stars = 1;
    snapshot.repository.created_at = now - Duration::days(8);
    snapshot.repository.updated_at = now - Duration::hours(3);
    snapshot.commits = (0..15).map(|i| now - Duration::hours(i * 3)).collect();
    snapshot.releases = 0;
    snapshot.readme = Some("# quick-demo\n".to_string());
    snapshot
}

/// Write `snapshot` as JSON into a fresh temp dir
pub fn write_snapshot(snapshot: &RepositorySnapshot) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, serde_json::to_string_pretty(snapshot).unwrap()).unwrap();
    (dir, path)
}

/// Snapshot provider whose contributor and README lookups always fail
pub struct FlakyProvider {
    inner: SnapshotProvider,
}

impl FlakyProvider {
    pub fn new(snapshot: RepositorySnapshot) -> Self {
        Self {
            inner: SnapshotProvider::new(snapshot),
        }
    }
}

#[async_trait]
impl RepositoryProvider for FlakyProvider {
    async fn resolve_repository(&self, identifier: &str) -> Result<RepositoryMetadata> {
        self.inner.resolve_repository(identifier).await
    }

    async fn parent_star_count(&self, repo: &RepositoryMetadata) -> Result<Option<u32>> {
        self.inner.parent_star_count(repo).await
    }

    async fn contributor_count(&self, _repo: &RepositoryMetadata) -> Result<u32> {
        Err(VerifyError::RateLimitExceeded {
            service: "test".to_string(),
            retry_after: None,
        })
    }

    async fn any_file_exists(&self, repo: &RepositoryMetadata, patterns: &[String]) -> Result<bool> {
        self.inner.any_file_exists(repo, patterns).await
    }

    async fn list_tree(&self, repo: &RepositoryMetadata, path: &str) -> Result<Vec<TreeEntry>> {
        self.inner.list_tree(repo, path).await
    }

    async fn fetch_readme(&self, _repo: &RepositoryMetadata) -> Result<Option<Readme>> {
        Err(VerifyError::unavailable("README endpoint down"))
    }

    async fn recent_commits(&self, repo: &RepositoryMetadata, limit: usize) -> Result<Vec<CommitInfo>> {
        self.inner.recent_commits(repo, limit).await
    }

    async fn release_count(&self, repo: &RepositoryMetadata) -> Result<u32> {
        self.inner.release_count(repo).await
    }
}
