//! Test doubles shared by unit tests

use super::{RepositoryProvider, RepositorySnapshot, SnapshotProvider};
use crate::error::{Result, VerifyError};
use crate::types::{CommitInfo, Readme, RepositoryMetadata, TreeEntry};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ParentStars,
    Contributors,
    Activity,
    FileExists,
    ListTree,
    Readme,
    Commits,
    Releases,
    Size,
}

/// Snapshot provider with injectable failures, delays and tree overrides
pub struct FaultyProvider {
    inner: SnapshotProvider,
    failing: HashSet<Op>,
    delayed: HashMap<Op, std::time::Duration>,
    trees: Option<HashMap<String, Vec<TreeEntry>>>,
    pub list_calls: AtomicUsize,
}

impl FaultyProvider {
    pub fn new(snapshot: RepositorySnapshot) -> Self {
        Self {
            inner: SnapshotProvider::new(snapshot),
            failing: HashSet::new(),
            delayed: HashMap::new(),
            trees: None,
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(mut self, op: Op) -> Self {
        self.failing.insert(op);
        self
    }

    pub fn delayed(mut self, op: Op, delay: std::time::Duration) -> Self {
        self.delayed.insert(op, delay);
        self
    }

    /// Serve listings from `trees` instead of the snapshot's file list
    pub fn with_trees(mut self, trees: HashMap<String, Vec<TreeEntry>>) -> Self {
        self.trees = Some(trees);
        self
    }

    async fn gate(&self, op: Op) -> Result<()> {
        if let Some(delay) = self.delayed.get(&op) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&op) {
            return Err(VerifyError::network(format!("injected failure: {:?}", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryProvider for FaultyProvider {
    async fn resolve_repository(&self, identifier: &str) -> Result<RepositoryMetadata> {
        self.inner.resolve_repository(identifier).await
    }

    async fn parent_star_count(&self, repo: &RepositoryMetadata) -> Result<Option<u32>> {
        self.gate(Op::ParentStars).await?;
        self.inner.parent_star_count(repo).await
    }

    async fn contributor_count(&self, repo: &RepositoryMetadata) -> Result<u32> {
        self.gate(Op::Contributors).await?;
        self.inner.contributor_count(repo).await
    }

    async fn has_activity_within(&self, repo: &RepositoryMetadata, days: u32) -> Result<bool> {
        self.gate(Op::Activity).await?;
        self.inner.has_activity_within(repo, days).await
    }

    async fn any_file_exists(&self, repo: &RepositoryMetadata, patterns: &[String]) -> Result<bool> {
        self.gate(Op::FileExists).await?;
        self.inner.any_file_exists(repo, patterns).await
    }

    async fn list_tree(&self, repo: &RepositoryMetadata, path: &str) -> Result<Vec<TreeEntry>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate(Op::ListTree).await?;
        match &self.trees {
            Some(trees) => Ok(trees.get(path).cloned().unwrap_or_default()),
            None => self.inner.list_tree(repo, path).await,
        }
    }

    async fn fetch_readme(&self, repo: &RepositoryMetadata) -> Result<Option<Readme>> {
        self.gate(Op::Readme).await?;
        self.inner.fetch_readme(repo).await
    }

    async fn recent_commits(&self, repo: &RepositoryMetadata, limit: usize) -> Result<Vec<CommitInfo>> {
        self.gate(Op::Commits).await?;
        self.inner.recent_commits(repo, limit).await
    }

    async fn release_count(&self, repo: &RepositoryMetadata) -> Result<u32> {
        self.gate(Op::Releases).await?;
        self.inner.release_count(repo).await
    }

    async fn repository_size_kb(&self, repo: &RepositoryMetadata) -> Result<u64> {
        self.gate(Op::Size).await?;
        self.inner.repository_size_kb(repo).await
    }
}

/// A snapshot that passes every check under the default configuration
pub fn healthy_snapshot() -> RepositorySnapshot {
    let now = Utc::now();
    let mut files = vec![
        "README.md".to_string(),
        "Cargo.toml".to_string(),
        "rustfmt.toml".to_string(),
    ];
    for dir in 0..10 {
        for file in 0..4 {
            files.push(format!("crate{}/src/mod{}.rs", dir, file));
        }
    }
    files.push("tests/integration.rs".to_string());

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
