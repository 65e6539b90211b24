//! Offline provider backed by a JSON repository snapshot

use super::{normalize_pattern, RepositoryProvider};
use crate::error::{Result, VerifyError};
use crate::types::{CommitInfo, Readme, RepositoryMetadata, TreeEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Everything a provider would report about one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    pub repository: RepositoryMetadata,
    /// Upstream star count, for forks whose parent is resolvable
    #[serde(default)]
    pub parent_stars: Option<u32>,
    #[serde(default)]
    pub contributors: u32,
    /// Flat list of file paths; directories are implied by prefixes
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub readme: Option<String>,
    /// Commit timestamps, in any order
    #[serde(default)]
    pub commits: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub releases: u32,
}

/// Provider serving a single [`RepositorySnapshot`]
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: RepositorySnapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: RepositorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Load a snapshot from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: RepositorySnapshot = serde_json::from_str(&content)?;
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.snapshot
    }

    fn matches(&self, identifier: &str) -> bool {
        let wanted = identifier
            .trim()
            .trim_end_matches('/')
            .trim_end_matches(".git");
        let full_name = &self.snapshot.repository.full_name;
        wanted == full_name || wanted.ends_with(&format!("/{}", full_name))
    }

    fn path_exists(&self, path: &str) -> bool {
        let prefix = format!("{}/", path);
        self.snapshot
            .files
            .iter()
            .any(|f| f == path || f.starts_with(&prefix))
    }
}

#[async_trait]
impl RepositoryProvider for SnapshotProvider {
    async fn resolve_repository(&self, identifier: &str) -> Result<RepositoryMetadata> {
        if self.matches(identifier) {
            Ok(self.snapshot.repository.clone())
        } else {
            Err(VerifyError::not_found(identifier))
        }
    }

    async fn parent_star_count(&self, repo: &RepositoryMetadata) -> Result<Option<u32>> {
        if !repo.fork {
            return Ok(None);
        }
        Ok(self.snapshot.parent_stars)
    }

    async fn contributor_count(&self, _repo: &RepositoryMetadata) -> Result<u32> {
        Ok(self.snapshot.contributors)
    }

    async fn any_file_exists(&self, _repo: &RepositoryMetadata, patterns: &[String]) -> Result<bool> {
        Ok(patterns
            .iter()
            .map(|p| normalize_pattern(p))
            .any(|p| !p.is_empty() && self.path_exists(p)))
    }

    async fn list_tree(&self, _repo: &RepositoryMetadata, path: &str) -> Result<Vec<TreeEntry>> {
        let path = path.trim_matches('/');
        if !path.is_empty() && !self.path_exists(path) {
            return Err(VerifyError::unavailable(format!("no such path: {}", path)));
        }

        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();
        for file in &self.snapshot.files {
            let Some(rest) = file.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(format!("{}{}", prefix, dir));
                }
                None => {
                    files.insert(file.clone());
                }
            }
        }

        debug!("Snapshot listing for '{}': {} dirs, {} files", path, dirs.len(), files.len());
        Ok(dirs
            .into_iter()
            .map(TreeEntry::dir)
            .chain(files.into_iter().map(TreeEntry::file))
            .collect())
    }

    async fn fetch_readme(&self, _repo: &RepositoryMetadata) -> Result<Option<Readme>> {
        Ok(self.snapshot.readme.as_deref().map(Readme::from_content))
    }

    async fn recent_commits(&self, _repo: &RepositoryMetadata, limit: usize) -> Result<Vec<CommitInfo>> {
        let mut commits: Vec<_> = self
            .snapshot
            .commits
            .iter()
            .map(|&timestamp| CommitInfo { timestamp })
            .collect();
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        commits.truncate(limit);
        Ok(commits)
    }

    async fn release_count(&self, _repo: &RepositoryMetadata) -> Result<u32> {
        Ok(self.snapshot.releases)
    }
}
