//! Repository metadata providers

pub mod github;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use github::GitHubProvider;
pub use snapshot::{RepositorySnapshot, SnapshotProvider};

use crate::error::{Result, VerifyError};
use crate::types::{CommitInfo, Readme, RepositoryMetadata, TreeEntry};
use async_trait::async_trait;
use chrono::{Duration, Utc};

/// Source of repository signals consumed by the checks.
///
/// Every method may fail with a transient error; callers inside the engine
/// convert those failures into check results instead of propagating them.
#[async_trait]
pub trait RepositoryProvider: Send + Sync {
    /// Look up a repository by `owner/name` or URL
    async fn resolve_repository(&self, identifier: &str) -> Result<RepositoryMetadata>;

    /// Star count of the upstream repository, `None` when there is none
    async fn parent_star_count(&self, repo: &RepositoryMetadata) -> Result<Option<u32>>;

    async fn contributor_count(&self, repo: &RepositoryMetadata) -> Result<u32>;

    async fn has_activity_within(&self, repo: &RepositoryMetadata, days: u32) -> Result<bool> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        Ok(repo.updated_at > cutoff)
    }

    /// True if any of `patterns` names an existing file or directory
    async fn any_file_exists(&self, repo: &RepositoryMetadata, patterns: &[String]) -> Result<bool>;

    /// Direct children of `path` (`""` is the root)
    async fn list_tree(&self, repo: &RepositoryMetadata, path: &str) -> Result<Vec<TreeEntry>>;

    /// README, or `None` if the repository has none
    async fn fetch_readme(&self, repo: &RepositoryMetadata) -> Result<Option<Readme>>;

    /// Up to `limit` most recent commits, newest first
    async fn recent_commits(&self, repo: &RepositoryMetadata, limit: usize) -> Result<Vec<CommitInfo>>;

    async fn release_count(&self, repo: &RepositoryMetadata) -> Result<u32>;

    async fn repository_size_kb(&self, repo: &RepositoryMetadata) -> Result<u64> {
        repo.size_kb
            .ok_or_else(|| VerifyError::unavailable("repository size"))
    }
}

/// Normalize an existence pattern (`"tests/"` -> `"tests"`)
pub(crate) fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim().trim_matches('/')
}
