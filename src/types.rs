//! Core data types for repository verification reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a repository's metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    /// Repository name
    pub name: String,
    /// Full name in `owner/name` form
    pub full_name: String,
    /// Browser URL of the repository
    #[serde(default)]
    pub url: String,
    pub description: Option<String>,
    /// The repository's own star count
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    /// Primary language detected by the host
    pub language: Option<String>,
    /// License name, if any
    pub license: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Whether this repository is a fork
    #[serde(default)]
    pub fork: bool,
    /// Full name of the upstream repository, for forks
    #[serde(default)]
    pub parent: Option<String>,
    /// Size reported by the host, in kilobytes
    #[serde(default)]
    pub size_kb: Option<u64>,
}

impl RepositoryMetadata {
    /// Owner part of the full name
    pub fn owner(&self) -> &str {
        self.full_name.split('/').next().unwrap_or_default()
    }

    /// Age of the repository in whole days at `now`
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.created_at).num_days()
    }
}

/// Check severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Required signal, double weight
    Error,
    /// Optional signal
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub severity: Severity,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            severity,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            severity,
        }
    }
}

/// Overall quality band derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl std::fmt::Display for QualityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "Excellent"),
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

/// Complete verification report for one repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub repository: RepositoryMetadata,
    /// Results in canonical check order
    pub checks: Vec<CheckResult>,
    /// Score in `[0, 100]`
    pub score: f64,
    pub passed: bool,
    pub summary: String,
    /// Timestamp when the verification was performed
    pub timestamp: DateTime<Utc>,
    /// Star count used for evaluation (parent's count for forks)
    pub effective_stars: u32,
    pub band: QualityBand,
}

impl VerificationReport {
    /// Failed required checks
    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.severity == Severity::Error)
            .collect()
    }

    /// Failed optional checks
    pub fn warnings(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.passed && c.severity == Severity::Warning)
            .collect()
    }

    /// Look up a check result by name
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Kind of a file tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
        }
    }
}

/// README contents as fetched from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readme {
    pub size_bytes: u64,
    pub content: String,
}

impl Readme {
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            size_bytes: content.len() as u64,
            content,
        }
    }
}

/// A commit sample used for cadence analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub timestamp: DateTime<Utc>,
}
