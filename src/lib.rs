//! # repo_verify
//!
//! An explainable quality verdict for source repositories:
//! - **Check pipeline**: twelve independent checks that always all run
//! - **Complexity estimation**: bounded breadth-first walk of the file tree
//! - **Authenticity heuristic**: weak signals accumulated as red flags
//! - **Scoring**: severity-weighted 0-100 score with a configurable pass threshold
//!
//! ## Quick Start
//!
//! ```no_run
//! use repo_verify::{verify, GitHubProvider, VerifyConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = VerifyConfig::default();
//! let provider = GitHubProvider::new(&config.network)?;
//! let report = verify("rust-lang/cargo", &provider, &config).await?;
//!
//! println!("{}", report.summary);
//! for check in report.failed_checks() {
//!     println!("{}: {}", check.name, check.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Providers
//!
//! The engine reads repositories only through [`RepositoryProvider`]. Two
//! implementations ship with the crate: [`GitHubProvider`] for the GitHub
//! REST API and [`SnapshotProvider`] for offline JSON snapshots.

mod authenticity;
mod checks;
mod complexity;
mod config;
mod error;
mod pipeline;
mod report;
mod scoring;
mod types;
mod verify;

pub mod provider;

// Re-export public API
pub use checks::CheckKind;
pub use complexity::{ComplexityEstimate, TraversalOutcome};
pub use config::{
    AuthenticityRules, ConfigOverrides, FilePatterns, NetworkConfig, Thresholds, TraversalConfig,
    VerifyConfig, VerifyConfigBuilder,
};
pub use error::{Result, VerifyError};
pub use provider::{GitHubProvider, RepositoryProvider, RepositorySnapshot, SnapshotProvider};
pub use report::render_markdown;
pub use scoring::{calculate_score, determine_band, ERROR_WEIGHT, WARNING_WEIGHT};
pub use types::{
    CheckResult, CommitInfo, EntryKind, QualityBand, Readme, RepositoryMetadata, Severity,
    TreeEntry, VerificationReport,
};
pub use verify::{verify, verify_many};
