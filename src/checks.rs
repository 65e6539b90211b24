//! The individual repository checks

use crate::authenticity;
use crate::complexity::{ComplexityEstimator, TraversalOutcome};
use crate::config::VerifyConfig;
use crate::error::{Result, VerifyError};
use crate::provider::RepositoryProvider;
use crate::types::{CheckResult, RepositoryMetadata, Severity};
use chrono::{DateTime, Utc};
use tracing::warn;

/// README keyword hits at which a repository is considered network-heavy
const NETWORK_KEYWORD_LIMIT: usize = 3;

/// Everything a check may read. Nothing in here is mutated during a run.
pub struct CheckContext<'a> {
    pub repo: &'a RepositoryMetadata,
    pub provider: &'a dyn RepositoryProvider,
    pub config: &'a VerifyConfig,
    /// Star count with fork-parent substitution applied
    pub effective_stars: u32,
    pub now: DateTime<Utc>,
}

/// What a check reports when its provider calls fail or time out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Degradation {
    /// Report `passed = false` at the given severity
    FailClosed(Severity),
    /// Report `passed = true` as a warning
    Permissive,
}

/// The fixed set of checks, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    GitRepository,
    PrimaryLanguage,
    License,
    Contributors,
    RecentActivity,
    Testing,
    BuildFiles,
    CodeQuality,
    NetworkUsage,
    Complexity,
    Authenticity,
    Size,
}

impl CheckKind {
    pub const ALL: [CheckKind; 12] = [
        CheckKind::GitRepository,
        CheckKind::PrimaryLanguage,
        CheckKind::License,
        CheckKind::Contributors,
        CheckKind::RecentActivity,
        CheckKind::Testing,
        CheckKind::BuildFiles,
        CheckKind::CodeQuality,
        CheckKind::NetworkUsage,
        CheckKind::Complexity,
        CheckKind::Authenticity,
        CheckKind::Size,
    ];

    /// Stable name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Self::GitRepository => "Git Repository",
            Self::PrimaryLanguage => "Primary Language",
            Self::License => "Open License",
            Self::Contributors => "Multiple Contributors",
            Self::RecentActivity => "Recent Activity",
            Self::Testing => "Testing Practices",
            Self::BuildFiles => "Build Instructions",
            Self::CodeQuality => "Code Quality",
            Self::NetworkUsage => "Network Usage",
            Self::Complexity => "Project Complexity",
            Self::Authenticity => authenticity::CHECK_NAME,
            Self::Size => "Repository Size",
        }
    }

    /// Nominal severity. The authenticity check escalates to `error` when it fails.
    pub fn severity(self) -> Severity {
        match self {
            Self::RecentActivity
            | Self::Testing
            | Self::CodeQuality
            | Self::NetworkUsage
            | Self::Authenticity => Severity::Warning,
            _ => Severity::Error,
        }
    }

    fn degradation(self) -> Degradation {
        match self {
            Self::NetworkUsage | Self::Authenticity | Self::Size => Degradation::Permissive,
            other => Degradation::FailClosed(other.severity()),
        }
    }

    /// Result to report when the check could not gather its signal
    pub fn degraded(self, err: &VerifyError) -> CheckResult {
        warn!("{} check degraded: {}", self.name(), err);
        match self.degradation() {
            Degradation::FailClosed(severity) => CheckResult::fail(
                self.name(),
                format!("Could not verify {}: {}", self.subject(), err),
                severity,
            ),
            Degradation::Permissive => {
                let message = match self {
                    Self::Authenticity => "Could not fully verify".to_string(),
                    _ => format!("Could not verify {}", self.subject()),
                };
                CheckResult::pass(self.name(), message, Severity::Warning)
            }
        }
    }

    fn subject(self) -> &'static str {
        match self {
            Self::GitRepository => "repository",
            Self::PrimaryLanguage => "primary language",
            Self::License => "license",
            Self::Contributors => "contributors",
            Self::RecentActivity => "recent activity",
            Self::Testing => "testing practices",
            Self::BuildFiles => "build instructions",
            Self::CodeQuality => "code quality tooling",
            Self::NetworkUsage => "network usage",
            Self::Complexity => "complexity",
            Self::Authenticity => "project quality",
            Self::Size => "size",
        }
    }

    /// Evaluate the check. An `Err` means the signal could not be gathered
    /// and must be passed through [`CheckKind::degraded`].
    pub async fn run(self, ctx: &CheckContext<'_>) -> Result<CheckResult> {
        match self {
            Self::GitRepository => Ok(check_git_repository()),
            Self::PrimaryLanguage => Ok(check_primary_language(ctx.repo)),
            Self::License => Ok(check_license(ctx.repo)),
            Self::Contributors => check_contributors(ctx).await,
            Self::RecentActivity => check_recent_activity(ctx).await,
            Self::Testing => check_testing(ctx).await,
            Self::BuildFiles => check_build_files(ctx).await,
            Self::CodeQuality => Ok(check_code_quality(ctx).await),
            Self::NetworkUsage => check_network_usage(ctx).await,
            Self::Complexity => Ok(check_complexity(ctx).await),
            Self::Authenticity => {
                authenticity::evaluate(
                    ctx.provider,
                    ctx.repo,
                    ctx.effective_stars,
                    &ctx.config.authenticity,
                    ctx.now,
                )
                .await
            }
            Self::Size => check_size(ctx).await,
        }
    }
}

/// Trivially true: the metadata could be fetched
fn check_git_repository() -> CheckResult {
    let kind = CheckKind::GitRepository;
    CheckResult::pass(kind.name(), "Valid git repository", kind.severity())
}

fn check_primary_language(repo: &RepositoryMetadata) -> CheckResult {
    let kind = CheckKind::PrimaryLanguage;
    match repo.language.as_deref().filter(|l| !l.is_empty()) {
        Some(language) => CheckResult::pass(
            kind.name(),
            format!("Primary language is {}", language),
            kind.severity(),
        ),
        None => CheckResult::fail(kind.name(), "No primary language detected", kind.severity()),
    }
}

fn check_license(repo: &RepositoryMetadata) -> CheckResult {
    let kind = CheckKind::License;
    match repo.license.as_deref() {
        Some(license) => CheckResult::pass(
            kind.name(),
            format!("Licensed under {}", license),
            kind.severity(),
        ),
        None => CheckResult::fail(kind.name(), "No license detected", kind.severity()),
    }
}

async fn check_contributors(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::Contributors;
    let count = ctx.provider.contributor_count(ctx.repo).await?;
    let min = ctx.config.thresholds.min_contributors;

    Ok(if count >= min {
        CheckResult::pass(kind.name(), format!("Has {} contributors", count), kind.severity())
    } else {
        CheckResult::fail(
            kind.name(),
            format!("Only {} contributor(s), minimum is {}", count, min),
            kind.severity(),
        )
    })
}

async fn check_recent_activity(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::RecentActivity;
    let days = ctx.config.thresholds.activity_window_days;

    Ok(if ctx.provider.has_activity_within(ctx.repo, days).await? {
        CheckResult::pass(kind.name(), format!("Active in last {} days", days), kind.severity())
    } else {
        CheckResult::fail(kind.name(), format!("No activity in last {} days", days), kind.severity())
    })
}

async fn check_testing(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::Testing;
    let found = ctx
        .provider
        .any_file_exists(ctx.repo, &ctx.config.patterns.testing)
        .await?;

    Ok(if found {
        CheckResult::pass(kind.name(), "Testing files/directories found", kind.severity())
    } else {
        CheckResult::fail(kind.name(), "No testing files/directories detected", kind.severity())
    })
}

async fn check_build_files(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::BuildFiles;
    let found = ctx
        .provider
        .any_file_exists(ctx.repo, &ctx.config.patterns.build)
        .await?;

    Ok(if found {
        CheckResult::pass(kind.name(), "Build/setup files found", kind.severity())
    } else {
        CheckResult::fail(kind.name(), "No clear build/setup instructions found", kind.severity())
    })
}

/// Linter configuration, or enough community validation in its place
async fn check_code_quality(ctx: &CheckContext<'_>) -> CheckResult {
    let kind = CheckKind::CodeQuality;
    let stars = ctx.effective_stars;
    let fallback = ctx.config.thresholds.quality_star_fallback;

    let has_tools = match ctx
        .provider
        .any_file_exists(ctx.repo, &ctx.config.patterns.quality_tools)
        .await
    {
        Ok(found) => found,
        Err(e) => {
            warn!("Could not probe quality tooling for {}: {}", ctx.repo.full_name, e);
            false
        }
    };

    if has_tools {
        CheckResult::pass(kind.name(), "Quality tools found (linters/formatters)", kind.severity())
    } else if stars >= fallback {
        CheckResult::pass(
            kind.name(),
            format!("High community validation ({} stars)", stars),
            kind.severity(),
        )
    } else {
        CheckResult::fail(
            kind.name(),
            format!("No quality tools and limited stars ({})", stars),
            kind.severity(),
        )
    }
}

/// README keyword heuristic for server-style projects
async fn check_network_usage(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::NetworkUsage;
    let Some(readme) = ctx.provider.fetch_readme(ctx.repo).await? else {
        return Err(VerifyError::unavailable("README"));
    };

    let content = readme.content.to_lowercase();
    let found: Vec<&str> = ctx
        .config
        .patterns
        .network_keywords
        .iter()
        .map(String::as_str)
        .filter(|kw| content.contains(&kw.to_lowercase()))
        .collect();

    Ok(if found.len() >= NETWORK_KEYWORD_LIMIT {
        CheckResult::fail(
            kind.name(),
            format!("May require extensive network access (keywords: {})", found.join(", ")),
            kind.severity(),
        )
    } else {
        CheckResult::pass(
            kind.name(),
            "No obvious extensive network usage detected",
            kind.severity(),
        )
    })
}

async fn check_complexity(ctx: &CheckContext<'_>) -> CheckResult {
    let kind = CheckKind::Complexity;
    let thresholds = &ctx.config.thresholds;
    let estimate = ComplexityEstimator::new(&ctx.config.traversal)
        .estimate(ctx.provider, ctx.repo)
        .await;

    if let TraversalOutcome::Unavailable(reason) = &estimate.outcome {
        return CheckResult::fail(
            kind.name(),
            format!("Could not verify complexity: {}", reason),
            kind.severity(),
        );
    }

    let scanned = match estimate.outcome {
        TraversalOutcome::Truncated => " (scan limit reached)",
        _ => "",
    };

    if estimate.meets(thresholds) {
        CheckResult::pass(
            kind.name(),
            format!(
                "Sufficient complexity ({} files, {} directories){}",
                estimate.files, estimate.directories, scanned
            ),
            kind.severity(),
        )
    } else {
        CheckResult::fail(
            kind.name(),
            format!(
                "Too simple: {} files, {} dirs (need {}+ files, {}+ dirs)",
                estimate.files, estimate.directories, thresholds.min_files, thresholds.min_directories
            ),
            kind.severity(),
        )
    }
}

async fn check_size(ctx: &CheckContext<'_>) -> Result<CheckResult> {
    let kind = CheckKind::Size;
    let size_mb = ctx.provider.repository_size_kb(ctx.repo).await? as f64 / 1024.0;
    let max = ctx.config.thresholds.max_size_mb;

    Ok(if size_mb <= f64::from(max) {
        CheckResult::pass(
            kind.name(),
            format!("Reasonable size ({:.1} MB)", size_mb),
            kind.severity(),
        )
    } else {
        CheckResult::fail(
            kind.name(),
            format!("Too large: {:.1} MB (max {} MB)", size_mb, max),
            kind.severity(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{healthy_snapshot, FaultyProvider, Op};

    async fn run_with(provider: &FaultyProvider, kind: CheckKind, effective_stars: u32) -> CheckResult {
        let config = VerifyConfig::default();
        let repo = provider.resolve_repository("acme/widget").await.unwrap();
        let ctx = CheckContext {
            repo: &repo,
            provider,
            config: &config,
            effective_stars,
            now: Utc::now(),
        };
        match kind.run(&ctx).await {
            Ok(result) => result,
            Err(e) => kind.degraded(&e),
        }
    }

    #[test]
    fn test_canonical_order_and_names_are_unique() {
        let names: std::collections::HashSet<_> = CheckKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), CheckKind::ALL.len());
        assert_eq!(CheckKind::ALL[0], CheckKind::GitRepository);
        assert_eq!(CheckKind::ALL[11], CheckKind::Size);
    }

    #[tokio::test]
    async fn test_healthy_snapshot_passes_every_check() {
        let provider = FaultyProvider::new(healthy_snapshot());
        for kind in CheckKind::ALL {
            let result = run_with(&provider, kind, 1200).await;
            assert!(result.passed, "{} failed: {}", result.name, result.message);
            assert_eq!(result.severity, kind.severity());
        }
    }

    #[tokio::test]
    async fn test_missing_license_and_language() {
        let mut snapshot = healthy_snapshot();
        snapshot.repository.license = None;
        snapshot.repository.language = None;
        let provider = FaultyProvider::new(snapshot);

        let license = run_with(&provider, CheckKind::License, 1200).await;
        assert!(!license.passed);
        assert_eq!(license.message, "No license detected");

        let language = run_with(&provider, CheckKind::PrimaryLanguage, 1200).await;
        assert!(!language.passed);
    }

    #[tokio::test]
    async fn test_required_signals_fail_closed() {
        let provider = FaultyProvider::new(healthy_snapshot())
            .failing(Op::Contributors)
            .failing(Op::FileExists)
            .failing(Op::ListTree);

        for kind in [CheckKind::Contributors, CheckKind::BuildFiles, CheckKind::Complexity] {
            let result = run_with(&provider, kind, 1200).await;
            assert!(!result.passed, "{} should fail closed", result.name);
            assert_eq!(result.severity, Severity::Error);
            assert!(result.message.starts_with("Could not verify"));
        }

        let testing = run_with(&provider, CheckKind::Testing, 1200).await;
        assert!(!testing.passed);
        assert_eq!(testing.severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_optional_signals_degrade_permissively() {
        let provider = FaultyProvider::new(healthy_snapshot())
            .failing(Op::Readme)
            .failing(Op::Size)
            .failing(Op::Releases);

        for kind in [CheckKind::NetworkUsage, CheckKind::Size, CheckKind::Authenticity] {
            let result = run_with(&provider, kind, 1200).await;
            assert!(result.passed, "{} should degrade permissively", result.name);
            assert_eq!(result.severity, Severity::Warning);
        }

        let authenticity = run_with(&provider, CheckKind::Authenticity, 1200).await;
        assert_eq!(authenticity.message, "Could not fully verify");
    }

    #[tokio::test]
    async fn test_code_quality_falls_back_to_effective_stars() {
        let mut snapshot = healthy_snapshot();
        snapshot.files.retain(|f| f != "rustfmt.toml");
        let provider = FaultyProvider::new(snapshot);

        let popular = run_with(&provider, CheckKind::CodeQuality, 500).await;
        assert!(popular.passed);
        assert!(popular.message.contains("500 stars"));

        let obscure = run_with(&provider, CheckKind::CodeQuality, 2).await;
        assert!(!obscure.passed);
    }

    #[tokio::test]
    async fn test_network_keywords() {
        let mut snapshot = healthy_snapshot();
        snapshot.readme = Some("Start the SERVER, pick a port and set the host.".to_string());
        let provider = FaultyProvider::new(snapshot);

        let result = run_with(&provider, CheckKind::NetworkUsage, 1200).await;
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);
        assert!(result.message.contains("server, port, host"));
    }

    #[tokio::test]
    async fn test_size_ceiling() {
        let mut snapshot = healthy_snapshot();
        snapshot.repository.size_kb = Some(600 * 1024);
        let provider = FaultyProvider::new(snapshot);

        let result = run_with(&provider, CheckKind::Size, 1200).await;
        assert!(!result.passed);
        assert_eq!(result.message, "Too large: 600.0 MB (max 500 MB)");
    }

    #[tokio::test]
    async fn test_stale_repository_has_no_recent_activity() {
        let mut snapshot = healthy_snapshot();
        snapshot.repository.updated_at = Utc::now() - chrono::Duration::days(200);
        let provider = FaultyProvider::new(snapshot);

        let result = run_with(&provider, CheckKind::RecentActivity, 1200).await;
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.message, "No activity in last 180 days");
    }

    #[tokio::test]
    async fn test_contributor_minimum() {
        let mut snapshot = healthy_snapshot();
        snapshot.contributors = 1;
        let provider = FaultyProvider::new(snapshot);

        let result = run_with(&provider, CheckKind::Contributors, 1200).await;
        assert!(!result.passed);
        assert_eq!(result.message, "Only 1 contributor(s), minimum is 3");
    }
}
