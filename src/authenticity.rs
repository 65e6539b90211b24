//! Red-flag heuristic separating maintained projects from hastily assembled ones
//!
//! No single signal is trusted on its own. Each rule below may append one
//! named flag, and the number of flags is mapped to a verdict through
//! [`VERDICTS`].

use crate::config::AuthenticityRules;
use crate::error::Result;
use crate::provider::RepositoryProvider;
use crate::types::{CheckResult, RepositoryMetadata, Severity};
use chrono::{DateTime, Utc};
use tracing::debug;

pub const CHECK_NAME: &str = "Quality Project";

/// A single low-maturity signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedFlag {
    CommitBurst,
    ThinDescription,
    NoReleases,
    MinimalReadme,
    NoReadme,
    StaleAndUnpopular,
}

impl std::fmt::Display for RedFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommitBurst => write!(f, "All commits clustered in under 7 days"),
            Self::ThinDescription => write!(f, "No proper description"),
            Self::NoReleases => write!(f, "No releases"),
            Self::MinimalReadme => write!(f, "Minimal README"),
            Self::NoReadme => write!(f, "No README"),
            Self::StaleAndUnpopular => write!(f, "Old project with few stars"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    HastilyAssembled,
    SomeConcerns,
    WellMaintained,
}

/// Minimum flag count for each verdict, checked in order
const VERDICTS: &[(usize, Verdict)] = &[
    (3, Verdict::HastilyAssembled),
    (1, Verdict::SomeConcerns),
    (0, Verdict::WellMaintained),
];

fn verdict_for(flag_count: usize) -> Verdict {
    VERDICTS
        .iter()
        .find(|(min, _)| flag_count >= *min)
        .map(|(_, verdict)| *verdict)
        .unwrap_or(Verdict::WellMaintained)
}

/// Collect red flags for `repo`.
///
/// README failures are themselves a signal and never bubble up; failures
/// while sampling commits or counting releases do, so the caller can
/// degrade the whole check.
pub async fn collect_flags(
    provider: &dyn RepositoryProvider,
    repo: &RepositoryMetadata,
    effective_stars: u32,
    rules: &AuthenticityRules,
    now: DateTime<Utc>,
) -> Result<Vec<RedFlag>> {
    let mut flags = Vec::new();
    let age_days = repo.age_days(now);

    if age_days < rules.burst_max_age_days {
        let commits = provider
            .recent_commits(repo, rules.commit_sample_size)
            .await?;
        if commits.len() >= rules.burst_min_commits {
            let newest = commits.iter().map(|c| c.timestamp).max();
            let oldest = commits.iter().map(|c| c.timestamp).min();
            if let (Some(newest), Some(oldest)) = (newest, oldest) {
                if newest.signed_duration_since(oldest).num_days() < rules.burst_span_days {
                    flags.push(RedFlag::CommitBurst);
                }
            }
        }
    }

    let description_len = repo
        .description
        .as_deref()
        .map(|d| d.trim().chars().count())
        .unwrap_or(0);
    if description_len < rules.min_description_len {
        flags.push(RedFlag::ThinDescription);
    }

    if provider.release_count(repo).await? == 0 && effective_stars < rules.release_star_exemption {
        flags.push(RedFlag::NoReleases);
    }

    match provider.fetch_readme(repo).await {
        Ok(Some(readme)) if readme.size_bytes < rules.min_readme_bytes => {
            flags.push(RedFlag::MinimalReadme)
        }
        Ok(Some(_)) => {}
        Ok(None) | Err(_) => flags.push(RedFlag::NoReadme),
    }

    if age_days > rules.stale_age_days && effective_stars < rules.stale_min_stars {
        flags.push(RedFlag::StaleAndUnpopular);
    }

    debug!("Red flags for {}: {:?}", repo.full_name, flags);
    Ok(flags)
}

/// Turn a flag list into the check result
pub fn judge(flags: &[RedFlag]) -> CheckResult {
    let listed = flags
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    match verdict_for(flags.len()) {
        Verdict::HastilyAssembled => CheckResult::fail(
            CHECK_NAME,
            format!("Appears hastily assembled: {}", listed),
            Severity::Error,
        ),
        Verdict::SomeConcerns => CheckResult::pass(
            CHECK_NAME,
            format!("Some concerns: {}", listed),
            Severity::Warning,
        ),
        Verdict::WellMaintained => {
            CheckResult::pass(CHECK_NAME, "Appears well-maintained", Severity::Warning)
        }
    }
}

/// Run the heuristic end to end
pub async fn evaluate(
    provider: &dyn RepositoryProvider,
    repo: &RepositoryMetadata,
    effective_stars: u32,
    rules: &AuthenticityRules,
    now: DateTime<Utc>,
) -> Result<CheckResult> {
    let flags = collect_flags(provider, repo, effective_stars, rules, now).await?;
    Ok(judge(&flags))
}
