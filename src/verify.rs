//! Verification entry points

use crate::checks::CheckContext;
use crate::config::VerifyConfig;
use crate::error::Result;
use crate::pipeline::run_checks;
use crate::provider::RepositoryProvider;
use crate::report::build_report;
use crate::types::{RepositoryMetadata, VerificationReport};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Verify a repository and produce a graded report.
///
/// Only a resolution failure (repository not found or inaccessible) is
/// returned as an error; every other provider failure is absorbed into the
/// affected check's result.
///
/// `config` is expected to have passed [`VerifyConfig::validate`], which
/// [`VerifyConfig::from_file`] and the CLI already do.
pub async fn verify(
    identifier: &str,
    provider: &dyn RepositoryProvider,
    config: &VerifyConfig,
) -> Result<VerificationReport> {
    info!("Starting verification of {}", identifier);

    let repo = provider.resolve_repository(identifier).await?;
    let effective_stars = effective_stars(provider, &repo).await;

    let ctx = CheckContext {
        repo: &repo,
        provider,
        config,
        effective_stars,
        now: Utc::now(),
    };
    let checks = run_checks(&ctx).await;

    let report = build_report(
        repo,
        checks,
        effective_stars,
        config.thresholds.pass_threshold,
    );

    info!(
        "Verification of {} complete: score {:.1}, passed={}, {} failed required, {} warnings",
        report.repository.full_name,
        report.score,
        report.passed,
        report.failed_checks().len(),
        report.warnings().len(),
    );

    Ok(report)
}

/// Verify several repositories in sequence, keeping one result per input
pub async fn verify_many(
    identifiers: &[String],
    provider: &dyn RepositoryProvider,
    config: &VerifyConfig,
) -> Vec<(String, Result<VerificationReport>)> {
    let mut results = Vec::with_capacity(identifiers.len());

    for identifier in identifiers {
        let result = verify(identifier, provider, config).await;
        if let Err(e) = &result {
            warn!("Failed to verify {}: {}", identifier, e);
        }
        results.push((identifier.clone(), result));
    }

    results
}

/// Star count used for evaluation: a fork is judged by its upstream's
/// popularity when that can be resolved, otherwise by its own.
pub async fn effective_stars(provider: &dyn RepositoryProvider, repo: &RepositoryMetadata) -> u32 {
    if !repo.fork {
        return repo.stars;
    }

    match provider.parent_star_count(repo).await {
        Ok(Some(stars)) => {
            debug!(
                "{} is a fork, using parent's {} stars instead of {}",
                repo.full_name, stars, repo.stars
            );
            stars
        }
        Ok(None) => repo.stars,
        Err(e) => {
            warn!("Could not resolve parent of {}: {}", repo.full_name, e);
            repo.stars
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VerifyError;
    use crate::provider::testing::{healthy_snapshot, FaultyProvider, Op};

    #[tokio::test]
    async fn test_all_checks_pass() {
        let provider = FaultyProvider::new(healthy_snapshot());
        let report = verify("acme/widget", &provider, &VerifyConfig::default())
            .await
            .unwrap();

        assert_eq!(report.score, 100.0);
        assert!(report.passed);
        assert!(report.failed_checks().is_empty());
        assert!(report.warnings().is_empty());
        assert_eq!(report.checks.len(), 12);
    }

    #[tokio::test]
    async fn test_unknown_repository_is_an_error() {
        let provider = FaultyProvider::new(healthy_snapshot());
        let err = verify("acme/nothing", &provider, &VerifyConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_resolution_failures_are_errors() {
        let provider = [
            Op::ParentStars,
            Op::Contributors,
            Op::Activity,
            Op::FileExists,
            Op::ListTree,
            Op::Readme,
            Op::Commits,
            Op::Releases,
            Op::Size,
        ]
        .into_iter()
        .fold(FaultyProvider::new(healthy_snapshot()), |p, op| p.failing(op));

        let report = verify("acme/widget", &provider, &VerifyConfig::default())
            .await
            .unwrap();
        assert_eq!(report.checks.len(), 12);
        assert!(!report.passed);
    }

    #[tokio::test]
    async fn test_effective_stars_for_forks() {
        let mut snapshot = healthy_snapshot();
        snapshot.repository.stars = 2;
        snapshot.repository.fork = true;
        snapshot.parent_stars = Some(500);
        let repo = snapshot.repository.clone();

        let provider = FaultyProvider::new(snapshot.clone());
        assert_eq!(effective_stars(&provider, &repo).await, 500);

        let unresolvable = FaultyProvider::new(snapshot.clone()).failing(Op::ParentStars);
        assert_eq!(effective_stars(&unresolvable, &repo).await, 2);

        snapshot.parent_stars = None;
        assert_eq!(effective_stars(&FaultyProvider::new(snapshot), &repo).await, 2);
    }

    #[tokio::test]
    async fn test_verify_many_keeps_input_order() {
        let provider = FaultyProvider::new(healthy_snapshot());
        let ids = vec!["acme/widget".to_string(), "acme/missing".to_string()];
        let results = verify_many(&ids, &provider, &VerifyConfig::default()).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "acme/widget");
        assert!(results[0].1.is_ok());
        assert!(results[1].1.is_err());
    }
}
