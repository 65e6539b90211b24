//! Runs every check against one repository snapshot

use crate::checks::{CheckContext, CheckKind};
use crate::error::VerifyError;
use crate::types::CheckResult;
use futures::future::join_all;
use std::time::Instant;
use tokio::time::timeout;
use tracing::debug;

/// Run all checks concurrently and return their results in canonical order.
///
/// Never short-circuits: a failing, erroring or timed-out check only
/// affects its own result.
pub async fn run_checks(ctx: &CheckContext<'_>) -> Vec<CheckResult> {
    let limit = ctx.config.network.check_timeout();

    let runs = CheckKind::ALL.iter().map(|&kind| async move {
        let started = Instant::now();
        let result = match timeout(limit, kind.run(ctx)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => kind.degraded(&e),
            Err(_) => kind.degraded(&VerifyError::Timeout(limit)),
        };
        debug!(
            "Check '{}' finished in {:?}: passed={}",
            result.name,
            started.elapsed(),
            result.passed
        );
        result
    });

    // join_all yields outputs in input order, not completion order
    join_all(runs).await
}
