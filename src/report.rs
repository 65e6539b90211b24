//! Report assembly and rendering

use crate::scoring::{calculate_score, determine_band, is_passing};
use crate::types::{CheckResult, RepositoryMetadata, Severity, VerificationReport};
use chrono::Utc;

/// Assemble the final report.
///
/// `passed` and the summary's closing sentence are both derived from
/// `pass_threshold`, so they cannot disagree.
pub fn build_report(
    repository: RepositoryMetadata,
    checks: Vec<CheckResult>,
    effective_stars: u32,
    pass_threshold: f64,
) -> VerificationReport {
    let score = calculate_score(&checks);
    let passed = is_passing(score, pass_threshold);
    let summary = generate_summary(&checks, score, passed);

    VerificationReport {
        repository,
        checks,
        score,
        passed,
        summary,
        timestamp: Utc::now(),
        effective_stars,
        band: determine_band(score),
    }
}

/// One-paragraph natural-language summary
pub fn generate_summary(checks: &[CheckResult], score: f64, passed: bool) -> String {
    let failed_required = count_failed(checks, Severity::Error);
    let failed_optional = count_failed(checks, Severity::Warning);

    let mut summary = format!("{} quality (Score: {:.1}/100). ", determine_band(score), score);
    if failed_required > 0 {
        summary.push_str(&format!("Failed {} critical requirement(s). ", failed_required));
    }
    if failed_optional > 0 {
        summary.push_str(&format!("{} warning(s). ", failed_optional));
    }
    summary.push_str(if passed {
        "Repository meets minimum requirements."
    } else {
        "Repository does not meet minimum requirements."
    });
    summary
}

fn count_failed(checks: &[CheckResult], severity: Severity) -> usize {
    checks
        .iter()
        .filter(|c| !c.passed && c.severity == severity)
        .count()
}

/// Render a report as Markdown
pub fn render_markdown(report: &VerificationReport) -> String {
    let repo = &report.repository;
    let mut md = String::new();

    md.push_str(&format!("# Verification Report: {}\n\n", repo.full_name));
    md.push_str(&format!("**Generated:** {}\n\n", report.timestamp));

    md.push_str("## Repository\n\n");
    md.push_str(&format!("- URL: {}\n", repo.url));
    md.push_str(&format!("- Stars: {}", repo.stars));
    if report.effective_stars != repo.stars {
        md.push_str(&format!(" (evaluated as {})", report.effective_stars));
    }
    md.push('\n');
    md.push_str(&format!(
        "- Language: {}\n",
        repo.language.as_deref().unwrap_or("Unknown")
    ));
    md.push_str(&format!(
        "- License: {}\n\n",
        repo.license.as_deref().unwrap_or("None")
    ));

    md.push_str("## Result\n\n");
    md.push_str(&format!(
        "**{}** with a score of {:.1}/100 ({})\n\n",
        if report.passed { "PASSED" } else { "FAILED" },
        report.score,
        report.band
    ));
    md.push_str(&format!("{}\n\n", report.summary));

    md.push_str("## Checks\n\n");
    md.push_str("| Check | Severity | Result | Details |\n");
    md.push_str("|-------|----------|--------|---------|\n");
    for check in &report.checks {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            check.name,
            check.severity,
            if check.passed { "pass" } else { "fail" },
            check.message.replace('|', "\\|")
        ));
    }

    md
}
