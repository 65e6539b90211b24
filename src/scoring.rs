//! Severity-weighted scoring of check results

use crate::types::{CheckResult, QualityBand, Severity};

/// Weight of a required check
pub const ERROR_WEIGHT: u32 = 10;
/// Weight of every other check; fixed at half the required weight
pub const WARNING_WEIGHT: u32 = 5;

/// Lower score bound for each band, checked in order
const BANDS: &[(f64, QualityBand)] = &[
    (90.0, QualityBand::Excellent),
    (70.0, QualityBand::Good),
    (50.0, QualityBand::Fair),
];

impl Severity {
    pub fn weight(self) -> u32 {
        match self {
            Severity::Error => ERROR_WEIGHT,
            Severity::Warning | Severity::Info => WARNING_WEIGHT,
        }
    }
}

/// Score in `[0, 100]`; an empty result set scores 0
pub fn calculate_score(checks: &[CheckResult]) -> f64 {
    let (earned, total) = checks.iter().fold((0u32, 0u32), |(earned, total), check| {
        let weight = check.severity.weight();
        let earned = if check.passed { earned + weight } else { earned };
        (earned, total + weight)
    });

    if total == 0 {
        return 0.0;
    }
    f64::from(earned) * 100.0 / f64::from(total)
}

/// Whether `score` clears `threshold`
pub fn is_passing(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Determine the quality band from a score
pub fn determine_band(score: f64) -> QualityBand {
    BANDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, band)| *band)
        .unwrap_or(QualityBand::Poor)
}
