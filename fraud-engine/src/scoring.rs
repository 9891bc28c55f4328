//! Score aggregation, classification and recommendations

use crate::types::{Decision, RiskLevel};

/// Sum rule contributions and clamp into [0, 1]
pub fn aggregate(contributions: &[f64]) -> f64 {
    contributions.iter().sum::<f64>().clamp(0.0, 1.0)
}

/// Map a score to its risk level
pub fn level_of(score: f64) -> RiskLevel {
    RiskLevel::from_score(score)
}

/// Map a score to a decision.
///
/// Decision thresholds are the risk level bands, so APPROVE, REVIEW and
/// DECLINE line up with Low, Medium and High for every score.
pub fn decide(score: f64) -> Decision {
    Decision::from(level_of(score))
}

/// Advisory strings for a risk level
pub fn recommendations(level: RiskLevel) -> Vec<String> {
    let advice: &[&str] = match level {
        RiskLevel::Low => &["Process transaction normally"],
        RiskLevel::Medium => &[
            "Additional verification recommended",
            "Monitor account for suspicious activity",
        ],
        RiskLevel::High => &[
            "Manual review required",
            "Contact customer for verification",
            "Consider temporary account restrictions",
        ],
    };
    advice.iter().map(|s| s.to_string()).collect()
}
