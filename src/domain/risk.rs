use std::fmt;

use serde::{Deserialize, Serialize};

/// Percentage at which a match stops being low risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 40.0;
/// Percentage at which a match becomes high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < MEDIUM_RISK_THRESHOLD {
            RiskBucket::Low
        } else if percentage < HIGH_RISK_THRESHOLD {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low Risk",
            RiskBucket::Medium => "Medium Risk",
            RiskBucket::High => "HIGH RISK ⚠️",
        }
    }

    /// High-risk matches are surfaced as warnings.
    pub fn is_warning(&self) -> bool {
        matches!(self, RiskBucket::High)
    }
}

/// Similarity score expressed as a percentage plus its risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLabel {
    pub percentage: f64,
    pub bucket: RiskBucket,
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // always two decimals: 40.00%, not 40.0%
        write!(f, "{:.2}% ({})", self.percentage, self.bucket.label())
    }
}

/// Maps a similarity score onto a risk label. Never fails; out-of-range
/// scores simply produce out-of-range percentages.
pub fn classify(score: f32) -> RiskLabel {
    let percentage = round_to_hundredths(f64::from(score) * 100.0);
    RiskLabel {
        percentage,
        bucket: RiskBucket::from_percentage(percentage),
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(classify(0.3999).bucket, RiskBucket::Low);
        assert_eq!(classify(0.40).bucket, RiskBucket::Medium);
        assert_eq!(classify(0.7499).bucket, RiskBucket::Medium);
        assert_eq!(classify(0.75).bucket, RiskBucket::High);
    }

    #[test]
    fn test_bucket_from_percentage() {
        assert_eq!(RiskBucket::from_percentage(39.99), RiskBucket::Low);
        assert_eq!(RiskBucket::from_percentage(40.00), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_percentage(74.99), RiskBucket::Medium);
        assert_eq!(RiskBucket::from_percentage(75.00), RiskBucket::High);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(classify(0.534_522_5).percentage, 53.45);
        assert_eq!(classify(1.0).percentage, 100.0);
    }

    #[test]
    fn test_rounding_decides_bucket() {
        // 39.996 rounds up to 40.00
        assert_eq!(classify(0.399_96).bucket, RiskBucket::Medium);
    }

    #[test]
    fn test_out_of_range_scores_do_not_fail() {
        let negative = classify(-0.5);
        assert_eq!(negative.percentage, -50.0);
        assert_eq!(negative.bucket, RiskBucket::Low);
        assert_eq!(classify(1.5).bucket, RiskBucket::High);
    }

    #[test]
    fn test_display() {
        assert_eq!(classify(0.2).to_string(), "20.00% (Low Risk)");
        assert_eq!(classify(0.5).to_string(), "50.00% (Medium Risk)");
        assert_eq!(classify(0.9).to_string(), "90.00% (HIGH RISK ⚠️)");
        assert!(classify(0.9).bucket.is_warning());
        assert!(!classify(0.5).bucket.is_warning());
    }
}
