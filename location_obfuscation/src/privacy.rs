use derive_more::Display;
use serde::Serialize;

/// Coarse label for a privacy budget.
///
/// Protection runs *against* the budget: the smaller epsilon is, the more noise is added and
/// the stronger the privacy. [`PrivacyLevel::Low`] is therefore the largest epsilon bucket.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PrivacyLevel {
    #[display("Low Privacy")]
    Low,
    #[display("Medium Privacy")]
    Medium,
    #[display("High Privacy")]
    High,
    #[display("Very High Privacy")]
    VeryHigh,
    #[display("Maximum Privacy")]
    Maximum,
}

impl PrivacyLevel {
    /// Buckets at 5.0, 2.0, 1.0 and 0.5; each threshold belongs to the weaker bucket above it.
    pub fn classify(epsilon: f64) -> Self {
        if epsilon >= 5.0 {
            PrivacyLevel::Low
        } else if epsilon >= 2.0 {
            PrivacyLevel::Medium
        } else if epsilon >= 1.0 {
            PrivacyLevel::High
        } else if epsilon >= 0.5 {
            PrivacyLevel::VeryHigh
        } else {
            PrivacyLevel::Maximum
        }
    }
}

/// See [`PrivacyLevel::classify`]. Lower epsilon always means stricter privacy.
pub fn classify_privacy_level(epsilon: f64) -> PrivacyLevel {
    PrivacyLevel::classify(epsilon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(classify_privacy_level(100.0), PrivacyLevel::Low);
        assert_eq!(classify_privacy_level(5.0), PrivacyLevel::Low);
        assert_eq!(classify_privacy_level(4.99), PrivacyLevel::Medium);
        assert_eq!(classify_privacy_level(2.0), PrivacyLevel::Medium);
        assert_eq!(classify_privacy_level(1.0), PrivacyLevel::High);
        assert_eq!(classify_privacy_level(0.5), PrivacyLevel::VeryHigh);
        assert_eq!(classify_privacy_level(0.49), PrivacyLevel::Maximum);
        assert_eq!(classify_privacy_level(0.1), PrivacyLevel::Maximum);
    }

    #[test]
    fn labels() {
        assert_eq!(PrivacyLevel::Low.to_string(), "Low Privacy");
        assert_eq!(PrivacyLevel::VeryHigh.to_string(), "Very High Privacy");
        assert_eq!(PrivacyLevel::Maximum.to_string(), "Maximum Privacy");
    }

    #[test]
    fn smaller_budget_is_never_weaker() {
        let budgets = [0.1, 0.3, 0.5, 0.9, 1.0, 1.5, 2.0, 3.0, 5.0, 8.0];
        for pair in budgets.windows(2) {
            assert!(classify_privacy_level(pair[0]) >= classify_privacy_level(pair[1]));
        }
    }
}
