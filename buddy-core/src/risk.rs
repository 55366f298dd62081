//! Mapping of the overall risk label to a display tier.

use serde::Serialize;

use crate::normalize::PLACEHOLDER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    /// No label to classify.
    Neutral,
    Low,
    Moderate,
    High,
}

impl SeverityTier {
    /// Classify by case-insensitive substring, checking "low" before
    /// "moderate". Anything else non-empty is `High`.
    pub fn classify(overall: Option<&str>) -> Self {
        let Some(overall) = overall.filter(|s| !s.is_empty()) else {
            return SeverityTier::Neutral;
        };

        let lower = overall.to_lowercase();
        if lower.contains("low") {
            SeverityTier::Low
        } else if lower.contains("moderate") {
            SeverityTier::Moderate
        } else {
            SeverityTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityTier::Neutral => PLACEHOLDER,
            SeverityTier::Low => "LOW RISK",
            SeverityTier::Moderate => "MODERATE",
            SeverityTier::High => "HIGH RISK",
        }
    }

    /// Style class for the badge; `None` for the neutral tier.
    pub fn style_class(&self) -> Option<&'static str> {
        match self {
            SeverityTier::Neutral => None,
            SeverityTier::Low => Some("ok"),
            SeverityTier::Moderate => Some("warn"),
            SeverityTier::High => Some("bad"),
        }
    }
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_levels() {
        assert_eq!(SeverityTier::classify(Some("Low risk")), SeverityTier::Low);
        assert_eq!(SeverityTier::classify(Some("Moderate")), SeverityTier::Moderate);
        assert_eq!(SeverityTier::classify(Some("High")), SeverityTier::High);
    }

    #[test]
    fn unknown_wording_is_high() {
        assert_eq!(SeverityTier::classify(Some("Severe")), SeverityTier::High);
        assert_eq!(SeverityTier::classify(Some("Severe")).label(), "HIGH RISK");
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(SeverityTier::classify(Some("VERY LOW")), SeverityTier::Low);
        assert_eq!(SeverityTier::classify(Some("mostly MODERATE today")), SeverityTier::Moderate);
        // "low" is checked first
        assert_eq!(SeverityTier::classify(Some("low to moderate")), SeverityTier::Low);
    }

    #[test]
    fn empty_is_neutral() {
        let tier = SeverityTier::classify(Some(""));
        assert_eq!(tier, SeverityTier::Neutral);
        assert_eq!(tier.label(), "—");
        assert_eq!(tier.style_class(), None);
        assert_eq!(SeverityTier::classify(None), SeverityTier::Neutral);
    }
}
