//! # Advisory Recommendations
//!
//! Suggested maintenance intervals from an asset's criticality or health
//! score. Output only; nothing in the core applies these automatically.

use crate::recurrence::Frequency;

/// Suggested interval in days for an asset criticality label.
///
/// `Critical` → 14, `High` → 30, `Medium` → 90, anything else → 180.
/// Matching is case-insensitive.
pub fn recommended_interval_days(criticality: &str) -> u32 {
    match criticality.trim().to_ascii_lowercase().as_str() {
        "critical" => 14,
        "high" => 30,
        "medium" => 90,
        _ => 180,
    }
}

/// Suggested frequency for an asset health score (0–100, higher is healthier).
pub fn recommended_frequency(health_score: f64) -> Frequency {
    if health_score < 40.0 {
        Frequency::Weekly
    } else if health_score < 60.0 {
        Frequency::BiWeekly
    } else if health_score < 80.0 {
        Frequency::Monthly
    } else if health_score < 90.0 {
        Frequency::Quarterly
    } else {
        Frequency::Annually
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_by_criticality() {
        assert_eq!(recommended_interval_days("Critical"), 14);
        assert_eq!(recommended_interval_days("high"), 30);
        assert_eq!(recommended_interval_days("MEDIUM"), 90);
        assert_eq!(recommended_interval_days("Low"), 180);
        assert_eq!(recommended_interval_days(""), 180);
    }

    #[test]
    fn test_frequency_by_health_band_edges() {
        assert_eq!(recommended_frequency(0.0), Frequency::Weekly);
        assert_eq!(recommended_frequency(39.9), Frequency::Weekly);
        assert_eq!(recommended_frequency(40.0), Frequency::BiWeekly);
        assert_eq!(recommended_frequency(60.0), Frequency::Monthly);
        assert_eq!(recommended_frequency(80.0), Frequency::Quarterly);
        assert_eq!(recommended_frequency(90.0), Frequency::Annually);
        assert_eq!(recommended_frequency(100.0), Frequency::Annually);
    }
}
