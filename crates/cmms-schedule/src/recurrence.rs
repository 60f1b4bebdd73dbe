//! # Recurrence Calculator
//!
//! Maps a frequency label to a fixed number of days and computes the next
//! occurrence from a base date.
//!
//! | Label | Days |
//! |---|---|
//! | Daily | 1 |
//! | Weekly | 7 |
//! | BiWeekly | 14 |
//! | Monthly | 30 |
//! | Quarterly | 90 |
//! | SemiAnnual | 180 |
//! | Annually | 365 |
//! | Custom | custom interval, else 30 |
//! | anything else | 30 |
//!
//! This is a lookup, not a calendar rule. A "month" is always 30 days and
//! a "year" 365, so occurrences drift against the calendar over time.
//! Unknown labels never fail; they fall back to the monthly step. That
//! fallback is a defined policy for tolerating malformed stored data.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cmms_core::{Timestamp, ValidationError};

/// Step used for `Custom` without an interval and for unrecognized labels.
pub const DEFAULT_INTERVAL_DAYS: i64 = 30;

/// Largest custom interval a new schedule may carry (one hundred years).
pub const MAX_CUSTOM_INTERVAL_DAYS: u32 = 36_500;

/// Refuse a custom interval above [`MAX_CUSTOM_INTERVAL_DAYS`].
///
/// Only schedule creation checks this. Stored intervals of any size still
/// compute, because date arithmetic clamps at year 9999.
pub fn check_custom_interval(custom_days: Option<u32>) -> Result<(), ValidationError> {
    match custom_days {
        Some(days) if days > MAX_CUSTOM_INTERVAL_DAYS => Err(ValidationError::IntervalOutOfRange {
            days,
            max: MAX_CUSTOM_INTERVAL_DAYS,
        }),
        _ => Ok(()),
    }
}

/// A recurrence label.
///
/// Labels that match none of the named patterns are preserved verbatim in
/// [`Frequency::Unrecognized`] so they round-trip through storage unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annually,
    Custom,
    Unrecognized(String),
}

impl Frequency {
    /// The named patterns, in ascending interval order.
    pub const NAMED: [Frequency; 8] = [
        Self::Daily,
        Self::Weekly,
        Self::BiWeekly,
        Self::Monthly,
        Self::Quarterly,
        Self::SemiAnnual,
        Self::Annually,
        Self::Custom,
    ];

    /// Parse a stored label. Empty or whitespace-only labels mean "one-off"
    /// and yield `None`; matching is case-insensitive.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }
        let found = Self::NAMED
            .iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(trimmed))
            .cloned();
        Some(found.unwrap_or_else(|| Self::Unrecognized(trimmed.to_string())))
    }

    /// Canonical label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::BiWeekly => "BiWeekly",
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::SemiAnnual => "SemiAnnual",
            Self::Annually => "Annually",
            Self::Custom => "Custom",
            Self::Unrecognized(label) => label,
        }
    }

    /// Whether the label fell back to the default step.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Interval in days. `custom_days` is consulted only for `Custom`; a
    /// missing or zero interval falls back to [`DEFAULT_INTERVAL_DAYS`].
    pub fn days(&self, custom_days: Option<u32>) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::BiWeekly => 14,
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::SemiAnnual => 180,
            Self::Annually => 365,
            Self::Custom => match custom_days {
                Some(d) if d > 0 => i64::from(d),
                _ => DEFAULT_INTERVAL_DAYS,
            },
            Self::Unrecognized(_) => DEFAULT_INTERVAL_DAYS,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval in days for a raw label. Total: empty and unknown labels
/// return [`DEFAULT_INTERVAL_DAYS`].
pub fn frequency_days(label: &str, custom_days: Option<u32>) -> i64 {
    Frequency::parse(label).map_or(DEFAULT_INTERVAL_DAYS, |f| f.days(custom_days))
}

/// `base` plus [`frequency_days`] days.
pub fn next_date(base: Timestamp, label: &str, custom_days: Option<u32>) -> Timestamp {
    base.plus_days(frequency_days(label, custom_days))
}

/// Serde adapter storing `Option<Frequency>` as a plain label, `""` for a
/// one-off schedule.
pub mod label {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Frequency>, s: S) -> Result<S::Ok, S::Error> {
        value.as_ref().map_or("", Frequency::as_str).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Frequency>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw.as_deref().and_then(Frequency::parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_labels() {
        let expected = [
            ("Daily", 1),
            ("Weekly", 7),
            ("BiWeekly", 14),
            ("Monthly", 30),
            ("Quarterly", 90),
            ("SemiAnnual", 180),
            ("Annually", 365),
        ];
        for (label, days) in expected {
            assert_eq!(frequency_days(label, None), days, "{label}");
        }
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        assert_eq!(frequency_days("weekly", None), 7);
        assert_eq!(frequency_days("  QUARTERLY ", None), 90);
    }

    #[test]
    fn test_custom_interval() {
        assert_eq!(frequency_days("Custom", Some(45)), 45);
        assert_eq!(frequency_days("Custom", None), 30);
        assert_eq!(frequency_days("Custom", Some(0)), 30);
    }

    #[test]
    fn test_huge_custom_interval_clamps_instead_of_overflowing() {
        let base = Timestamp::from_ymd(2025, 1, 1).unwrap();
        assert_eq!(
            next_date(base, "Custom", Some(u32::MAX)).to_iso8601(),
            "9999-12-31T23:59:59Z"
        );
        assert!(check_custom_interval(Some(u32::MAX)).is_err());
        assert!(check_custom_interval(Some(MAX_CUSTOM_INTERVAL_DAYS)).is_ok());
        assert!(check_custom_interval(None).is_ok());
    }

    #[test]
    fn test_custom_days_ignored_for_named_labels() {
        assert_eq!(frequency_days("Weekly", Some(45)), 7);
    }

    #[test]
    fn test_unknown_and_empty_labels_fall_back_to_monthly() {
        assert_eq!(frequency_days("Fortnightly", None), 30);
        assert_eq!(frequency_days("", None), 30);
        assert_eq!(frequency_days("Bi-Weekly", Some(3)), 30);
    }

    #[test]
    fn test_parse_distinguishes_one_off_from_unknown() {
        assert_eq!(Frequency::parse(""), None);
        assert_eq!(Frequency::parse("   "), None);
        let odd = Frequency::parse("Hourly").unwrap();
        assert!(!odd.is_recognized());
        assert_eq!(odd.as_str(), "Hourly");
    }

    #[test]
    fn test_next_date_custom_45() {
        let base = Timestamp::from_ymd(2025, 6, 1).unwrap();
        let next = next_date(base, "Custom", Some(45));
        assert_eq!(next, Timestamp::from_ymd(2025, 7, 16).unwrap());
    }

    #[test]
    fn test_next_date_monthly_is_thirty_days() {
        let base = Timestamp::from_ymd(2025, 1, 31).unwrap();
        assert_eq!(
            next_date(base, "Monthly", None),
            Timestamp::from_ymd(2025, 3, 2).unwrap()
        );
    }

    #[derive(Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "label", default)]
        frequency: Option<Frequency>,
    }

    #[test]
    fn test_label_adapter() {
        let h: Holder = serde_json::from_str(r#"{"frequency":""}"#).unwrap();
        assert_eq!(h.frequency, None);
        let h: Holder = serde_json::from_str(r#"{"frequency":null}"#).unwrap();
        assert_eq!(h.frequency, None);
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.frequency, None);
        let h: Holder = serde_json::from_str(r#"{"frequency":"monthly"}"#).unwrap();
        assert_eq!(h.frequency, Some(Frequency::Monthly));
        assert_eq!(
            serde_json::to_string(&Holder { frequency: None }).unwrap(),
            r#"{"frequency":""}"#
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Total function: any string yields a positive interval, and
        /// strings outside the named set yield exactly the default.
        #[test]
        fn frequency_days_is_total(label in ".{0,24}", custom in proptest::option::of(0u32..1000)) {
            let days = frequency_days(&label, custom);
            prop_assert!(days > 0);
            let named = Frequency::NAMED
                .iter()
                .any(|f| f.as_str().eq_ignore_ascii_case(label.trim()));
            if !named {
                prop_assert_eq!(days, DEFAULT_INTERVAL_DAYS);
            }
        }
    }
}
