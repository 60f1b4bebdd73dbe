//! # Scheduler Configuration
//!
//! Read from the environment with fixed defaults. A value that is present
//! but unparseable is logged and ignored rather than failing startup.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`SchedulerConfig::max_occurrences`].
pub const MAX_OCCURRENCES_ENV: &str = "CMMS_MAX_OCCURRENCES";
/// Environment variable overriding [`SchedulerConfig::poll_interval_secs`].
pub const POLL_INTERVAL_ENV: &str = "CMMS_POLL_INTERVAL_SECS";

/// Tuning for the recurring scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Upper bound on occurrences produced by one bulk generation.
    pub max_occurrences: u32,
    /// Seconds between background due passes.
    pub poll_interval_secs: u64,
}

impl SchedulerConfig {
    pub const DEFAULT_MAX_OCCURRENCES: u32 = 52;
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

    /// Defaults overridden by `CMMS_MAX_OCCURRENCES` and
    /// `CMMS_POLL_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_occurrences: parse_positive(&lookup, MAX_OCCURRENCES_ENV)
                .unwrap_or(defaults.max_occurrences),
            poll_interval_secs: parse_positive(&lookup, POLL_INTERVAL_ENV)
                .unwrap_or(defaults.poll_interval_secs),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_occurrences: Self::DEFAULT_MAX_OCCURRENCES,
            poll_interval_secs: Self::DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) if v > T::default() => Some(v),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid scheduler setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = SchedulerConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, SchedulerConfig::default());
        assert_eq!(cfg.max_occurrences, 52);
        assert_eq!(cfg.poll_interval_secs, 300);
    }

    #[test]
    fn test_overrides() {
        let cfg = SchedulerConfig::from_lookup(lookup(&[
            (MAX_OCCURRENCES_ENV, "12"),
            (POLL_INTERVAL_ENV, " 60 "),
        ]));
        assert_eq!(cfg.max_occurrences, 12);
        assert_eq!(cfg.poll_interval_secs, 60);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = SchedulerConfig::from_lookup(lookup(&[
            (MAX_OCCURRENCES_ENV, "lots"),
            (POLL_INTERVAL_ENV, "0"),
        ]));
        assert_eq!(cfg, SchedulerConfig::default());
    }
}
