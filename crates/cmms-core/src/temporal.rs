//! # Temporal Types — UTC Timestamps and Injectable Clocks
//!
//! Defines `Timestamp`, a UTC-only instant truncated to seconds precision,
//! and the `Clock` abstraction every time-dependent operation reads "now"
//! through.
//!
//! ## Day Arithmetic
//!
//! Recurrence math works in whole days of exactly 86 400 seconds
//! ([`Timestamp::plus_days`]). There is no calendar awareness: adding 30
//! days to January 31st lands on March 2nd, not "the end of February".
//!
//! Day arithmetic is total. Results are clamped to the years 0000 through
//! 9999, so an absurd interval yields `9999-12-31T23:59:59Z` instead of
//! overflowing.
//!
//! ## Clocks
//!
//! - [`SystemClock`] reads the wall clock.
//! - [`ManualClock`] holds a settable instant so schedule generation and
//!   overdue checks are deterministic under test.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CmmsError, ValidationError};

const SECS_PER_DAY: i64 = 86_400;
/// `0000-01-01T00:00:00Z`.
const EARLIEST_EPOCH_SECS: i64 = -62_167_219_200;
/// `9999-12-31T23:59:59Z`.
const LATEST_EPOCH_SECS: i64 = 253_402_300_799;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an RFC 3339 string, rejecting non-UTC offsets.
/// - [`Timestamp::from_date()`] — midnight UTC of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Midnight UTC on the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    /// Midnight UTC on `year-month-day`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDate`] if the triple is not a real date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, CmmsError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_date)
            .ok_or_else(|| ValidationError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")).into())
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// Only the `Z` suffix is accepted. Offsets such as `+00:00` or `+05:30`
    /// are rejected so that stored instants have one spelling.
    pub fn parse(s: &str) -> Result<Self, CmmsError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            ))
            .into());
        }
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ValidationError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Parse either a full RFC 3339 UTC timestamp or a bare `YYYY-MM-DD`
    /// date (interpreted as midnight UTC). Used by operator-facing inputs.
    pub fn parse_date_or_timestamp(s: &str) -> Result<Self, CmmsError> {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        Self::parse(s)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The calendar date (UTC) of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Calendar year (UTC).
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Calendar month (UTC), 1-based.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// This instant shifted by `days` whole days (may be negative),
    /// clamped to the supported range.
    pub fn plus_days(&self, days: i64) -> Self {
        self.plus_secs(days.saturating_mul(SECS_PER_DAY))
    }

    /// This instant shifted by an arbitrary signed duration, clamped to the
    /// supported range. Sub-second parts of `delta` are dropped.
    pub fn plus(&self, delta: Duration) -> Self {
        self.plus_secs(delta.num_seconds())
    }

    fn plus_secs(&self, secs: i64) -> Self {
        let target = self
            .epoch_secs()
            .saturating_add(secs)
            .clamp(EARLIEST_EPOCH_SECS, LATEST_EPOCH_SECS);
        DateTime::from_timestamp(target, 0).map_or(*self, Self)
    }

    /// Signed duration from `earlier` to `self`.
    pub fn since(&self, earlier: &Timestamp) -> Duration {
        self.0.signed_duration_since(earlier.0)
    }

    /// Returns the Unix epoch timestamp in seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Create a timestamp from a Unix epoch timestamp (seconds).
    pub fn from_epoch_secs(secs: i64) -> Result<Self, CmmsError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp(format!("invalid Unix timestamp: {secs}")).into())
    }

    /// Render as ISO8601 with Z suffix (e.g., `2025-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ─── Clock ───────────────────────────────────────────────────────────

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    epoch_secs: AtomicI64,
}

impl ManualClock {
    /// A clock frozen at `at`.
    pub fn new(at: Timestamp) -> Self {
        Self {
            epoch_secs: AtomicI64::new(at.epoch_secs()),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: Timestamp) {
        self.epoch_secs.store(at.epoch_secs(), Ordering::SeqCst);
    }

    /// Move forward by `days` whole days.
    pub fn advance_days(&self, days: i64) {
        self.epoch_secs
            .fetch_add(days.saturating_mul(SECS_PER_DAY), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        // Stored values always originate from a valid Timestamp.
        DateTime::from_timestamp(secs, 0).map_or_else(Timestamp::now, Timestamp)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
