//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier the maintenance core handles.
//! You cannot pass an `AssetId` where a `ScheduleId` is expected, and a
//! work order's human-facing label ([`WorkOrderNumber`]) is a different
//! type from its surrogate identity ([`WorkOrderId`]).

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Surrogate identity of a work order. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderId(pub Uuid);

/// Surrogate identity of a maintenance schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub Uuid);

/// Identity of an asset in the external asset registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub Uuid);

macro_rules! uuid_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl FromStr for $ty {
            type Err = uuid::Error;

            /// Accepts either the bare UUID or the prefixed display form.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                Uuid::parse_str(raw).map(Self)
            }
        }
    };
}

uuid_id!(WorkOrderId, "wo");
uuid_id!(ScheduleId, "schedule");
uuid_id!(AssetId, "asset");

/// A tenant partition. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TenantId(i64);

impl TenantId {
    /// Validate and wrap a raw tenant number.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if raw <= 0 {
            return Err(ValidationError::InvalidTenantId(raw));
        }
        Ok(Self(raw))
    }

    /// The raw tenant number.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TenantId {
    type Error = ValidationError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<TenantId> for i64 {
    fn from(id: TenantId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tenant:{}", self.0)
    }
}

/// Login name of a user acting on the system (requester, approver, technician).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a non-empty, trimmed user name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField { field: "user" });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The user name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── Work Order Number ───────────────────────────────────────────────

/// Human-facing work-order label, `WO-{year:0000}{month:00}-{sequence:0000}`.
///
/// The sequence restarts every calendar month. This is a display label;
/// uniqueness is only as strong as the sequence allocator behind it, and
/// [`WorkOrderId`] stays the real identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkOrderNumber {
    year: i32,
    month: u32,
    sequence: u32,
}

impl WorkOrderNumber {
    /// Build a label from its parts.
    pub fn new(year: i32, month: u32, sequence: u32) -> Result<Self, ValidationError> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) || sequence == 0 {
            return Err(ValidationError::InvalidWorkOrderNumber(format!(
                "WO-{year:04}{month:02}-{sequence:04}"
            )));
        }
        Ok(Self { year, month, sequence })
    }

    /// Calendar year the order was raised in.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month the order was raised in.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Position within the month, starting at 1.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl std::fmt::Display for WorkOrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WO-{:04}{:02}-{:04}", self.year, self.month, self.sequence)
    }
}

impl FromStr for WorkOrderNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidWorkOrderNumber(s.to_string());
        let rest = s.strip_prefix("WO-").ok_or_else(invalid)?;
        let (period, seq) = rest.split_once('-').ok_or_else(invalid)?;
        if period.len() != 6 || seq.len() < 4 || !period.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !seq.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = period[..4].parse().map_err(|_| invalid())?;
        let month: u32 = period[4..].parse().map_err(|_| invalid())?;
        let sequence: u32 = seq.parse().map_err(|_| invalid())?;
        Self::new(year, month, sequence).map_err(|_| invalid())
    }
}

impl TryFrom<String> for WorkOrderNumber {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<WorkOrderNumber> for String {
    fn from(n: WorkOrderNumber) -> Self {
        n.to_string()
    }
}
