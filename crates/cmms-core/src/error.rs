//! # Error Hierarchy
//!
//! Structured error types for value-type construction, built with
//! `thiserror`. Lifecycle and store errors live next to the code that
//! raises them (`cmms-state`, `cmms-service`) and carry their own context.

use thiserror::Error;

/// Top-level error type for the foundational types.
#[derive(Error, Debug)]
pub enum CmmsError {
    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for domain primitives.
///
/// Each variant carries the offending input so operators can see what was
/// rejected without re-running with extra logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Work-order label does not match `WO-YYYYMM-NNNN`.
    #[error("invalid work order number: \"{0}\" (expected WO-YYYYMM-NNNN)")]
    InvalidWorkOrderNumber(String),

    /// Timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Calendar date does not exist.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A required text field was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the field.
        field: &'static str,
    },

    /// A custom recurrence interval beyond the accepted maximum.
    #[error("custom interval of {days} days exceeds the maximum of {max}")]
    IntervalOutOfRange {
        /// The rejected interval.
        days: u32,
        /// Largest accepted interval.
        max: u32,
    },

    /// Tenant identifiers are strictly positive.
    #[error("invalid tenant id: {0}")]
    InvalidTenantId(i64),
}
