//! # Service Errors
//!
//! Two layers. [`StoreError`] is what a store collaborator reports;
//! [`ServiceError`] is what a caller of the services sees.
//!
//! A refused lifecycle action is not an error at this level. It comes back
//! as `Ok(TransitionOutcome::NotApplied(..))` so callers can tell "doesn't
//! apply" apart from "access denied".

use thiserror::Error;

use cmms_core::ValidationError;

/// Errors raised by a store or registry collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with this id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Record type, e.g. `"work order"`.
        kind: &'static str,
        /// Display form of the id.
        id: String,
    },

    /// A write was based on a stale read.
    ///
    /// `expected` is what the writer read; `actual` is what the store holds.
    /// For plain saves these are versions, for schedule advancement they
    /// are next-occurrence dates.
    #[error("concurrency conflict on {kind} {id}: expected {expected}, found {actual}")]
    ConcurrencyConflict {
        kind: &'static str,
        id: String,
        expected: String,
        actual: String,
    },
}

/// Errors surfaced by [`WorkOrderService`](crate::WorkOrderService) and
/// [`RecurringScheduler`](crate::RecurringScheduler).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Referenced work order, schedule or asset does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// The tenant guard refused the caller.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Optimistic-concurrency violation at the store. Not retried here.
    #[error("concurrency conflict on {kind} {id}: expected {expected}, found {actual}")]
    ConcurrencyConflict {
        kind: &'static str,
        id: String,
        expected: String,
        actual: String,
    },

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::ConcurrencyConflict {
                kind,
                id,
                expected,
                actual,
            } => Self::ConcurrencyConflict {
                kind,
                id,
                expected,
                actual,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_keep_their_category() {
        let nf = StoreError::NotFound {
            kind: "schedule",
            id: "s1".to_string(),
        };
        assert!(matches!(
            ServiceError::from(nf),
            ServiceError::NotFound { kind: "schedule", .. }
        ));

        let cc = StoreError::ConcurrencyConflict {
            kind: "work order",
            id: "w1".to_string(),
            expected: "3".to_string(),
            actual: "4".to_string(),
        };
        let err = ServiceError::from(cc);
        assert_eq!(
            err.to_string(),
            "concurrency conflict on work order w1: expected 3, found 4"
        );
    }

    #[test]
    fn test_validation_converts() {
        let err: ServiceError = ValidationError::InvalidTenantId(0).into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
