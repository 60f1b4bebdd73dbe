//! # cmms-core — Foundational Types for the Maintenance Core
//!
//! Defines the primitives every other crate in the workspace builds on.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `WorkOrderId`, `ScheduleId`,
//!    `AssetId`, `TenantId`, `UserId` are distinct types; the human-facing
//!    `WorkOrderNumber` (`WO-YYYYMM-NNNN`) is validated on construction.
//!
//! 2. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision,
//!    and day arithmetic is fixed-length (86 400 s), never calendar-aware.
//!
//! 3. **Injected time.** Everything that needs "now" reads it through the
//!    `Clock` trait; `ManualClock` makes recurrence math deterministic in tests.
//!
//! 4. **Closed tenant scope.** `TenantContext` is either `SuperAdmin` or
//!    `Scoped { tenant_id }` and owns the access rule.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cmms-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;
pub mod tenant;

pub use error::{CmmsError, ValidationError};
pub use identity::{AssetId, ScheduleId, TenantId, UserId, WorkOrderId, WorkOrderNumber};
pub use temporal::{Clock, ManualClock, SystemClock, Timestamp};
pub use tenant::{CallerIdentity, TenantContext};
