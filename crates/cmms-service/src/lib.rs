//! # cmms-service — Tenant-Checked Work Orders and Scheduling
//!
//! Wires the pure lifecycle (`cmms-state`) and scheduling (`cmms-schedule`)
//! crates to their collaborators. Every collaborator is injected:
//!
//! | Collaborator | Trait | In-memory implementation |
//! |---|---|---|
//! | Work-order persistence | [`WorkOrderStore`] | [`InMemoryStore`] |
//! | Schedule persistence | [`ScheduleStore`] | [`InMemoryStore`] |
//! | Asset lookups and cascade | [`AssetRegistry`] | [`InMemoryStore`] |
//! | Caller → tenant scope | [`TenantGuard`] | [`DirectoryTenantGuard`] |
//! | Current instant | [`cmms_core::Clock`] | `SystemClock`, `ManualClock` |
//!
//! ## Error Split
//!
//! `NotFound`, `Unauthorized`, `ConcurrencyConflict` and `Validation` are
//! [`ServiceError`]s. A lifecycle action the guard table refuses is a
//! normal outcome, [`TransitionOutcome::NotApplied`].
//!
//! ## Logging
//!
//! `tracing` events only; the binary installs the subscriber. Applied
//! transitions and generated occurrences log at `info`, denials and
//! conflicts at `warn`, refused actions and unrecognized frequencies at
//! `debug`.

pub mod asset;
pub mod config;
pub mod error;
pub mod memory;
pub mod scheduler;
pub mod store;
pub mod tenant;
pub mod work_orders;

pub use asset::{AssetRecord, AssetRegistry};
pub use config::SchedulerConfig;
pub use error::{ServiceError, StoreError};
pub use memory::{InMemoryStore, StoreSnapshot};
pub use scheduler::{DueRunReport, RecurringScheduler, ScheduleCompletion};
pub use store::{ScheduleStore, WorkOrderFilter, WorkOrderStore};
pub use tenant::{ensure_read, ensure_write, owning_tenant, DirectoryTenantGuard, TenantGuard};
pub use work_orders::{NewWorkOrder, TransitionOutcome, WorkOrderService};
