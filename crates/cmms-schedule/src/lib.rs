//! # cmms-schedule — Recurring Maintenance Scheduling
//!
//! Pure computation over maintenance schedules. No store, no clock, no
//! access control; callers pass `now` and persist what comes back.
//!
//! - **Recurrence** (`recurrence.rs`): label → fixed day count, next date.
//! - **Schedule** (`schedule.rs`): the schedule record and its invariants.
//! - **Generator** (`generator.rs`): bulk pre-generation and single-step
//!   rolling advancement.
//! - **Advisory** (`advisory.rs`): suggested intervals from criticality or
//!   health score.

pub mod advisory;
pub mod generator;
pub mod recurrence;
pub mod schedule;

pub use advisory::{recommended_frequency, recommended_interval_days};
pub use generator::{
    generate_recurring_schedules, plan_advancement, process_due_recurring_schedules, Advancement,
};
pub use recurrence::{
    check_custom_interval, frequency_days, next_date, Frequency, DEFAULT_INTERVAL_DAYS,
    MAX_CUSTOM_INTERVAL_DAYS,
};
pub use schedule::{MaintenanceSchedule, ScheduleDraft, ScheduleStatus};
