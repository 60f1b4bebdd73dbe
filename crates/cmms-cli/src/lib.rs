//! # cmms-cli — Operator CLI
//!
//! Provides the `cmms` command-line interface over a JSON snapshot of the
//! in-memory store.
//!
//! ## Subcommands
//!
//! - `cmms frequency` — Interval for a recurrence label, and the next date.
//! - `cmms recommend` — Advisory interval from criticality or health score.
//! - `cmms asset` — Register and list assets.
//! - `cmms schedule` — Create, generate, complete, list and process due schedules.
//! - `cmms work-order` — Create, show, list and transition work orders.
//! - `cmms watch` — Due processing on an interval until Ctrl-C.
//!
//! ```bash
//! cmms --config cmms.yaml --as alice schedule create \
//!     --asset asset:... --title "Filter change" --date 2025-01-01 --frequency Monthly
//! cmms --config cmms.yaml --as alice work-order transition --id wo:... start
//! cmms --config cmms.yaml watch --catch-up
//! ```
//!
//! Exit status is 0 on success, 1 on any error and 2 when a lifecycle
//! action was refused.

pub mod asset;
pub mod config;
pub mod context;
pub mod frequency;
pub mod schedule;
pub mod watch;
pub mod work_order;
