//! # cmms-state — Work Order Lifecycle
//!
//! The pure half of the work-order lifecycle: a closed status enumeration,
//! a single guard table, and the stamping each action performs. No I/O,
//! no access control, no clock; the service layer supplies the actor and
//! the instant, and decides what to do with a refused action.
//!
//! - **Work order** (`work_order.rs`): `Requested → PendingApproval →
//!   Approved`, `Open/Approved → InProgress ⇄ OnHold`, with `Rejected`,
//!   `Completed` and `Cancelled` reachable from any non-terminal state.
//!
//! - **Asset** (`asset.rs`): the asset status a completion may cascade.

pub mod asset;
pub mod work_order;

pub use asset::AssetStatus;
pub use work_order::{
    CompletionReport, EntryPoint, Priority, TransitionError, WorkOrder, WorkOrderAction,
    WorkOrderCommand, WorkOrderDraft, WorkOrderNote, WorkOrderStatus, WorkOrderTransitionRecord,
};
