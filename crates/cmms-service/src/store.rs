//! # Store Contracts
//!
//! The persistence collaborators the services consume. Implementations
//! decide the technology; the contracts fix the concurrency guarantees:
//!
//! - Every save is an optimistic-concurrency check. The record's `version`
//!   must equal the stored version (or be `0` for a record not yet
//!   stored); a mismatch is [`StoreError::ConcurrencyConflict`]. On success
//!   the stored version is bumped and the saved record is returned.
//! - [`ScheduleStore::save_schedules`] is all-or-nothing.
//! - [`ScheduleStore::commit_advancement`] is a compare-and-swap on the
//!   source's next date, committed together with the insert of the new
//!   occurrence. Two concurrent due passes cannot both win.
//! - [`WorkOrderStore::next_work_order_sequence`] hands out each sequence
//!   number once per month.

use serde::{Deserialize, Serialize};

use cmms_core::{AssetId, ScheduleId, TenantContext, Timestamp, WorkOrderId};
use cmms_schedule::MaintenanceSchedule;
use cmms_state::{WorkOrder, WorkOrderStatus};

use crate::error::StoreError;

/// Optional narrowing of a work-order listing. Tenant scope is applied
/// separately from the caller's context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderFilter {
    #[serde(default)]
    pub status: Option<WorkOrderStatus>,
    #[serde(default)]
    pub asset_id: Option<AssetId>,
    /// Only orders past their due date and not terminal.
    #[serde(default)]
    pub overdue: bool,
}

impl WorkOrderFilter {
    /// Whether `order` passes this filter at instant `now`.
    pub fn matches(&self, order: &WorkOrder, now: Timestamp) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.asset_id.map_or(true, |a| order.asset_id == a)
            && (!self.overdue || order.is_overdue(now))
    }
}

/// Work-order persistence.
pub trait WorkOrderStore: Send + Sync {
    /// Load one work order.
    fn get_work_order(&self, id: WorkOrderId) -> Result<WorkOrder, StoreError>;

    /// Insert or update, with the version check described at module level.
    fn save_work_order(&self, order: WorkOrder) -> Result<WorkOrder, StoreError>;

    /// Orders visible in `scope` that pass `filter`, oldest request first.
    fn list_work_orders(
        &self,
        scope: &TenantContext,
        filter: &WorkOrderFilter,
        now: Timestamp,
    ) -> Vec<WorkOrder>;

    /// Next label sequence for a calendar month, starting at 1.
    fn next_work_order_sequence(&self, year: i32, month: u32) -> u32;
}

/// Maintenance-schedule persistence.
pub trait ScheduleStore: Send + Sync {
    /// Load one schedule.
    fn get_schedule(&self, id: ScheduleId) -> Result<MaintenanceSchedule, StoreError>;

    /// Insert or update a batch atomically.
    fn save_schedules(
        &self,
        schedules: Vec<MaintenanceSchedule>,
    ) -> Result<Vec<MaintenanceSchedule>, StoreError>;

    /// Schedules visible in `scope`, earliest scheduled date first.
    fn list_schedules(&self, scope: &TenantContext) -> Vec<MaintenanceSchedule>;

    /// Completed recurring schedules whose next date is at or before `now`,
    /// earliest first. Not tenant-filtered; this feeds the background pass.
    fn list_due_recurring_schedules(&self, now: Timestamp) -> Vec<MaintenanceSchedule>;

    /// Set the source's next date to `advanced_next` if it still equals
    /// `expected_next`, and insert `occurrence`, as one unit.
    fn commit_advancement(
        &self,
        source_id: ScheduleId,
        expected_next: Timestamp,
        occurrence: MaintenanceSchedule,
        advanced_next: Timestamp,
    ) -> Result<MaintenanceSchedule, StoreError>;
}
