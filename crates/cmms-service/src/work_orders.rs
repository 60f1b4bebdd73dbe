//! # Work Order Service
//!
//! Tenant-checked, persisted lifecycle operations. Every mutating call
//! runs the same steps in the same order:
//!
//! 1. load the work order, `NotFound` if absent;
//! 2. resolve the caller and check write access, `Unauthorized` on denial;
//! 3. check the lifecycle guard, returning
//!    [`TransitionOutcome::NotApplied`] without touching the record;
//! 4. stamp actor and time;
//! 5. save with the version read in step 1, `ConcurrencyConflict` if
//!    another writer got there first.
//!
//! A completion that carries an asset status then writes it to the asset.
//! The order is already saved at that point, so a failed asset write is
//! logged at `warn` and the outcome is still `Applied`.
//!
//! New orders belong to the asset's tenant when the asset has one.
//!
//! Nothing is retried here.

use cmms_core::{CallerIdentity, Clock, TenantId, UserId, WorkOrderId, WorkOrderNumber};
use cmms_state::{
    CompletionReport, EntryPoint, TransitionError, WorkOrder, WorkOrderCommand, WorkOrderDraft,
};

use crate::asset::AssetRegistry;
use crate::error::ServiceError;
use crate::store::{WorkOrderFilter, WorkOrderStore};
use crate::tenant::{ensure_read, ensure_write, owning_tenant, TenantGuard};

const KIND: &str = "work order";

/// Result of a lifecycle call that passed the access check.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The action applied; this is the saved record.
    Applied(WorkOrder),
    /// The lifecycle guard refused the action; nothing was written.
    NotApplied(TransitionError),
}

impl TransitionOutcome {
    /// Whether the action applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The saved record, if the action applied.
    pub fn applied(self) -> Option<WorkOrder> {
        match self {
            Self::Applied(order) => Some(order),
            Self::NotApplied(_) => None,
        }
    }
}

/// Request to raise a new work order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkOrder {
    pub draft: WorkOrderDraft,
    pub entry: EntryPoint,
    /// Owning tenant. A scoped caller may leave this empty (their own
    /// tenant is used) or name their own tenant; a super-admin may pick
    /// any tenant or none.
    pub tenant_id: Option<TenantId>,
}

/// Work-order lifecycle over injected store, asset registry, tenant guard
/// and clock.
#[derive(Debug, Clone)]
pub struct WorkOrderService<S, A, G, C> {
    store: S,
    assets: A,
    guard: G,
    clock: C,
}

impl<S, A, G, C> WorkOrderService<S, A, G, C>
where
    S: WorkOrderStore,
    A: AssetRegistry,
    G: TenantGuard,
    C: Clock,
{
    pub fn new(store: S, assets: A, guard: G, clock: C) -> Self {
        Self {
            store,
            assets,
            guard,
            clock,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─── Create & read ───────────────────────────────────────────────

    /// Raise a work order. Starts in `Requested` or `Open` depending on
    /// the entry point; `last_modified_*` stay empty.
    pub fn create(
        &self,
        caller: &CallerIdentity,
        request: NewWorkOrder,
    ) -> Result<WorkOrder, ServiceError> {
        let ctx = self.guard.resolve(caller)?;
        let asset = self.assets.get_asset(request.draft.asset_id)?;
        ensure_read(&ctx, caller, "asset", asset.id, asset.tenant_id)?;
        let tenant_id = owning_tenant(&ctx, request.tenant_id, asset.tenant_id)?;

        let now = self.clock.now();
        let sequence = self.store.next_work_order_sequence(now.year(), now.month());
        let number = WorkOrderNumber::new(now.year(), now.month(), sequence)?;
        let order = WorkOrder::raise(
            request.draft,
            number,
            tenant_id,
            request.entry,
            caller.user.clone(),
            now,
        );
        let saved = self.store.save_work_order(order)?;
        tracing::info!(
            work_order = %saved.number,
            id = %saved.id,
            status = %saved.status,
            user = %caller.user,
            "work order created"
        );
        Ok(saved)
    }

    /// Load one work order the caller may see.
    pub fn get(&self, caller: &CallerIdentity, id: WorkOrderId) -> Result<WorkOrder, ServiceError> {
        let order = self.store.get_work_order(id)?;
        let ctx = self.guard.resolve(caller)?;
        ensure_read(&ctx, caller, KIND, id, order.tenant_id)?;
        Ok(order)
    }

    /// Work orders in the caller's scope that pass `filter`.
    pub fn list(
        &self,
        caller: &CallerIdentity,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<WorkOrder>, ServiceError> {
        let ctx = self.guard.resolve(caller)?;
        Ok(self.store.list_work_orders(&ctx, filter, self.clock.now()))
    }

    // ─── Lifecycle ───────────────────────────────────────────────────

    /// Apply `command` to work order `id` on behalf of `caller`.
    pub fn transition(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        command: WorkOrderCommand,
    ) -> Result<TransitionOutcome, ServiceError> {
        let mut order = self.store.get_work_order(id)?;
        let ctx = self.guard.resolve(caller)?;
        ensure_write(&ctx, caller, KIND, id, order.tenant_id)?;

        let cascade = match &command {
            WorkOrderCommand::Complete(report) => report.asset_status,
            _ => None,
        };
        if cascade.is_some() {
            let asset = self.assets.get_asset(order.asset_id)?;
            ensure_write(&ctx, caller, "asset", asset.id, asset.tenant_id)?;
        }

        let action = command.action();
        let record = match order.apply(command, &caller.user, self.clock.now()) {
            Ok(record) => record,
            Err(refusal) => {
                tracing::debug!(
                    work_order = %order.number,
                    %action,
                    status = %order.status,
                    reason = %refusal,
                    "transition not applied"
                );
                return Ok(TransitionOutcome::NotApplied(refusal));
            }
        };

        let saved = self.store.save_work_order(order).map_err(|e| {
            tracing::warn!(work_order = %id, %action, error = %e, "work order save failed");
            ServiceError::from(e)
        })?;
        match record {
            Some(r) => tracing::info!(
                work_order = %saved.number,
                %action,
                from = %r.from_state,
                to = %r.to_state,
                user = %caller.user,
                "work order transitioned"
            ),
            None => tracing::info!(
                work_order = %saved.number,
                %action,
                user = %caller.user,
                "work order updated"
            ),
        }

        if let Some(status) = cascade {
            match self.assets.set_status(saved.asset_id, status) {
                Ok(asset) => {
                    tracing::info!(asset = %asset.id, status = %asset.status, "asset status cascaded")
                }
                Err(e) => tracing::warn!(
                    work_order = %saved.number,
                    asset = %saved.asset_id,
                    %status,
                    error = %e,
                    "asset status cascade failed; completion stands"
                ),
            }
        }
        Ok(TransitionOutcome::Applied(saved))
    }

    pub fn submit_for_approval(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::SubmitForApproval)
    }

    pub fn approve(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        notes: Option<String>,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Approve { notes })
    }

    pub fn reject(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        reason: String,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Reject { reason })
    }

    pub fn acknowledge(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Acknowledge)
    }

    pub fn start(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Start)
    }

    pub fn hold(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        note: String,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Hold { note })
    }

    pub fn resume(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        note: Option<String>,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Resume { note })
    }

    /// Complete the order, cascading `report.asset_status` onto the asset
    /// when present.
    pub fn complete(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        report: CompletionReport,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Complete(report))
    }

    pub fn cancel(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        note: Option<String>,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Cancel { note })
    }

    pub fn assign(
        &self,
        caller: &CallerIdentity,
        id: WorkOrderId,
        assignee: UserId,
    ) -> Result<TransitionOutcome, ServiceError> {
        self.transition(caller, id, WorkOrderCommand::Assign { assignee })
    }
}
