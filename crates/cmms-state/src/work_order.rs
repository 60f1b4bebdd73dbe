//! # Work Order Lifecycle State Machine
//!
//! Governs a work order's status from request through completion or
//! cancellation.
//!
//! ## States
//!
//! ```text
//! Requested ──▶ PendingApproval ──▶ Approved
//!     │                                │
//!     │   (any non-terminal) ──▶ Rejected, Cancelled, Completed
//!     │                                │
//!     └──── Start ──▶ InProgress ◀──▶ OnHold
//!                         │
//!                         └──▶ Completed (terminal)
//! Open ──▶ InProgress
//! ```
//!
//! `Completed` and `Cancelled` are terminal: no status-changing action is
//! applied to them. `Assign` never changes status and is accepted in every
//! state.
//!
//! ## Dispatch
//!
//! Every action is checked against one guard table
//! ([`WorkOrderAction::permits`]) before any field is touched. A rejected
//! action leaves the record byte-for-byte unchanged and yields a
//! [`TransitionError`], which callers treat as "does not apply", not as a
//! fault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cmms_core::{AssetId, TenantId, Timestamp, UserId, WorkOrderId, WorkOrderNumber};

use crate::asset::AssetStatus;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkOrderStatus {
    /// Raised through the request workflow, not yet triaged.
    Requested,
    /// Submitted and waiting for an approver.
    PendingApproval,
    /// Approved, not yet started.
    Approved,
    /// Turned down by an approver.
    Rejected,
    /// Raised directly as ready-to-work.
    Open,
    /// Work under way.
    InProgress,
    /// Work paused.
    OnHold,
    /// Work finished (terminal).
    Completed,
    /// Withdrawn (terminal).
    Cancelled,
}

impl WorkOrderStatus {
    /// Every status, in declaration order.
    pub const ALL: [WorkOrderStatus; 9] = [
        Self::Requested,
        Self::PendingApproval,
        Self::Approved,
        Self::Rejected,
        Self::Open,
        Self::InProgress,
        Self::OnHold,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "REQUESTED",
            Self::PendingApproval => "PENDING_APPROVAL",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Open => "OPEN",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Convert a canonical name back to a status. Case-insensitive;
    /// anything unrecognized is `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::ALL.into_iter().find(|s| s.as_str() == upper)
    }

    /// Statuses reachable from this one by a single status-changing action.
    pub fn valid_transitions(&self) -> Vec<WorkOrderStatus> {
        let mut targets = Vec::new();
        for action in WorkOrderAction::ALL {
            if action.changes_status() && action.permits(*self) {
                let to = action.target(*self);
                if !targets.contains(&to) {
                    targets.push(to);
                }
            }
        }
        targets
    }
}

impl std::fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive parse of a canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        Self::ALL.into_iter().find(|p| p.as_str() == upper)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Actions (guard table) ───────────────────────────────────────────

/// An operation on a work order, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderAction {
    SubmitForApproval,
    Approve,
    Reject,
    Acknowledge,
    Start,
    Hold,
    Resume,
    Complete,
    Cancel,
    Assign,
}

impl WorkOrderAction {
    /// Every action, in declaration order.
    pub const ALL: [WorkOrderAction; 10] = [
        Self::SubmitForApproval,
        Self::Approve,
        Self::Reject,
        Self::Acknowledge,
        Self::Start,
        Self::Hold,
        Self::Resume,
        Self::Complete,
        Self::Cancel,
        Self::Assign,
    ];

    /// Whether applying this action may move the status.
    pub fn changes_status(&self) -> bool {
        !matches!(self, Self::Assign | Self::Acknowledge)
    }

    /// The guard table.
    pub fn permits(&self, from: WorkOrderStatus) -> bool {
        use WorkOrderStatus as S;
        match self {
            Self::SubmitForApproval => from == S::Requested,
            Self::Approve => from == S::PendingApproval,
            Self::Hold => from == S::InProgress,
            Self::Resume => from == S::OnHold,
            Self::Reject
            | Self::Acknowledge
            | Self::Start
            | Self::Complete
            | Self::Cancel => !from.is_terminal(),
            Self::Assign => true,
        }
    }

    /// Status after this action is applied to `from`. Only meaningful when
    /// [`permits`](Self::permits) holds.
    pub fn target(&self, from: WorkOrderStatus) -> WorkOrderStatus {
        use WorkOrderStatus as S;
        match self {
            Self::SubmitForApproval => S::PendingApproval,
            Self::Approve => S::Approved,
            Self::Reject => S::Rejected,
            Self::Start | Self::Resume => S::InProgress,
            Self::Hold => S::OnHold,
            Self::Complete => S::Completed,
            Self::Cancel => S::Cancelled,
            Self::Acknowledge | Self::Assign => from,
        }
    }

    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitForApproval => "submit_for_approval",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Acknowledge => "acknowledge",
            Self::Start => "start",
            Self::Hold => "hold",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Assign => "assign",
        }
    }
}

impl std::fmt::Display for WorkOrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Commands ────────────────────────────────────────────────────────

/// Facts recorded when work is completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub work_carried_out: Option<String>,
    pub corrective_action: Option<String>,
    pub completion_notes: Option<String>,
    pub actual_downtime_hours: Option<f64>,
    pub actual_cost: Option<f64>,
    pub labor_hours: Option<f64>,
    /// Status to cascade onto the asset, if any.
    pub asset_status: Option<AssetStatus>,
}

/// An action together with its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkOrderCommand {
    SubmitForApproval,
    Approve { notes: Option<String> },
    Reject { reason: String },
    Acknowledge,
    Start,
    Hold { note: String },
    Resume { note: Option<String> },
    Complete(CompletionReport),
    Cancel { note: Option<String> },
    Assign { assignee: UserId },
}

impl WorkOrderCommand {
    /// The payload-free action this command performs.
    pub fn action(&self) -> WorkOrderAction {
        match self {
            Self::SubmitForApproval => WorkOrderAction::SubmitForApproval,
            Self::Approve { .. } => WorkOrderAction::Approve,
            Self::Reject { .. } => WorkOrderAction::Reject,
            Self::Acknowledge => WorkOrderAction::Acknowledge,
            Self::Start => WorkOrderAction::Start,
            Self::Hold { .. } => WorkOrderAction::Hold,
            Self::Resume { .. } => WorkOrderAction::Resume,
            Self::Complete(_) => WorkOrderAction::Complete,
            Self::Cancel { .. } => WorkOrderAction::Cancel,
            Self::Assign { .. } => WorkOrderAction::Assign,
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Why an action did not apply. Recoverable: the record is untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The work order is completed or cancelled.
    #[error("work order is in terminal state {state}; {action} not applied")]
    TerminalState {
        state: WorkOrderStatus,
        action: WorkOrderAction,
    },

    /// The guard table does not allow this action from the current state.
    #[error("invalid work order transition: {action} from {from}")]
    InvalidTransition {
        from: WorkOrderStatus,
        action: WorkOrderAction,
    },

    /// Acknowledgement is recorded once.
    #[error("work order already acknowledged")]
    AlreadyAcknowledged,
}

// ─── Records ─────────────────────────────────────────────────────────

/// A free-text note attached to a work order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderNote {
    pub at: Timestamp,
    pub author: UserId,
    pub text: String,
}

/// Record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrderTransitionRecord {
    pub from_state: WorkOrderStatus,
    pub to_state: WorkOrderStatus,
    pub action: WorkOrderAction,
    pub actor: UserId,
    pub timestamp: Timestamp,
}

/// How a work order entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// Request workflow; starts in `Requested`.
    Request,
    /// Raised directly by maintenance staff; starts in `Open`.
    Direct,
}

impl EntryPoint {
    /// Initial status for this entry point.
    pub fn initial_status(&self) -> WorkOrderStatus {
        match self {
            Self::Request => WorkOrderStatus::Requested,
            Self::Direct => WorkOrderStatus::Open,
        }
    }
}

/// Descriptive fields supplied when a work order is raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub work_type: String,
    #[serde(default)]
    pub category: String,
    pub asset_id: AssetId,
    #[serde(default)]
    pub due_date: Option<Timestamp>,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub estimated_downtime_hours: Option<f64>,
}

/// A work order and its full stamp history.
///
/// Mutated only through [`WorkOrder::apply`]. `version` belongs to the
/// store's optimistic concurrency check and is never touched here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub number: WorkOrderNumber,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub work_type: String,
    pub category: String,
    pub asset_id: AssetId,
    pub tenant_id: Option<TenantId>,
    pub status: WorkOrderStatus,
    pub due_date: Option<Timestamp>,
    pub assigned_to: Option<UserId>,

    pub requested_by: UserId,
    pub requested_date: Timestamp,
    pub approved_by: Option<UserId>,
    pub approved_date: Option<Timestamp>,
    pub approval_notes: Option<String>,
    pub rejected_by: Option<UserId>,
    pub rejected_date: Option<Timestamp>,
    pub rejection_reason: Option<String>,
    pub is_acknowledged: bool,
    pub acknowledged_by: Option<UserId>,
    pub acknowledged_date: Option<Timestamp>,
    pub started_date: Option<Timestamp>,
    pub completed_date: Option<Timestamp>,
    pub time_done: Option<Timestamp>,
    pub time_completed: Option<Timestamp>,
    pub last_modified_by: Option<UserId>,
    pub last_modified_date: Option<Timestamp>,

    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub estimated_downtime_hours: Option<f64>,
    pub actual_downtime_hours: Option<f64>,
    pub labor_hours: Option<f64>,

    pub work_carried_out: Option<String>,
    pub corrective_action: Option<String>,
    pub completion_notes: Option<String>,

    pub notes: Vec<WorkOrderNote>,
    pub transitions: Vec<WorkOrderTransitionRecord>,
    #[serde(default)]
    pub version: u64,
}

impl WorkOrder {
    /// Raise a new work order. Create does not count as a modification,
    /// so `last_modified_*` stay empty.
    pub fn raise(
        draft: WorkOrderDraft,
        number: WorkOrderNumber,
        tenant_id: Option<TenantId>,
        entry: EntryPoint,
        requested_by: UserId,
        at: Timestamp,
    ) -> Self {
        Self {
            id: WorkOrderId::new(),
            number,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            work_type: draft.work_type,
            category: draft.category,
            asset_id: draft.asset_id,
            tenant_id,
            status: entry.initial_status(),
            due_date: draft.due_date,
            assigned_to: draft.assigned_to,
            requested_by,
            requested_date: at,
            approved_by: None,
            approved_date: None,
            approval_notes: None,
            rejected_by: None,
            rejected_date: None,
            rejection_reason: None,
            is_acknowledged: false,
            acknowledged_by: None,
            acknowledged_date: None,
            started_date: None,
            completed_date: None,
            time_done: None,
            time_completed: None,
            last_modified_by: None,
            last_modified_date: None,
            estimated_cost: draft.estimated_cost,
            actual_cost: None,
            estimated_downtime_hours: draft.estimated_downtime_hours,
            actual_downtime_hours: None,
            labor_hours: None,
            work_carried_out: None,
            corrective_action: None,
            completion_notes: None,
            notes: Vec::new(),
            transitions: Vec::new(),
            version: 0,
        }
    }

    /// Whether the work order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Past its due date and still open.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }

    /// Check whether `action` would apply, without mutating anything.
    pub fn check(&self, action: WorkOrderAction) -> Result<(), TransitionError> {
        if !action.permits(self.status) {
            if self.status.is_terminal() {
                return Err(TransitionError::TerminalState {
                    state: self.status,
                    action,
                });
            }
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        if action == WorkOrderAction::Acknowledge && self.is_acknowledged {
            return Err(TransitionError::AlreadyAcknowledged);
        }
        Ok(())
    }

    /// Apply `command` on behalf of `actor` at instant `at`.
    ///
    /// On success every stamp the action requires is written, the status
    /// moves per the guard table, a transition record is appended when the
    /// status changed, and `last_modified_*` are updated. On failure the
    /// record is unchanged.
    pub fn apply(
        &mut self,
        command: WorkOrderCommand,
        actor: &UserId,
        at: Timestamp,
    ) -> Result<Option<WorkOrderTransitionRecord>, TransitionError> {
        let action = command.action();
        self.check(action)?;
        let from = self.status;

        match command {
            WorkOrderCommand::SubmitForApproval | WorkOrderCommand::Cancel { note: None } => {}
            WorkOrderCommand::Approve { notes } => {
                self.approved_by = Some(actor.clone());
                self.approved_date = Some(at);
                if let Some(text) = notes {
                    self.approval_notes = Some(text.clone());
                    self.push_note(actor, at, text);
                }
            }
            WorkOrderCommand::Reject { reason } => {
                self.rejected_by = Some(actor.clone());
                self.rejected_date = Some(at);
                self.rejection_reason = Some(reason);
            }
            WorkOrderCommand::Acknowledge => self.acknowledge(actor, at),
            WorkOrderCommand::Start => {
                if self.started_date.is_none() {
                    self.started_date = Some(at);
                }
                if !self.is_acknowledged {
                    self.acknowledge(actor, at);
                }
            }
            WorkOrderCommand::Hold { note } => {
                self.push_note(actor, at, format!("On hold: {note}"));
            }
            WorkOrderCommand::Resume { note } => {
                let text = match note {
                    Some(n) => format!("Resumed: {n}"),
                    None => "Resumed".to_string(),
                };
                self.push_note(actor, at, text);
            }
            WorkOrderCommand::Complete(report) => {
                self.completed_date = Some(at);
                self.time_done = Some(at);
                self.time_completed = Some(at);
                self.work_carried_out = report.work_carried_out;
                self.corrective_action = report.corrective_action;
                self.completion_notes = report.completion_notes;
                self.actual_downtime_hours = report.actual_downtime_hours;
                self.actual_cost = report.actual_cost;
                self.labor_hours = report.labor_hours;
            }
            WorkOrderCommand::Cancel { note: Some(note) } => {
                self.push_note(actor, at, format!("Cancelled: {note}"));
            }
            WorkOrderCommand::Assign { assignee } => {
                self.assigned_to = Some(assignee);
            }
        }

        self.status = action.target(from);
        self.last_modified_by = Some(actor.clone());
        self.last_modified_date = Some(at);

        if self.status == from {
            return Ok(None);
        }
        let record = WorkOrderTransitionRecord {
            from_state: from,
            to_state: self.status,
            action,
            actor: actor.clone(),
            timestamp: at,
        };
        self.transitions.push(record.clone());
        Ok(Some(record))
    }

    fn acknowledge(&mut self, actor: &UserId, at: Timestamp) {
        self.is_acknowledged = true;
        self.acknowledged_by = Some(actor.clone());
        self.acknowledged_date = Some(at);
    }

    fn push_note(&mut self, author: &UserId, at: Timestamp, text: String) {
        self.notes.push(WorkOrderNote {
            at,
            author: author.clone(),
            text,
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn raised(entry: EntryPoint) -> WorkOrder {
        WorkOrder::raise(
            WorkOrderDraft {
                title: "Leaking valve".to_string(),
                description: None,
                priority: Priority::Medium,
                work_type: "Corrective".to_string(),
                category: String::new(),
                asset_id: AssetId::new(),
                due_date: None,
                assigned_to: None,
                estimated_cost: None,
                estimated_downtime_hours: None,
            },
            WorkOrderNumber::new(2025, 1, 1).unwrap(),
            None,
            entry,
            UserId::new("planner").unwrap(),
            Timestamp::from_ymd(2025, 1, 1).unwrap(),
        )
    }

    fn command(action: WorkOrderAction) -> WorkOrderCommand {
        match action {
            WorkOrderAction::SubmitForApproval => WorkOrderCommand::SubmitForApproval,
            WorkOrderAction::Approve => WorkOrderCommand::Approve { notes: None },
            WorkOrderAction::Reject => WorkOrderCommand::Reject {
                reason: "no budget".to_string(),
            },
            WorkOrderAction::Acknowledge => WorkOrderCommand::Acknowledge,
            WorkOrderAction::Start => WorkOrderCommand::Start,
            WorkOrderAction::Hold => WorkOrderCommand::Hold {
                note: "parts".to_string(),
            },
            WorkOrderAction::Resume => WorkOrderCommand::Resume { note: None },
            WorkOrderAction::Complete => WorkOrderCommand::Complete(CompletionReport::default()),
            WorkOrderAction::Cancel => WorkOrderCommand::Cancel { note: None },
            WorkOrderAction::Assign => WorkOrderCommand::Assign {
                assignee: UserId::new("tech").unwrap(),
            },
        }
    }

    proptest! {
        /// Along any action sequence: refusals change nothing, status
        /// changes are logged, and nothing leaves a terminal state.
        #[test]
        fn random_action_sequences_respect_the_guard_table(
            request in any::<bool>(),
            picks in proptest::collection::vec(0usize..WorkOrderAction::ALL.len(), 0..40),
        ) {
            let entry = if request { EntryPoint::Request } else { EntryPoint::Direct };
            let mut wo = raised(entry);
            let actor = UserId::new("tech").unwrap();
            let at = Timestamp::from_ymd(2025, 1, 2).unwrap();

            for pick in picks {
                let action = WorkOrderAction::ALL[pick];
                let before = wo.clone();
                match wo.apply(command(action), &actor, at) {
                    Ok(record) => {
                        prop_assert!(action.permits(before.status));
                        prop_assert_eq!(wo.status, action.target(before.status));
                        prop_assert_eq!(record.is_some(), wo.status != before.status);
                        if before.status.is_terminal() {
                            prop_assert_eq!(wo.status, before.status);
                        }
                    }
                    Err(_) => prop_assert_eq!(&wo, &before),
                }
            }
            for pair in wo.transitions.windows(2) {
                prop_assert_eq!(pair[0].to_state, pair[1].from_state);
            }
        }
    }
}
