//! # Work Order Subcommand
//!
//! `cmms work-order create|show|list|transition`. Every command acts as
//! the `--as` user and goes through the tenant guard.
//!
//! `transition` takes the action as a nested subcommand:
//!
//! ```text
//! cmms --as alice work-order transition --id wo:... hold --note "awaiting part"
//! ```
//!
//! An action the lifecycle refuses is reported on stdout and exits with
//! status 2; nothing is written. Access and lookup failures are errors
//! (status 1).

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use cmms_core::{AssetId, TenantId, Timestamp, UserId, WorkOrderId};
use cmms_state::{
    AssetStatus, CompletionReport, EntryPoint, Priority, WorkOrder, WorkOrderCommand,
    WorkOrderDraft, WorkOrderStatus,
};
use cmms_service::{NewWorkOrder, TransitionOutcome, WorkOrderFilter};

use crate::context::Context;

/// Exit status when the lifecycle refuses an action.
pub const EXIT_NOT_APPLIED: u8 = 2;

/// Arguments for `cmms work-order`.
#[derive(Args, Debug)]
pub struct WorkOrderArgs {
    #[command(subcommand)]
    pub command: WorkOrderCommandArgs,
}

/// Work-order subcommands.
#[derive(Subcommand, Debug)]
pub enum WorkOrderCommandArgs {
    /// Raise a work order against an asset.
    Create {
        #[arg(long)]
        asset: AssetId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// LOW, MEDIUM, HIGH or CRITICAL.
        #[arg(long, default_value = "MEDIUM")]
        priority: String,
        #[arg(long, default_value = "Corrective")]
        work_type: String,
        #[arg(long, default_value = "")]
        category: String,
        /// Due date (`YYYY-MM-DD` or RFC 3339 UTC).
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assign: Option<String>,
        #[arg(long)]
        estimated_cost: Option<f64>,
        #[arg(long)]
        estimated_downtime_hours: Option<f64>,
        /// Raise as a request (starts `REQUESTED`) instead of directly
        /// (`OPEN`).
        #[arg(long)]
        request: bool,
        /// Owning tenant. Defaults to the caller's tenant.
        #[arg(long)]
        tenant: Option<i64>,
    },
    /// Print one work order as JSON.
    Show {
        #[arg(long)]
        id: WorkOrderId,
    },
    /// List work orders visible to the caller.
    List {
        /// Canonical status name, e.g. IN_PROGRESS.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        asset: Option<AssetId>,
        /// Only orders past due and not completed or cancelled.
        #[arg(long)]
        overdue: bool,
        #[arg(long)]
        json: bool,
    },
    /// Apply a lifecycle action.
    Transition {
        #[arg(long)]
        id: WorkOrderId,
        #[command(subcommand)]
        action: ActionArgs,
    },
}

/// Lifecycle actions and their payloads.
#[derive(Subcommand, Debug, Clone)]
pub enum ActionArgs {
    /// REQUESTED -> PENDING_APPROVAL.
    Submit,
    /// PENDING_APPROVAL -> APPROVED.
    Approve {
        #[arg(long)]
        notes: Option<String>,
    },
    /// Any non-terminal status -> REJECTED.
    Reject {
        #[arg(long)]
        reason: String,
    },
    /// Record acknowledgement; status unchanged.
    Acknowledge,
    /// Any non-terminal status -> IN_PROGRESS; acknowledges if not yet done.
    Start,
    /// IN_PROGRESS -> ON_HOLD.
    Hold {
        #[arg(long)]
        note: String,
    },
    /// ON_HOLD -> IN_PROGRESS.
    Resume {
        #[arg(long)]
        note: Option<String>,
    },
    /// Finish the work, optionally cascading a status onto the asset.
    Complete {
        #[arg(long)]
        work_carried_out: Option<String>,
        #[arg(long)]
        corrective_action: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        downtime_hours: Option<f64>,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        labor_hours: Option<f64>,
        /// OPERATIONAL, UNDER_MAINTENANCE, DOWN or DECOMMISSIONED.
        #[arg(long)]
        asset_status: Option<String>,
    },
    /// Any non-terminal status -> CANCELLED.
    Cancel {
        #[arg(long)]
        note: Option<String>,
    },
    /// Change the assignee; status unchanged.
    Assign {
        #[arg(long)]
        to: String,
    },
}

impl ActionArgs {
    /// The lifecycle command this action stands for.
    pub fn to_command(&self) -> Result<WorkOrderCommand> {
        let command = match self.clone() {
            Self::Submit => WorkOrderCommand::SubmitForApproval,
            Self::Approve { notes } => WorkOrderCommand::Approve { notes },
            Self::Reject { reason } => WorkOrderCommand::Reject { reason },
            Self::Acknowledge => WorkOrderCommand::Acknowledge,
            Self::Start => WorkOrderCommand::Start,
            Self::Hold { note } => WorkOrderCommand::Hold { note },
            Self::Resume { note } => WorkOrderCommand::Resume { note },
            Self::Complete {
                work_carried_out,
                corrective_action,
                notes,
                downtime_hours,
                cost,
                labor_hours,
                asset_status,
            } => WorkOrderCommand::Complete(CompletionReport {
                work_carried_out,
                corrective_action,
                completion_notes: notes,
                actual_downtime_hours: downtime_hours,
                actual_cost: cost,
                labor_hours,
                asset_status: asset_status.as_deref().map(parse_asset_status).transpose()?,
            }),
            Self::Cancel { note } => WorkOrderCommand::Cancel { note },
            Self::Assign { to } => WorkOrderCommand::Assign {
                assignee: UserId::new(to)?,
            },
        };
        Ok(command)
    }
}

/// Execute `cmms work-order`.
pub fn run_work_order(args: &WorkOrderArgs, ctx: &Context) -> Result<u8> {
    let caller = ctx.caller()?;
    let service = ctx.work_orders();
    match &args.command {
        WorkOrderCommandArgs::Create {
            asset,
            title,
            description,
            priority,
            work_type,
            category,
            due,
            assign,
            estimated_cost,
            estimated_downtime_hours,
            request,
            tenant,
        } => {
            let draft = WorkOrderDraft {
                title: title.clone(),
                description: description.clone(),
                priority: Priority::from_name(priority)
                    .ok_or_else(|| anyhow!("unknown priority {priority:?}"))?,
                work_type: work_type.clone(),
                category: category.clone(),
                asset_id: *asset,
                due_date: due
                    .as_deref()
                    .map(Timestamp::parse_date_or_timestamp)
                    .transpose()?,
                assigned_to: assign.as_deref().map(UserId::new).transpose()?,
                estimated_cost: *estimated_cost,
                estimated_downtime_hours: *estimated_downtime_hours,
            };
            let entry = if *request {
                EntryPoint::Request
            } else {
                EntryPoint::Direct
            };
            let order = service.create(
                &caller,
                NewWorkOrder {
                    draft,
                    entry,
                    tenant_id: tenant.map(TenantId::new).transpose()?,
                },
            )?;
            ctx.save()?;
            println!("OK: created {} ({}) {}", order.number, order.id, order.status);
            Ok(0)
        }
        WorkOrderCommandArgs::Show { id } => {
            let order = service.get(&caller, *id)?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(0)
        }
        WorkOrderCommandArgs::List {
            status,
            asset,
            overdue,
            json,
        } => {
            let filter = WorkOrderFilter {
                status: status
                    .as_deref()
                    .map(|s| {
                        WorkOrderStatus::from_name(s).ok_or_else(|| anyhow!("unknown status {s:?}"))
                    })
                    .transpose()?,
                asset_id: *asset,
                overdue: *overdue,
            };
            let orders = service.list(&caller, &filter)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
            } else if orders.is_empty() {
                println!("No work orders.");
            } else {
                for order in &orders {
                    println!("{}", summary(order));
                }
            }
            Ok(0)
        }
        WorkOrderCommandArgs::Transition { id, action } => {
            let command = action.to_command()?;
            match service.transition(&caller, *id, command)? {
                TransitionOutcome::Applied(order) => {
                    ctx.save()?;
                    println!("OK: {} is {}", order.number, order.status);
                    Ok(0)
                }
                TransitionOutcome::NotApplied(reason) => {
                    println!("NOT APPLIED: {reason}");
                    Ok(EXIT_NOT_APPLIED)
                }
            }
        }
    }
}

fn parse_asset_status(name: &str) -> Result<AssetStatus> {
    AssetStatus::from_name(name).ok_or_else(|| anyhow!("unknown asset status {name:?}"))
}

fn summary(order: &WorkOrder) -> String {
    let due = order
        .due_date
        .map_or_else(|| "-".to_string(), |d| d.date().to_string());
    format!(
        "{}  {:<16}  {:<8}  due {}  {}",
        order.number,
        order.status.as_str(),
        order.priority.as_str(),
        due,
        order.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::context;
    use cmms_service::{AssetRecord, AssetRegistry};

    fn register(ctx: &Context, tenant: i64) -> AssetId {
        let asset = AssetRecord::new("Compressor", Some(TenantId::new(tenant).unwrap()));
        let id = asset.id;
        ctx.store.register_asset(asset);
        id
    }

    fn create(asset: AssetId, request: bool) -> WorkOrderArgs {
        WorkOrderArgs {
            command: WorkOrderCommandArgs::Create {
                asset,
                title: "Replace belt".to_string(),
                description: None,
                priority: "high".to_string(),
                work_type: "Corrective".to_string(),
                category: String::new(),
                due: Some("2025-03-20".to_string()),
                assign: None,
                estimated_cost: None,
                estimated_downtime_hours: None,
                request,
                tenant: None,
            },
        }
    }

    fn transition(id: WorkOrderId, action: ActionArgs) -> WorkOrderArgs {
        WorkOrderArgs {
            command: WorkOrderCommandArgs::Transition { id, action },
        }
    }

    fn only_order(ctx: &Context) -> WorkOrder {
        let orders = ctx.store.snapshot().work_orders;
        assert_eq!(orders.len(), 1);
        orders[0].clone()
    }

    #[test]
    fn test_create_allocates_number_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "alice", "2025-03-14T09:30:00Z");
        let asset = register(&ctx, 1);
        assert_eq!(run_work_order(&create(asset, false), &ctx).unwrap(), 0);

        let order = only_order(&ctx);
        assert_eq!(order.number.to_string(), "WO-202503-0001");
        assert_eq!(order.status, WorkOrderStatus::Open);
        assert_eq!(order.priority, Priority::High);
        let reloaded = crate::context::load_store(&ctx.store_path).unwrap();
        assert_eq!(reloaded.snapshot().work_orders.len(), 1);
    }

    #[test]
    fn test_refused_action_exits_two_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "alice", "2025-03-14");
        let asset = register(&ctx, 1);
        run_work_order(&create(asset, false), &ctx).unwrap();
        let order = only_order(&ctx);

        let hold = ActionArgs::Hold {
            note: "parts".to_string(),
        };
        let code = run_work_order(&transition(order.id, hold), &ctx).unwrap();
        assert_eq!(code, EXIT_NOT_APPLIED);
        assert_eq!(only_order(&ctx).version, order.version);
    }

    #[test]
    fn test_reject_and_start_apply_outside_approval_flow() {
        let cmd = ActionArgs::augment_subcommands(clap::Command::new("transition"));
        for name in ["reject", "start"] {
            let about = cmd
                .find_subcommand(name)
                .and_then(|c| c.get_about())
                .map(|a| a.to_string())
                .unwrap();
            assert!(about.starts_with("Any non-terminal status"), "{name}: {about}");
        }

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "alice", "2025-03-14");
        let asset = register(&ctx, 1);
        run_work_order(&create(asset, true), &ctx).unwrap();
        let id = only_order(&ctx).id;
        assert_eq!(run_work_order(&transition(id, ActionArgs::Start), &ctx).unwrap(), 0);
        let reject = ActionArgs::Reject {
            reason: "duplicate".to_string(),
        };
        assert_eq!(run_work_order(&transition(id, reject), &ctx).unwrap(), 0);
        assert_eq!(only_order(&ctx).status, WorkOrderStatus::Rejected);
    }

    #[test]
    fn test_complete_cascades_asset_status() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "alice", "2025-03-14");
        let asset = register(&ctx, 1);
        ctx.store.set_status(asset, AssetStatus::Down).unwrap();
        run_work_order(&create(asset, false), &ctx).unwrap();
        let id = only_order(&ctx).id;

        run_work_order(&transition(id, ActionArgs::Start), &ctx).unwrap();
        let complete = ActionArgs::Complete {
            work_carried_out: Some("Belt replaced".to_string()),
            corrective_action: None,
            notes: None,
            downtime_hours: Some(1.5),
            cost: Some(80.0),
            labor_hours: Some(2.0),
            asset_status: Some("operational".to_string()),
        };
        assert_eq!(run_work_order(&transition(id, complete), &ctx).unwrap(), 0);
        assert_eq!(only_order(&ctx).status, WorkOrderStatus::Completed);
        let assets = ctx.store.assets();
        assert_eq!(assets[0].status, AssetStatus::Operational);
    }

    #[test]
    fn test_other_tenant_cannot_transition() {
        let dir = tempfile::tempdir().unwrap();
        let alice = context(dir.path(), "alice", "2025-03-14");
        let asset = register(&alice, 1);
        run_work_order(&create(asset, true), &alice).unwrap();
        let id = only_order(&alice).id;

        let bob = context(dir.path(), "bob", "2025-03-14");
        assert!(run_work_order(&transition(id, ActionArgs::Submit), &bob).is_err());
    }

    #[test]
    fn test_bad_payload_names_are_errors() {
        let complete = ActionArgs::Complete {
            work_carried_out: None,
            corrective_action: None,
            notes: None,
            downtime_hours: None,
            cost: None,
            labor_hours: None,
            asset_status: Some("BROKEN".to_string()),
        };
        assert!(complete.to_command().is_err());
        let cmd = ActionArgs::Approve { notes: None }.to_command().unwrap();
        assert_eq!(cmd, WorkOrderCommand::Approve { notes: None });
    }
}
