//! # Schedule Subcommand
//!
//! Create maintenance schedules, pre-generate recurring occurrences from a
//! template, run a due pass, complete occurrences and list what the caller
//! can see.
//!
//! `process-due` is the one-shot form of `cmms watch`: it needs no acting
//! user and touches every tenant's schedules.

use anyhow::Result;
use clap::{Args, Subcommand};

use cmms_core::{AssetId, Clock, ScheduleId, TenantId, Timestamp, UserId};
use cmms_schedule::{Frequency, MaintenanceSchedule, ScheduleDraft};
use cmms_service::{DueRunReport, ScheduleCompletion};

use crate::context::Context;

/// Passes `--catch-up` runs when `--max-passes` is not given.
pub const DEFAULT_MAX_PASSES: usize = 366;

/// Arguments for `cmms schedule`.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

/// Schedule subcommands.
#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    /// Create a schedule for an asset.
    Create {
        #[arg(long)]
        asset: AssetId,
        #[arg(long)]
        title: String,
        /// First occurrence (`YYYY-MM-DD` or RFC 3339 UTC).
        #[arg(long)]
        date: String,
        /// End of the first occurrence, if it spans time.
        #[arg(long)]
        end: Option<String>,
        /// Recurrence label. Omit for a one-off schedule.
        #[arg(long)]
        frequency: Option<String>,
        /// Interval in days for `Custom`, at most 36500.
        #[arg(long)]
        custom_days: Option<u32>,
        /// Maintenance type (Preventive, Inspection, ...).
        #[arg(long = "type", default_value = "Preventive")]
        maintenance_type: String,
        #[arg(long)]
        technician: Option<String>,
        #[arg(long)]
        duration_hours: Option<f64>,
        /// Owning tenant. Defaults to the caller's tenant.
        #[arg(long)]
        tenant: Option<i64>,
    },
    /// Pre-generate future occurrences from a recurring template.
    Generate {
        #[arg(long)]
        id: ScheduleId,
        #[arg(long, default_value_t = 12)]
        occurrences: u32,
    },
    /// Run one due pass over all tenants.
    ProcessDue {
        /// Keep passing until nothing is due.
        #[arg(long)]
        catch_up: bool,
        #[arg(long, default_value_t = DEFAULT_MAX_PASSES)]
        max_passes: usize,
    },
    /// Mark an occurrence completed.
    Complete {
        #[arg(long)]
        id: ScheduleId,
    },
    /// List schedules visible to the caller.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// Execute `cmms schedule`.
pub fn run_schedule(args: &ScheduleArgs, ctx: &Context) -> Result<u8> {
    match &args.command {
        ScheduleCommand::Create {
            asset,
            title,
            date,
            end,
            frequency,
            custom_days,
            maintenance_type,
            technician,
            duration_hours,
            tenant,
        } => {
            let caller = ctx.caller()?;
            let frequency = frequency.as_deref().and_then(Frequency::parse);
            if matches!(frequency, Some(Frequency::Custom)) && custom_days.is_none() {
                tracing::warn!("Custom frequency without --custom-days; default interval applies");
            }
            let draft = ScheduleDraft {
                asset_id: *asset,
                asset_name: String::new(),
                title: title.clone(),
                description: None,
                maintenance_type: maintenance_type.clone(),
                assigned_technician: technician.as_deref().map(UserId::new).transpose()?,
                estimated_duration_hours: *duration_hours,
                scheduled_date: Timestamp::parse_date_or_timestamp(date)?,
                end_date: end
                    .as_deref()
                    .map(Timestamp::parse_date_or_timestamp)
                    .transpose()?,
                frequency,
                custom_interval_days: *custom_days,
            };
            let tenant = tenant.map(TenantId::new).transpose()?;
            let created = ctx.scheduler().create_schedule(&caller, draft, tenant)?;
            ctx.save()?;
            println!("OK: created {} ({})", created.id, describe(&created));
        }
        ScheduleCommand::Generate { id, occurrences } => {
            let caller = ctx.caller()?;
            let generated = ctx
                .scheduler()
                .generate_for_template(&caller, *id, *occurrences)?;
            ctx.save()?;
            println!("OK: generated {} occurrence(s) from {id}", generated.len());
            for occ in &generated {
                println!("  {}  {}", occ.id, occ.scheduled_date.date());
            }
        }
        ScheduleCommand::ProcessDue {
            catch_up,
            max_passes,
        } => {
            let report = due_pass(ctx, catch_up.then_some(*max_passes));
            if !report.generated.is_empty() {
                ctx.save()?;
            }
            print_report(&report);
        }
        ScheduleCommand::Complete { id } => {
            let caller = ctx.caller()?;
            match ctx.scheduler().complete_schedule(&caller, *id)? {
                ScheduleCompletion::Completed(s) => {
                    ctx.save()?;
                    println!("OK: completed {} on {}", s.id, ctx.clock.now().date());
                }
                ScheduleCompletion::AlreadyCompleted(s) => {
                    println!("OK: {} was already completed", s.id);
                }
            }
        }
        ScheduleCommand::List { json } => {
            let caller = ctx.caller()?;
            let schedules = ctx.scheduler().list_schedules(&caller)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&schedules)?);
            } else if schedules.is_empty() {
                println!("No schedules.");
            } else {
                for s in &schedules {
                    println!(
                        "{}  {}  {}  {}  {}",
                        s.id,
                        s.scheduled_date.date(),
                        s.status,
                        s.title,
                        describe(s)
                    );
                }
            }
        }
    }
    Ok(0)
}

/// One due pass at the context clock, or repeated passes when
/// `catch_up_passes` is set. Skipped sources from every pass are kept.
pub fn due_pass(ctx: &Context, catch_up_passes: Option<usize>) -> DueRunReport {
    let scheduler = ctx.scheduler();
    let now = ctx.clock.now();
    let Some(max_passes) = catch_up_passes else {
        return scheduler.process_due(now);
    };
    let mut total = DueRunReport::default();
    for _ in 0..max_passes {
        let report = scheduler.process_due(now);
        if report.generated.is_empty() {
            total.skipped.extend(report.skipped);
            break;
        }
        total.generated.extend(report.generated);
        total.skipped.extend(report.skipped);
    }
    total
}

fn print_report(report: &DueRunReport) {
    if report.is_idle() {
        println!("OK: nothing due");
        return;
    }
    println!("OK: generated {} occurrence(s)", report.generated.len());
    for occ in &report.generated {
        println!(
            "  {}  {}  from {}",
            occ.id,
            occ.scheduled_date.date(),
            occ.generated_from.map_or_else(|| "-".to_string(), |s| s.to_string())
        );
    }
    for id in &report.skipped {
        println!("  skipped {id}");
    }
}

fn describe(s: &MaintenanceSchedule) -> String {
    match &s.frequency {
        Some(f) => format!("{f}, every {} days", s.interval_days()),
        None => "one-off".to_string(),
    }
}
