//! # cmms CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmms_cli::asset::{run_asset, AssetArgs};
use cmms_cli::config::{CliConfig, SchedulerOverrides};
use cmms_cli::context::Context;
use cmms_cli::frequency::{run_frequency, run_recommend, FrequencyArgs, RecommendArgs};
use cmms_cli::schedule::{run_schedule, ScheduleArgs};
use cmms_cli::watch::{run_watch, WatchArgs};
use cmms_cli::work_order::{run_work_order, WorkOrderArgs};
use cmms_core::Timestamp;

/// Maintenance management CLI.
///
/// Work-order lifecycle, recurring maintenance schedules and due
/// processing over a JSON store snapshot.
#[derive(Parser, Debug)]
#[command(name = "cmms", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to the YAML configuration file (tenant directory, scheduler).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the store snapshot.
    #[arg(long, global = true, default_value = "cmms-store.json")]
    store: PathBuf,

    /// Acting user.
    #[arg(long = "as", global = true)]
    user: Option<String>,

    /// Pin the clock (`YYYY-MM-DD` or RFC 3339 UTC) instead of wall time.
    #[arg(long, global = true)]
    now: Option<String>,

    /// Cap on occurrences per bulk generation.
    #[arg(long, global = true)]
    max_occurrences: Option<u32>,

    /// Seconds between due passes in `watch`.
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interval for a recurrence label, and optionally the next date.
    Frequency(FrequencyArgs),

    /// Advisory maintenance interval from criticality or health score.
    Recommend(RecommendArgs),

    /// Asset registry upkeep.
    Asset(AssetArgs),

    /// Maintenance schedules and due processing.
    Schedule(ScheduleArgs),

    /// Work-order lifecycle.
    WorkOrder(WorkOrderArgs),

    /// Run due processing on an interval until Ctrl-C.
    Watch(WatchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "cmms CLI starting");

    let result = match &cli.command {
        Commands::Frequency(args) => run_frequency(args),
        Commands::Recommend(args) => run_recommend(args),
        Commands::Asset(args) => open_context(&cli).and_then(|ctx| run_asset(args, &ctx)),
        Commands::Schedule(args) => open_context(&cli).and_then(|ctx| run_schedule(args, &ctx)),
        Commands::WorkOrder(args) => {
            open_context(&cli).and_then(|ctx| run_work_order(args, &ctx))
        }
        Commands::Watch(args) => run_watch(args, || open_context(&cli)),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Load config and store for one command. Flags override the file,
/// which overrides the environment.
fn open_context(cli: &Cli) -> Result<Context> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let flags = SchedulerOverrides {
        max_occurrences: cli.max_occurrences,
        poll_interval_secs: cli.poll_interval,
    };
    let now = cli
        .now
        .as_deref()
        .map(Timestamp::parse_date_or_timestamp)
        .transpose()?;
    Context::open(
        cli.store.clone(),
        config.tenant_guard(),
        flags.apply(config.scheduler_config()),
        cli.user.clone(),
        now,
    )
}
