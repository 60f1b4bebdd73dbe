//! # Watch Subcommand
//!
//! Runs the due pass on a fixed interval until Ctrl-C. Each tick reopens
//! the store snapshot, so edits made by other `cmms` invocations between
//! ticks are picked up, and writes it back only when the pass generated
//! something.
//!
//! A tick that fails (unreadable snapshot, failed write) is logged and the
//! loop keeps going.

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use tokio::time::MissedTickBehavior;

use crate::context::Context;
use crate::schedule::{due_pass, DEFAULT_MAX_PASSES};

/// Arguments for `cmms watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between passes. Defaults to the scheduler's poll interval.
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Keep passing each tick until nothing is due.
    #[arg(long)]
    pub catch_up: bool,

    /// Stop after this many ticks.
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

/// Execute `cmms watch`. `open` builds a fresh context for every tick.
pub fn run_watch<F>(args: &WatchArgs, open: F) -> Result<u8>
where
    F: Fn() -> Result<Context>,
{
    let secs = match args.interval_secs {
        Some(secs) => secs,
        None => open()?.scheduler_config.poll_interval_secs,
    };
    if secs == 0 {
        bail!("interval must be at least one second");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let ticks = runtime.block_on(watch_loop(
        Duration::from_secs(secs),
        args.catch_up,
        args.max_ticks,
        &open,
    ))?;
    println!("OK: watch stopped after {ticks} tick(s)");
    Ok(0)
}

async fn watch_loop<F>(
    period: Duration,
    catch_up: bool,
    max_ticks: Option<u64>,
    open: &F,
) -> Result<u64>
where
    F: Fn() -> Result<Context>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    tracing::info!(interval_secs = period.as_secs(), catch_up, "watch started");
    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            res = &mut shutdown => {
                res?;
                tracing::info!("shutdown requested");
                break;
            }
        }
        if let Err(e) = tick(open, catch_up) {
            tracing::error!("due pass failed: {e:#}");
        }
        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
    }
    Ok(ticks)
}

fn tick<F>(open: &F, catch_up: bool) -> Result<()>
where
    F: Fn() -> Result<Context>,
{
    let ctx = open()?;
    let report = due_pass(&ctx, catch_up.then_some(DEFAULT_MAX_PASSES));
    if !report.generated.is_empty() {
        ctx.save()?;
    }
    tracing::info!(
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        "due pass finished"
    );
    Ok(())
}
