//! # Lookup Subcommands
//!
//! `cmms frequency` and `cmms recommend`. Pure lookups; no store, no user.

use anyhow::{bail, Result};
use clap::Args;

use cmms_core::Timestamp;
use cmms_schedule::{
    frequency_days, next_date, recommended_frequency, recommended_interval_days, Frequency,
};

/// Arguments for `cmms frequency`.
#[derive(Args, Debug)]
pub struct FrequencyArgs {
    /// Frequency label (Daily, Weekly, BiWeekly, Monthly, Quarterly,
    /// SemiAnnual, Annually, Custom).
    pub label: String,

    /// Interval in days for `Custom`.
    #[arg(long)]
    pub custom_days: Option<u32>,

    /// Base date (`YYYY-MM-DD` or RFC 3339 UTC); prints the next date.
    #[arg(long)]
    pub from: Option<String>,
}

/// Arguments for `cmms recommend`.
#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// Asset criticality (Critical, High, Medium, Low).
    #[arg(long, conflicts_with = "health")]
    pub criticality: Option<String>,

    /// Asset health score, 0 to 100.
    #[arg(long)]
    pub health: Option<f64>,
}

/// Execute `cmms frequency`.
pub fn run_frequency(args: &FrequencyArgs) -> Result<u8> {
    let days = frequency_days(&args.label, args.custom_days);
    match Frequency::parse(&args.label) {
        Some(f) if f.is_recognized() => println!("{}: {days} days", f.as_str()),
        _ => println!(
            "{:?} is not a recognized frequency; default interval {days} days",
            args.label
        ),
    }
    if let Some(from) = &args.from {
        let base = Timestamp::parse_date_or_timestamp(from)?;
        let next = next_date(base, &args.label, args.custom_days);
        println!("next: {}", next.date());
    }
    Ok(0)
}

/// Execute `cmms recommend`.
pub fn run_recommend(args: &RecommendArgs) -> Result<u8> {
    match (&args.criticality, args.health) {
        (Some(criticality), _) => {
            println!(
                "criticality {criticality}: every {} days",
                recommended_interval_days(criticality)
            );
        }
        (None, Some(score)) => {
            if !(0.0..=100.0).contains(&score) {
                bail!("health score must be between 0 and 100, got {score}");
            }
            let f = recommended_frequency(score);
            println!("health {score}: {} ({} days)", f, f.days(None));
        }
        (None, None) => bail!("pass --criticality or --health"),
    }
    Ok(0)
}
