//! Tier command handlers
//!
//! Handles the tier catalog and previews of the next cadence decision.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use dora_core::domain::{PerformanceTier, TeamLevel};
use dora_core::{DelayDecision, minutes_until_next_deployment};

use crate::config::Config;

/// Tier subcommands
#[derive(Subcommand)]
pub enum TierCommands {
    /// List all performance tiers
    List,
    /// Show the DORA profile of a tier
    Get {
        /// elite, high, medium or low
        level: TeamLevel,
    },
    /// Preview what the runner would decide right now
    Next {
        /// elite, high, medium or low
        #[arg(long, env = "DORA_TEAM_PERFORMANCE_LEVEL")]
        level: TeamLevel,
    },
}

/// Handle tier commands
///
/// Routes tier subcommands to their respective handlers.
///
/// # Arguments
/// * `command` - The tier command to execute
/// * `config` - The CLI configuration
pub async fn handle_tier_command(command: TierCommands, config: &Config) -> Result<()> {
    match command {
        TierCommands::List => {
            list_tiers();
            Ok(())
        }
        TierCommands::Get { level } => {
            print_tier_details(&PerformanceTier::for_level(level));
            Ok(())
        }
        TierCommands::Next { level } => preview_next(config, level).await,
    }
}

/// List all tiers with their deployment interval
fn list_tiers() {
    println!("{}", "Performance tiers:".bold());
    println!();
    for tier in PerformanceTier::all() {
        println!(
            "  {} {:<8} every {} to {}",
            "▸".cyan(),
            tier.level.to_string().bold(),
            format_minutes(tier.interval.lower_bound),
            format_minutes(tier.interval.upper_bound)
        );
    }
}

/// Print a tier's interval and DORA profile
fn print_tier_details(tier: &PerformanceTier) {
    println!("{}", format!("Tier: {}", tier.level).bold());
    println!();
    println!(
        "  Interval:             {} to {}",
        format_minutes(tier.interval.lower_bound),
        format_minutes(tier.interval.upper_bound)
    );
    println!(
        "  Deployment frequency: {}",
        tier.profile.deployment_frequency
    );
    println!("  Lead time:            {}", tier.profile.change_lead_time);
    println!(
        "  Change failure rate:  {}",
        tier.profile.change_failure_rate
    );
    println!("  Recovery time:        {}", tier.profile.recovery_time);
}

/// Fetch the last deployment and show the decision for `level`
async fn preview_next(config: &Config, level: TeamLevel) -> Result<()> {
    let client = config.client()?;
    let tier = PerformanceTier::for_level(level);

    let last = client
        .last_deployment()
        .await
        .with_context(|| format!("Failed to query deployments of {}", client.repository()))?;
    let last_deploy = last.map(|record| record.created_at);

    let decision =
        minutes_until_next_deployment(&tier, last_deploy, Utc::now(), &mut rand::thread_rng());

    println!("{}", format!("Repository {}", client.repository()).bold());
    println!("  Last deployment: {}", format_last_deploy(last_deploy).dimmed());
    println!("  Decision:        {}", describe_decision(decision));

    Ok(())
}

fn format_last_deploy(last_deploy: Option<DateTime<Utc>>) -> String {
    last_deploy
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// Colorized summary of a cadence decision
fn describe_decision(decision: DelayDecision) -> ColoredString {
    match decision {
        DelayDecision::Skip => "skip (too soon since the last deployment)".yellow(),
        DelayDecision::FireAfter(minutes) => {
            format!("deploy in {}", format_minutes(minutes.get())).green()
        }
    }
}

/// Renders minutes in the largest whole unit
fn format_minutes(minutes: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;
    const WEEK: u64 = 7 * DAY;

    let (value, unit) = if minutes >= WEEK && minutes % WEEK == 0 {
        (minutes / WEEK, "week")
    } else if minutes >= DAY && minutes % DAY == 0 {
        (minutes / DAY, "day")
    } else if minutes >= HOUR && minutes % HOUR == 0 {
        (minutes / HOUR, "hour")
    } else {
        (minutes, "minute")
    };

    if value == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(1), "1 minute");
        assert_eq!(format_minutes(90), "90 minutes");
        assert_eq!(format_minutes(720), "12 hours");
        assert_eq!(format_minutes(1440), "1 day");
        assert_eq!(format_minutes(40320), "4 weeks");
        assert_eq!(format_minutes(201600), "20 weeks");
    }

    #[test]
    fn test_format_last_deploy() {
        assert_eq!(format_last_deploy(None), "never");
        assert_eq!(
            format_last_deploy(Some(DateTime::UNIX_EPOCH)),
            "1970-01-01 00:00:00"
        );
    }
}
