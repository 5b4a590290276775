use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appointment_monitor::config::Config;
use appointment_monitor::utils::parse_local_timestamp;

mod commands;

#[derive(Parser)]
#[command(
    name = "appointment-monitor",
    version,
    about = "Watches Trusted Traveler enrollment centers for open appointment slots",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor locations for available slots
    Ttp {
        /// Comma separated location ids, e.g. 5140,5446
        #[arg(short, long, value_delimiter = ',')]
        location_ids: Vec<u32>,

        /// Seconds between checks when nothing was found (10-3600)
        #[arg(short, long)]
        poll_period: Option<u64>,

        /// Seconds to wait after slots were published (defaults to poll period)
        #[arg(long)]
        backoff_period: Option<u64>,

        /// Only publish slots starting before this local date-time, e.g. 2024-05-01T08:25:30
        #[arg(short, long, value_parser = parse_cutoff)]
        before: Option<NaiveDateTime>,

        /// Publishers, e.g. Log,Webhook=https://hooks.example.com/x|text,Pushover=<user>
        #[arg(long, value_delimiter = ',')]
        publish_to: Vec<String>,

        /// Timestamps listed in a message before eliding to the last one
        #[arg(long)]
        display_limit: Option<usize>,
    },

    /// List known enrollment locations
    Locations {
        /// Case-insensitive filter on name, short name or city
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env()?;
            config
        }
        None => Config::from_env()?,
    };

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("appointment-monitor starting");

    match cli.command {
        Commands::Ttp {
            location_ids,
            poll_period,
            backoff_period,
            before,
            publish_to,
            display_limit,
        } => {
            if !location_ids.is_empty() {
                config.monitor.location_ids = location_ids;
            }
            if let Some(poll_period) = poll_period {
                config.monitor.poll_period_secs = poll_period;
            }
            if backoff_period.is_some() {
                config.monitor.backoff_period_secs = backoff_period;
            }
            if before.is_some() {
                config.monitor.before = before;
            }
            if !publish_to.is_empty() {
                config.monitor.publish_to = publish_to;
            }
            if let Some(display_limit) = display_limit {
                config.monitor.display_limit = display_limit;
            }

            tracing::info!(
                location_ids = ?config.monitor.location_ids,
                poll_period = %config.monitor.poll_period_secs,
                backoff_period = ?config.monitor.backoff_period_secs,
                before = ?config.monitor.before,
                "Starting ttp command"
            );
            commands::ttp(config).await?;
        }

        Commands::Locations { search } => {
            tracing::info!(search = ?search, "Starting locations command");
            commands::locations(config, search).await?;
        }
    }

    tracing::info!("appointment-monitor completed successfully");
    Ok(())
}

fn parse_cutoff(value: &str) -> Result<NaiveDateTime, String> {
    parse_local_timestamp(value).map_err(|e| e.to_string())
}

/// Filter directives used when `RUST_LOG` is unset
///
/// Published messages always stay visible, whatever the configured level.
fn tracing_directives(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("appointment_monitor={level},appointment_monitor::published=info,warn")
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let default_directives = tracing_directives(level, verbose);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_published_messages_survive_quiet_levels() {
        let directives = tracing_directives("warn", false);
        assert_eq!(
            directives,
            "appointment_monitor=warn,appointment_monitor::published=info,warn"
        );
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_verbose_overrides_configured_level() {
        assert!(tracing_directives("error", true).starts_with("appointment_monitor=debug,"));
    }

    #[test]
    fn test_cutoff_argument() {
        assert!(parse_cutoff("2024-05-01T08:25").is_ok());
        assert!(parse_cutoff("tomorrow").is_err());
    }
}
