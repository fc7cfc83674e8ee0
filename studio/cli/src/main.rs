//! Studio CLI - Non-interactive shell for podcast-studio
//!
//! Submits generation jobs and watches them to completion from the command
//! line. All job logic lives in `studio-core`; this binary only parses
//! arguments, prints updates, and maps outcomes to exit codes.
//!
//! # Usage
//!
//! ```bash
//! # Generate and watch until done
//! studio generate "The history of the printing press" --color cyan
//!
//! # Submit only, print the job ID
//! studio generate "Deep sea creatures" --detach
//!
//! # Watch an existing job, then fetch the artifacts
//! studio watch 3f2a9c1e --download ./out
//!
//! # Verbose logging
//! RUST_LOG=debug studio list
//! ```
//!
//! # Exit Codes
//!
//! - `0`: success
//! - `1`: submission failed, job failed, or a status query failed
//! - `130`: interrupted with Ctrl-C

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use studio_core::config::{self, ConfigOverrides};

/// Studio - generate podcast episodes from a topic
#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "STUDIO_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Generation service base URL
    #[arg(short = 'u', long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Delay between status queries, in milliseconds
    #[arg(long, value_name = "MS", global = true)]
    poll_interval_ms: Option<u64>,

    /// Stop watching after this many seconds (0 = never)
    #[arg(long, value_name = "SECS", global = true)]
    max_watch_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "STUDIO_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a topic and watch the job until it finishes
    Generate {
        /// What the episode is about
        topic: String,

        /// Waveform color: a preset name or #RRGGBB
        #[arg(long, value_name = "COLOR")]
        color: Option<String>,

        /// Print the job ID and exit without watching
        #[arg(short = 'd', long, conflicts_with = "download")]
        detach: bool,

        /// Download the finished audio and video into this directory
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
    },
    /// Show the current status of a job
    Status {
        /// Job ID
        job_id: String,
    },
    /// Watch an existing job until it finishes
    Watch {
        /// Job ID
        job_id: String,

        /// Download the finished audio and video into this directory
        #[arg(long, value_name = "DIR")]
        download: Option<PathBuf>,
    },
    /// List all jobs known to the service
    List,
    /// Delete a job and its files
    Delete {
        /// Job ID
        job_id: String,
    },
    /// Check whether the service is reachable
    Health,
    /// List the waveform color presets
    Colors,
}

/// Initialize logging with the specified level
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("studio={level},studio_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config_path = args.config.clone().or_else(config::default_config_path);
    let mut studio_config = config::load_config_from_path(config_path)
        .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.base_url {
        overrides = overrides.with_base_url(url);
    }
    if let Some(ms) = args.poll_interval_ms {
        overrides = overrides.with_poll_interval_ms(ms);
    }
    if let Some(secs) = args.max_watch_secs {
        overrides = overrides.with_max_watch_secs(secs);
    }
    overrides.apply(&mut studio_config);
    studio_config
        .validate()
        .context("Invalid configuration")?;

    debug!(
        source = %studio_config.source(),
        base_url = %studio_config.service.base_url,
        "Configuration loaded"
    );

    let client = commands::connect(&studio_config)?;

    match args.command {
        Command::Generate {
            topic,
            color,
            detach,
            download,
        } => {
            let color = color.unwrap_or_else(|| studio_config.color.clone());
            commands::generate(&client, &topic, &color, detach, download.as_deref()).await
        }
        Command::Status { job_id } => commands::status(&client, job_id).await,
        Command::Watch { job_id, download } => {
            commands::watch(&client, job_id, download.as_deref()).await
        }
        Command::List => commands::list(&client).await,
        Command::Delete { job_id } => commands::delete(&client, job_id).await,
        Command::Health => Ok(commands::health(&client).await),
        Command::Colors => Ok(commands::colors()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let args = Args::try_parse_from([
            "studio",
            "--base-url",
            "http://studio.local:8000",
            "generate",
            "Space Exploration",
            "--color",
            "blue",
        ])
        .unwrap();

        assert_eq!(args.base_url.as_deref(), Some("http://studio.local:8000"));
        match args.command {
            Command::Generate {
                topic,
                color,
                detach,
                download,
            } => {
                assert_eq!(topic, "Space Exploration");
                assert_eq!(color.as_deref(), Some("blue"));
                assert!(!detach);
                assert!(download.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_detach_conflicts_with_download() {
        let result = Args::try_parse_from([
            "studio", "generate", "Volcanoes", "--detach", "--download", "out",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["studio", "watch", "abc123", "--poll-interval-ms", "500"])
                .unwrap();
        assert_eq!(args.poll_interval_ms, Some(500));
        assert!(matches!(args.command, Command::Watch { ref job_id, .. } if job_id == "abc123"));
    }
}
