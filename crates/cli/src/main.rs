//! hapticsctl - Effect dispatch CLI
//!
//! Probe haptic devices, play test effects, and run the dispatcher against
//! decoded telemetry lines on stdin.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hapticsctl")]
#[command(about = "Effect dispatch CLI - probe haptic devices and drive them from telemetry")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe rumble device slots and report what answered
    Probe {
        /// A single slot 0-3; omit to scan all four
        #[arg(long)]
        slot: Option<u8>,
    },

    /// Play a test effect on a probed device, continuous then pulsed
    Test {
        /// Device slot 0-3
        #[arg(long, default_value_t = 0)]
        slot: u8,

        /// Left motor level 0.0-1.0
        #[arg(long, default_value_t = 1.0)]
        left: f64,

        /// Right motor level 0.0-1.0
        #[arg(long, default_value_t = 1.0)]
        right: f64,

        /// Continuous hold in milliseconds
        #[arg(long, default_value_t = 500)]
        duration_ms: i32,

        /// Intensity gain 0.0-1.0
        #[arg(long, default_value_t = 1.0)]
        gain: f64,
    },

    /// Run the dispatcher: read decoded telemetry as JSON lines on stdin
    Run {
        /// Path to the settings file
        #[arg(long, default_value = "settings.json")]
        settings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hapticsctl={log_level},edhaptics={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Probe { slot } => commands::probe(slot),
        Commands::Test {
            slot,
            left,
            right,
            duration_ms,
            gain,
        } => commands::test_effect(slot, left, right, duration_ms, gain).await,
        Commands::Run { settings } => commands::run(&settings).await,
    }
}
