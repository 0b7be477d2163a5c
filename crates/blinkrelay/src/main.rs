//! blinkrelay - Blink camera snapshot poller.
//!
//! Authenticates to the Blink cloud, fetches camera thumbnails on an
//! interval, and uploads them to Supabase Storage for the cameras page.
//!
//! Usage:
//!   First run (2FA setup):  blinkrelay --setup [--pin <code>]
//!   Daemon mode:            blinkrelay
//!   Single poll:            blinkrelay --once

mod cli;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blinkrelay_core::{
    build_poller, run_daemon, run_once, run_setup, BlinkClient, Config, CredentialStore,
};
use cli::Mode;

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes buffered lines when dropped.
fn init_tracing() -> WorkerGuard {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (writer, guard) = tracing_appender::non_blocking(io::stdout());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Configuration errors are reported before any logging or network activity
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing();
    let mode = Mode::from_args(std::env::args().skip(1));

    let result = tokio::select! {
        result = run(mode, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(mode: Mode, config: &Config) -> Result<()> {
    let store = CredentialStore::new(&config.credential_file);
    let cloud = BlinkClient::new()?;

    match mode {
        Mode::Setup { pin } => {
            run_setup(cloud, config.credentials.clone(), &store, pin.as_deref()).await?;
        }
        Mode::Once => {
            let mut poller = build_poller(cloud, config, &store)?;
            let report = run_once(&mut poller, &store).await?;
            info!(
                uploaded = report.uploaded,
                failed = report.failed_uploads,
                skipped = report.skipped,
                "Single poll complete"
            );
        }
        Mode::Daemon => {
            info!("Blink relay starting. Interval: {}s", config.poll_interval_secs);
            let mut poller = build_poller(cloud, config, &store)?;
            run_daemon(&mut poller, &store, config.poll_interval()).await?;
        }
    }
    Ok(())
}
