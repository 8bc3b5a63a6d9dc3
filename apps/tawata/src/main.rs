//! tawata - npm dependency `files` whitelist checker
//!
//! Scans the installed dependency tree of the current project and opens an
//! issue on upstream GitHub repositories that publish everything.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::Cli;
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use std::process::ExitCode;
use tawata_config::Config;
use tawata_events::EventReceiver;
use tawata_types::{ColorChoice, OutputFormat, ScanSummary};
use tokio::select;
use tracing::{error, info, Instrument};
use uuid::Uuid;

/// Some dependencies could not be fully evaluated
const EXIT_PARTIAL: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    match run(cli).await {
        Ok(summary) if summary.has_failures() => ExitCode::from(EXIT_PARTIAL),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<ScanSummary, CliError> {
    info!("Starting tawata v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli);
    config.validate()?;

    let color = config.general.color;
    let json_output = config.general.default_output == OutputFormat::Json;
    let renderer = OutputRenderer::new(json_output, color);

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, json_output);

    let (event_sender, event_receiver) = tawata_events::channel();
    let span = tracing::info_span!("scan", run_id = %Uuid::new_v4());
    let scan = tawata_audit::run_scan(&config, Some(event_sender)).instrument(span);

    let summary = execute_with_events(scan, event_receiver, &mut event_handler).await?;

    renderer.render_summary(&summary)?;

    info!("Scan finished");
    Ok(summary)
}

/// Drive the scan while draining its events
async fn execute_with_events<F>(
    scan: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<ScanSummary, CliError>
where
    F: std::future::Future<Output = Result<ScanSummary, tawata_errors::Error>>,
{
    let mut scan = std::pin::pin!(scan);

    loop {
        select! {
            result = &mut scan => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result.map_err(CliError::from);
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for the scan to finish */ }
                }
            }
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(color) = cli.global.color {
        config.general.color = color;
    }
    if cli.global.json {
        config.general.default_output = OutputFormat::Json;
    }
    if let Some(token) = &cli.scan.token {
        config.github.token = Some(token.clone());
    }
    if cli.scan.dry_run {
        config.remediation.dry_run = true;
    }
    if cli.scan.no_remediate {
        config.remediation.enabled = false;
    }
}

/// Initialize tracing/logging
///
/// Logs always go to stderr so stdout carries only the rendered summary.
fn init_tracing(json_mode: bool, debug_enabled: bool) {
    let default_filter = if debug_enabled {
        "info,tawata=debug"
    } else if json_mode {
        "info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .init();
    }
}
