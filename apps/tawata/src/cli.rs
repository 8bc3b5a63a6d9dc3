//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;
use tawata_types::ColorChoice;

/// tawata - check that installed npm dependencies limit their published files
#[derive(Parser)]
#[command(name = "tawata")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check that installed npm dependencies limit their published files")]
#[command(
    long_about = "Scans ./node_modules for packages whose package.json has no `files` \
                  whitelist, checks the upstream GitHub repository for a whitelist or \
                  .npmignore, and opens an issue upstream when neither exists."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub scan: ScanArgs,
}

/// Global arguments
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Scan behaviour overrides
#[derive(Parser)]
pub struct ScanArgs {
    /// GitHub API token (overrides TAWATA_TOKEN / GITHUB_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Evaluate and report, but never open issues
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the remediation stage entirely
    #[arg(long, conflicts_with = "dry_run")]
    pub no_remediate: bool,
}
