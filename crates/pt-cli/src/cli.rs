//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::supports::SupportsArgs;
use crate::commands::track::TrackArgs;

/// Package tracker.
///
/// Queries every postal service that recognizes a tracking number and prints
/// one merged, newest-first history.
#[derive(Debug, Parser)]
#[command(name = "pt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track one or more packages.
    Track(TrackArgs),

    /// List the providers that accept a tracking number.
    Supports(SupportsArgs),
}
