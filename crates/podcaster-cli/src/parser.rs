//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Interruptible AI podcast server.
#[derive(Debug, Parser)]
#[command(name = "podcaster")]
#[command(about = "Stream AI-generated podcasts that listeners can interrupt")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset.
    pub const fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
