//! CLI entry point.

use clap::Parser;
use podcaster_cli::{Cli, Commands, serve};
use podcaster_core::DEFAULT_VOICES;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads its `env` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();

    match cli.command {
        Commands::Serve(args) => serve::execute(args).await,
        Commands::Voices => {
            for voice in DEFAULT_VOICES {
                println!("{voice}");
            }
            Ok(())
        }
    }
}
