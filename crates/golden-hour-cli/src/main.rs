//! `golden-hour`: ranks receiving hospitals and replays rescues from a fleet file.
//!
//! Log verbosity follows `RUST_LOG` (default `info`); command output goes to
//! stdout, logs to stderr.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use golden_hour_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rescue(rescue_cmd) => {
            golden_hour_cli::rescue::execute(rescue_cmd).await?;
        }
        Commands::Version => {
            println!("golden-hour {}", env!("CARGO_PKG_VERSION"));
            println!("Core version: {}", golden_hour_core::VERSION);
        }
    }

    Ok(())
}
