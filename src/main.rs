use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use faceswap::cli::{commands, Cli, Commands};
use faceswap::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(args, &config).await?,
        Some(Commands::Swap(args)) => commands::swap::run(args, &config).await?,
        Some(Commands::Config(args)) => commands::config::run(args, &mut config)?,
        None => commands::serve::run(Default::default(), &config).await?,
    }

    Ok(())
}
