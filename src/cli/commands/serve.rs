use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use crate::api::{HttpTransport, SwapClient};
use crate::config::Config;
use crate::server::{router, AppState};

#[derive(Args, Default)]
pub struct ServeArgs {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let host = args.host.as_deref().unwrap_or(&config.server.host);
    let port = args.port.unwrap_or(config.server.port);

    if config.api_key().is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; swap requests will fail until it is");
    }

    let client = SwapClient::from_config(config, Arc::new(HttpTransport));
    let app = router(AppState::new(client));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
