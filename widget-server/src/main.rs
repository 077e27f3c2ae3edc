//! Stdio entry point: load the widget catalog, build the tool registry and
//! serve JSON-RPC tool calls until stdin closes.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use widget_server::{Channel, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(&config.log_level);

    let dispatcher = widget_server::start(&config)
        .await
        .with_context(|| format!("failed to start with catalog {}", config.catalog.display()))?;

    info!(
        tools = dispatcher.registry().len(),
        timeout_ms = config.call_timeout_ms,
        "serving tools over stdio"
    );
    Channel::new(dispatcher).serve_stdio().await?;
    Ok(())
}

// stdout carries the protocol, so logs go to stderr.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
