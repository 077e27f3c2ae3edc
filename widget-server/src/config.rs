//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use widget_tools::DispatchConfig;

/// Runtime configuration for the widget tool server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "widget-server",
    version,
    about = "Serve dashboard widget tools to an agent over stdio"
)]
pub struct ServerConfig {
    /// Path to the JSON widget catalog.
    #[arg(long, env = "WIDGET_CATALOG", value_name = "PATH")]
    pub catalog: PathBuf,

    /// Upper bound on a single tool call, in milliseconds.
    #[arg(
        long,
        env = "WIDGET_CALL_TIMEOUT_MS",
        default_value_t = 5_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub call_timeout_ms: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "WIDGET_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    /// Returns the dispatcher configuration derived from these settings.
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig::new(Duration::from_millis(self.call_timeout_ms))
    }
}
