//! Stdio tool server exposing dashboard widget tools to an agent runtime.
//!
//! Startup loads the widget catalog, builds the frozen tool registry, and
//! hands a [`Dispatcher`] to the stdio [`Channel`].

#![warn(missing_docs, clippy::pedantic)]

pub mod builtin;
pub mod channel;
pub mod config;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use widget_catalog::{CatalogError, WidgetCatalog};
use widget_tools::{DispatchConfig, Dispatcher, RegistryError};

pub use channel::{Channel, ChannelError};
pub use config::ServerConfig;

/// Errors that abort process initialisation.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The widget catalog is missing or corrupt.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The built-in tools could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builds a dispatcher over the built-in tools for an already loaded catalog.
///
/// # Errors
///
/// Returns [`StartupError::Registry`] if the built-in tool set is inconsistent.
pub fn dispatcher_for(
    catalog: &WidgetCatalog,
    config: DispatchConfig,
) -> Result<Dispatcher, StartupError> {
    let registry = builtin::build_registry(catalog)?;
    info!(tools = registry.len(), widgets = catalog.len(), "tool registry built");
    Ok(Dispatcher::new(Arc::new(registry), config))
}

/// Loads the catalog named in `config` and builds the dispatcher.
///
/// # Errors
///
/// Returns [`StartupError::Catalog`] when the catalog cannot be loaded and
/// [`StartupError::Registry`] if registration fails.
pub async fn start(config: &ServerConfig) -> Result<Dispatcher, StartupError> {
    let catalog = WidgetCatalog::load(&config.catalog).await?;
    dispatcher_for(&catalog, config.dispatch_config())
}
