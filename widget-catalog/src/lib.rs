//! Static widget catalog for the widget tool server.
//!
//! The catalog is read once at process start and is read-only afterwards. Any
//! failure to load it is fatal: the server must not serve calls without one.

#![warn(missing_docs, clippy::pedantic)]

mod catalog;
mod error;

/// Catalog types and loaders.
pub use catalog::{WidgetCatalog, WidgetCatalogEntry};
/// Error type and result alias for catalog loading.
pub use error::{CatalogError, CatalogResult};
