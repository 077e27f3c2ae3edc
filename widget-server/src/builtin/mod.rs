//! Built-in tool set exposed to the agent.
//!
//! [`build_registry`] is run once at startup. The `add_widget` description is
//! rendered from the catalog at that point and never refreshed.

mod arithmetic;
mod clock;
mod conversation;
mod listing;
mod ping;
mod widget;

use widget_catalog::WidgetCatalog;
use widget_tools::{RegistryResult, ToolRegistry};

pub use clock::DATETIME_FORMAT;
pub use conversation::CONVERSATIONAL_INSTRUCTION;
pub use widget::{ADD_WIDGET_ACTION, GRID_SIZE, WidgetPlacement, describe_add_widget};

/// Builds the registry holding every built-in tool, in listing order.
///
/// # Errors
///
/// Returns [`widget_tools::RegistryError`] if two tools collide on a name.
pub fn build_registry(catalog: &WidgetCatalog) -> RegistryResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    ping::register(&mut registry)?;
    arithmetic::register(&mut registry)?;
    clock::register(&mut registry)?;
    listing::register(&mut registry)?;
    conversation::register(&mut registry)?;
    widget::register(&mut registry, catalog)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_builtins_in_order() {
        let catalog = WidgetCatalog::from_names(["clock", "note"]).unwrap();
        let registry = build_registry(&catalog).unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "ping",
                "add",
                "get_datetime",
                "list_tools",
                "conversational_fallback",
                "add_widget",
            ]
        );
    }
}
