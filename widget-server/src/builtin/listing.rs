use async_trait::async_trait;
use widget_tools::{
    Arguments, ParameterSchema, RegistryResult, ToolContext, ToolHandler, ToolRegistry,
    ToolResponse, ToolResult,
};

pub(super) fn register(registry: &mut ToolRegistry) -> RegistryResult<()> {
    registry.register(
        "list_tools",
        "List every tool this server provides, with its description.",
        ParameterSchema::empty(),
        ListTools,
    )
}

/// Reads the frozen registry through the call context, so the listing always
/// includes itself and never sees a half-built registry.
struct ListTools;

#[async_trait]
impl ToolHandler for ListTools {
    async fn call(&self, ctx: &ToolContext, _args: Arguments) -> ToolResult<ToolResponse> {
        Ok(ToolResponse::text(render_listing(ctx.registry())))
    }
}

fn render_listing(registry: &ToolRegistry) -> String {
    let mut listing = String::from("Available tools:");
    for tool in registry.list() {
        listing.push_str("\n- ");
        listing.push_str(&tool.name);
        listing.push(':');
        if !tool.description.is_empty() {
            listing.push(' ');
            listing.push_str(&tool.description);
        }
    }
    listing
}
