use widget_tools::{
    Arguments, ParameterSchema, RegistryResult, ToolRegistry, ToolResponse, ToolResult,
};

pub(super) fn register(registry: &mut ToolRegistry) -> RegistryResult<()> {
    registry.register(
        "ping",
        "Check that the tool server is reachable. Replies with `pong`.",
        ParameterSchema::empty(),
        ping,
    )
}

async fn ping(_args: Arguments) -> ToolResult<ToolResponse> {
    Ok(ToolResponse::text("pong"))
}
