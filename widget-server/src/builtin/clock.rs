use chrono::Local;
use widget_tools::{
    Arguments, ParameterSchema, RegistryResult, ToolRegistry, ToolResponse, ToolResult,
};

/// `chrono` pattern used by `get_datetime`, e.g. `2024-03-09 14:05:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(super) fn register(registry: &mut ToolRegistry) -> RegistryResult<()> {
    registry.register(
        "get_datetime",
        "Get the current local date and time, formatted as `YYYY-MM-DD HH:MM:SS`.",
        ParameterSchema::empty(),
        get_datetime,
    )
}

async fn get_datetime(_args: Arguments) -> ToolResult<ToolResponse> {
    let now = Local::now().format(DATETIME_FORMAT).to_string();
    Ok(ToolResponse::text(now))
}
