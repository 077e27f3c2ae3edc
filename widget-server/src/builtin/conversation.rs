use widget_tools::{
    Arguments, ParameterSchema, RegistryResult, ToolRegistry, ToolResponse, ToolResult,
};

/// Instruction returned by `conversational_fallback`.
pub const CONVERSATIONAL_INSTRUCTION: &str = "No tool is needed for this message. \
Reply to the user directly and conversationally, using markdown when it helps, \
and stay on topic. Do not mention tools or function calls in the reply.";

pub(super) fn register(registry: &mut ToolRegistry) -> RegistryResult<()> {
    registry.register(
        "conversational_fallback",
        "Use when the user is chatting or asking something none of the other tools can \
         handle. Returns instructions for answering conversationally.",
        ParameterSchema::empty(),
        conversational_fallback,
    )
}

async fn conversational_fallback(_args: Arguments) -> ToolResult<ToolResponse> {
    Ok(ToolResponse::text(CONVERSATIONAL_INSTRUCTION))
}
