use widget_tools::{
    Arguments, ParamSpec, ParameterSchema, RegistryResult, ToolError, ToolRegistry, ToolResponse,
    ToolResult,
};

pub(super) fn register(registry: &mut ToolRegistry) -> RegistryResult<()> {
    let schema = ParameterSchema::empty()
        .param(ParamSpec::integer("a").describe("First addend"))
        .param(ParamSpec::integer("b").describe("Second addend"));
    registry.register("add", "Add two integers and return their sum.", schema, add)
}

async fn add(args: Arguments) -> ToolResult<ToolResponse> {
    let sum = args
        .integer("a")?
        .checked_add(args.integer("b")?)
        .ok_or_else(|| ToolError::invalid_argument("b", "sum is out of the supported range"))?;
    Ok(ToolResponse::text(sum.to_string()))
}
