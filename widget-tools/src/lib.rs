//! Tool registry and invocation contract for the widget tool server.
//!
//! Tools are registered once at startup into a [`ToolRegistry`], frozen behind
//! an `Arc`, and executed through the [`Dispatcher`], which validates arguments
//! against each tool's [`ParameterSchema`] and hands back a uniform
//! [`ToolResponse`] envelope.

#![warn(missing_docs, clippy::pedantic)]

pub mod dispatch;
mod ids;
pub mod registry;
pub mod response;
pub mod schema;

pub use dispatch::{
    DEFAULT_CALL_TIMEOUT, DispatchConfig, DispatchError, DispatchResult, Dispatcher, HandlerFailure,
    InvocationRequest,
};
pub use ids::InvocationId;
pub use registry::{
    RegistryError, RegistryResult, ToolContext, ToolDescriptor, ToolError, ToolHandler,
    ToolRegistry, ToolResult, ToolSummary,
};
pub use response::ToolResponse;
pub use schema::{ArgumentError, Arguments, ParamSpec, ParamType, ParameterSchema};
