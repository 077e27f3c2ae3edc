//! Runtime registry for tool descriptors.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::InvocationId;
use crate::response::ToolResponse;
use crate::schema::{Arguments, ParameterSchema};

/// Result alias for tool handler operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Per-call context passed to tool handlers.
#[derive(Clone, Debug)]
pub struct ToolContext {
    invocation_id: InvocationId,
    registry: Arc<ToolRegistry>,
}

impl ToolContext {
    /// Creates a context for a single invocation.
    #[must_use]
    pub fn new(invocation_id: InvocationId, registry: Arc<ToolRegistry>) -> Self {
        Self {
            invocation_id,
            registry,
        }
    }

    /// Returns the identifier of the current invocation.
    #[must_use]
    pub const fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Returns the registry the invoked tool belongs to.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

/// Trait implemented by tool handlers.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Executes the tool with validated arguments.
    async fn call(&self, ctx: &ToolContext, args: Arguments) -> ToolResult<ToolResponse>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Send + Sync + Fn(Arguments) -> Fut,
    Fut: Future<Output = ToolResult<ToolResponse>> + Send,
{
    async fn call(&self, _ctx: &ToolContext, args: Arguments) -> ToolResult<ToolResponse> {
        (self)(args).await
    }
}

/// Immutable description of a registered tool.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    schema: ParameterSchema,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, empty when none was supplied.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameter schema.
    #[must_use]
    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Returns a shared handle to the handler.
    #[must_use]
    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Name and description pair returned by [`ToolRegistry::list`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    /// Tool name.
    pub name: String,
    /// Tool description as registered.
    pub description: String,
}

/// Registry that stores tools in registration order.
///
/// Registration requires `&mut self`; once the registry is moved behind an
/// `Arc` it is read-only and shared across invocations without locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.names().collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTool`] if the name is already present
    /// and [`RegistryError::InvalidDescriptor`] if the name is blank or the
    /// schema declares a parameter twice.
    pub fn register<H>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        schema: ParameterSchema,
        handler: H,
    ) -> RegistryResult<()>
    where
        H: ToolHandler + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidDescriptor {
                reason: "tool name cannot be empty".into(),
            });
        }
        if let Some(param) = schema.duplicate_param() {
            return Err(RegistryError::InvalidDescriptor {
                reason: format!("tool `{name}` declares parameter `{param}` more than once"),
            });
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool { name });
        }

        self.index.insert(name.clone(), self.tools.len());
        self.tools.push(ToolDescriptor {
            name,
            description: description.into(),
            schema,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Returns the descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownTool`] when no such tool exists.
    pub fn resolve(&self, name: &str) -> RegistryResult<&ToolDescriptor> {
        self.index
            .get(name)
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| RegistryError::UnknownTool {
                name: name.to_owned(),
            })
    }

    /// Lists every tool in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .map(|tool| ToolSummary {
                name: tool.name.clone(),
                description: tool.description.clone(),
            })
            .collect()
    }

    /// Iterates over the registered descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// Iterates over the registered tool names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(ToolDescriptor::name)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` when no tool has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Errors produced while building or querying the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Tool descriptor failed validation.
    #[error("invalid tool descriptor: {reason}")]
    InvalidDescriptor {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool name collided with an existing registration.
    #[error("tool `{name}` is already registered")]
    DuplicateTool {
        /// Name of the offending tool.
        name: String,
    },

    /// Requested tool does not exist.
    #[error("tool `{name}` is not registered")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },
}

/// Errors returned by tool handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// An argument passed schema validation but is semantically invalid.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        field: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Tool execution failed.
    #[error("tool execution failed: {reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },
}

impl ToolError {
    /// Creates an invalid-argument error for `field`.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }
}
