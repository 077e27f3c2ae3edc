//! Invocation dispatcher: resolve, validate, execute, normalise.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;
use tracing::{Instrument, debug, info_span, warn};

use crate::ids::InvocationId;
use crate::registry::{ToolContext, ToolError, ToolRegistry, ToolSummary};
use crate::response::ToolResponse;

/// Default upper bound on a single handler execution.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Result alias for dispatcher operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A single incoming tool call.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationRequest {
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Raw JSON arguments as received from the channel.
    pub arguments: Value,
}

impl InvocationRequest {
    /// Creates a new invocation request.
    #[must_use]
    pub fn new(tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Dispatcher tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    call_timeout: Duration,
}

impl DispatchConfig {
    /// Creates a configuration with the supplied per-call timeout.
    #[must_use]
    pub const fn new(call_timeout: Duration) -> Self {
        Self { call_timeout }
    }

    /// Returns the per-call timeout.
    #[must_use]
    pub const fn call_timeout(self) -> Duration {
        self.call_timeout
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_TIMEOUT)
    }
}

/// Executes tool invocations against a frozen registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    config: DispatchConfig,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("call_timeout", &self.config.call_timeout)
            .finish()
    }
}

impl Dispatcher {
    /// Creates a dispatcher over the supplied registry.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> DispatchConfig {
        self.config
    }

    /// Lists the registered tools in registration order.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolSummary> {
        self.registry.list()
    }

    /// Invokes a tool and returns its response envelope.
    ///
    /// The handler runs on its own task so that a panic or a hung handler
    /// only fails this call.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ToolNotFound`] for unregistered names,
    /// [`DispatchError::InvalidArguments`] when the arguments do not satisfy
    /// the tool's schema (the handler is not run), and
    /// [`DispatchError::HandlerExecution`] when the handler fails, panics, or
    /// exceeds the configured timeout.
    pub async fn invoke(&self, request: InvocationRequest) -> DispatchResult<ToolResponse> {
        let invocation_id = InvocationId::random();
        let span = info_span!(
            "tool_call",
            tool = %request.tool_name,
            invocation = %invocation_id
        );

        async move {
            let started = Instant::now();
            let result = self.execute(invocation_id, request).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            match &result {
                Ok(response) => debug!(
                    elapsed_ms,
                    action = response.action_name(),
                    "tool call completed"
                ),
                Err(err) => warn!(elapsed_ms, kind = err.kind(), error = %err, "tool call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        invocation_id: InvocationId,
        request: InvocationRequest,
    ) -> DispatchResult<ToolResponse> {
        let InvocationRequest {
            tool_name,
            arguments,
        } = request;

        let Ok(descriptor) = self.registry.resolve(&tool_name) else {
            return Err(DispatchError::ToolNotFound { name: tool_name });
        };

        let args = descriptor
            .schema()
            .validate(&arguments)
            .map_err(|err| DispatchError::InvalidArguments {
                tool: tool_name.clone(),
                field: err.field,
                reason: err.reason,
            })?;

        let handler = descriptor.handler();
        let ctx = ToolContext::new(invocation_id, Arc::clone(&self.registry));
        let task = tokio::spawn(async move { handler.call(&ctx, args).await });
        let abort = task.abort_handle();

        let timeout = self.config.call_timeout;
        let outcome = match tokio::time::timeout(timeout, task).await {
            Ok(joined) => joined,
            Err(_) => {
                abort.abort();
                return Err(DispatchError::HandlerExecution {
                    tool: tool_name,
                    cause: HandlerFailure::TimedOut(timeout),
                });
            }
        };

        match outcome {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(ToolError::InvalidArgument { field, reason })) => {
                Err(DispatchError::InvalidArguments {
                    tool: tool_name,
                    field,
                    reason,
                })
            }
            Ok(Err(ToolError::Execution { reason })) => Err(DispatchError::HandlerExecution {
                tool: tool_name,
                cause: HandlerFailure::Failed { reason },
            }),
            Err(join_err) => {
                let cause = if join_err.is_panic() {
                    HandlerFailure::Panicked
                } else {
                    HandlerFailure::Failed {
                        reason: "handler task was cancelled".into(),
                    }
                };
                Err(DispatchError::HandlerExecution {
                    tool: tool_name,
                    cause,
                })
            }
        }
    }
}

/// Root cause of a [`DispatchError::HandlerExecution`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerFailure {
    /// The handler returned an error.
    #[error("{reason}")]
    Failed {
        /// Reason reported by the handler.
        reason: String,
    },

    /// The handler panicked.
    #[error("handler panicked")]
    Panicked,

    /// The handler did not complete within the configured timeout.
    #[error("handler timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Per-call failures surfaced to the channel.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// No tool is registered under the requested name.
    #[error("tool `{name}` not found")]
    ToolNotFound {
        /// Requested tool name.
        name: String,
    },

    /// An argument is missing, mistyped, or out of range.
    #[error("invalid arguments for `{tool}`: parameter `{field}`: {reason}")]
    InvalidArguments {
        /// Tool being invoked.
        tool: String,
        /// Offending parameter.
        field: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// The handler failed while executing.
    #[error("tool `{tool}` failed: {cause}")]
    HandlerExecution {
        /// Tool being invoked.
        tool: String,
        /// Underlying failure.
        #[source]
        cause: HandlerFailure,
    },
}

impl DispatchError {
    /// Returns a stable machine-readable error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ToolNotFound { .. } => "tool_not_found",
            Self::InvalidArguments { .. } => "invalid_arguments",
            Self::HandlerExecution { .. } => "handler_execution",
        }
    }

    /// Returns the tool name the failure relates to.
    #[must_use]
    pub fn tool(&self) -> &str {
        match self {
            Self::ToolNotFound { name } => name,
            Self::InvalidArguments { tool, .. } | Self::HandlerExecution { tool, .. } => tool,
        }
    }

    /// Returns the offending parameter, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidArguments { field, .. } => Some(field),
            _ => None,
        }
    }
}
