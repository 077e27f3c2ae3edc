//! Uniform result envelope returned by every tool.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::registry::{ToolError, ToolResult};

/// Result of a tool invocation as surfaced to the calling agent.
///
/// Informational tools only populate `content`. Action tools additionally
/// name an action for the consuming UI and carry its structured arguments; the
/// text and the arguments describe the same event.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ToolResponse {
    content: String,
    #[serde(rename = "function_name")]
    action_name: String,
    #[serde(rename = "args")]
    action_args: Map<String, Value>,
}

impl ToolResponse {
    /// Creates an informational response with no action attached.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            action_name: String::new(),
            action_args: Map::new(),
        }
    }

    /// Creates a response instructing the caller to perform `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Execution`] when `name` is blank, since the
    /// arguments would otherwise travel without an action to apply them to.
    pub fn action(
        content: impl Into<String>,
        name: impl Into<String>,
        args: Map<String, Value>,
    ) -> ToolResult<Self> {
        let action_name = name.into();
        if action_name.trim().is_empty() {
            return Err(ToolError::execution("action name cannot be empty"));
        }
        Ok(Self {
            content: content.into(),
            action_name,
            action_args: args,
        })
    }

    /// Returns the human-facing content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the action name, empty when no action is attached.
    #[must_use]
    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    /// Returns the action arguments, empty when no action is attached.
    #[must_use]
    pub fn action_args(&self) -> &Map<String, Value> {
        &self.action_args
    }

    /// Returns `true` when the response carries an action.
    #[must_use]
    pub fn is_action(&self) -> bool {
        !self.action_name.is_empty()
    }

    /// Converts the envelope into its wire representation.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut map = Map::with_capacity(3);
        map.insert("content".into(), Value::String(self.content));
        map.insert("function_name".into(), Value::String(self.action_name));
        map.insert("args".into(), Value::Object(self.action_args));
        Value::Object(map)
    }
}
