//! Newline-delimited JSON-RPC 2.0 channel adapter.
//!
//! Each line read from the input is one request. Requests are handled
//! concurrently; replies are serialised by a single writer task so that lines
//! never interleave.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use widget_tools::{DispatchError, Dispatcher, InvocationRequest};

/// JSON-RPC version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol version advertised when the client does not request one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters, unknown tool, or invalid tool arguments.
pub const INVALID_PARAMS: i64 = -32602;
/// A tool handler failed.
pub const INTERNAL_ERROR: i64 = -32603;

const SERVER_NAME: &str = env!("CARGO_PKG_NAME");
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors that terminate the channel loop.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Reading from or writing to the transport failed.
    #[error("channel i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A reply could not be encoded.
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),

    /// The writer task stopped unexpectedly.
    #[error("channel writer stopped: {0}")]
    Writer(String),
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[serde(default)]
    jsonrpc: Option<String>,
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

// An explicit `"id": null` still expects a reply; only a missing id marks a
// notification.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Adapter between a line-oriented transport and the [`Dispatcher`].
#[derive(Clone, Debug)]
pub struct Channel {
    dispatcher: Dispatcher,
}

impl Channel {
    /// Creates a channel that serves the supplied dispatcher.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serves requests on the process's stdin/stdout until stdin closes.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the transport fails.
    pub async fn serve_stdio(&self) -> Result<(), ChannelError> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves requests read from `reader`, writing replies to `writer`, until
    /// the reader reaches end of input.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when reading or writing fails.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ChannelError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        let writer_task = tokio::spawn(write_replies(rx, writer));

        let mut lines = reader.lines();
        let mut in_flight = JoinSet::new();
        while let Some(line) = lines.next_line().await? {
            let channel = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(reply) = channel.handle_line(&line).await {
                    if tx.send(reply).is_err() {
                        debug!("reply dropped: writer has stopped");
                    }
                }
            });

            while let Some(finished) = in_flight.try_join_next() {
                log_join(finished);
            }
        }

        while let Some(finished) = in_flight.join_next().await {
            log_join(finished);
        }
        drop(tx);
        info!("input closed, channel shutting down");

        writer_task
            .await
            .map_err(|err| ChannelError::Writer(err.to_string()))?
    }

    /// Handles one raw input line, returning the reply to send, if any.
    ///
    /// Notifications (requests without an `id`) and blank lines produce no
    /// reply.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "received invalid json");
                return Some(error_reply(Value::Null, PARSE_ERROR, "parse error", None));
            }
        };

        let id_hint = value.get("id").cloned().unwrap_or(Value::Null);
        let request: RpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(err) => {
                return Some(error_reply(
                    id_hint,
                    INVALID_REQUEST,
                    &format!("invalid request: {err}"),
                    None,
                ));
            }
        };

        if request
            .jsonrpc
            .as_deref()
            .is_some_and(|version| version != JSONRPC_VERSION)
        {
            return Some(error_reply(
                id_hint,
                INVALID_REQUEST,
                "unsupported jsonrpc version",
                None,
            ));
        }

        let Some(id) = request.id else {
            debug!(method = %request.method, "notification received");
            return None;
        };

        let reply = match self.handle_method(&request.method, request.params).await {
            Ok(result) => json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result}),
            Err(RpcFailure {
                code,
                message,
                data,
            }) => error_reply(id, code, &message, data),
        };
        Some(reply)
    }

    async fn handle_method(&self, method: &str, params: Value) -> Result<Value, RpcFailure> {
        match method {
            "initialize" => Ok(self.initialize(&params)),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcFailure::new(
                METHOD_NOT_FOUND,
                format!("method `{other}` not found"),
            )),
        }
    }

    fn initialize(&self, params: &Value) -> Value {
        let protocol_version = params
            .get("protocolVersion")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        info!(
            protocol_version,
            tools = self.dispatcher.registry().len(),
            "client initialized"
        );
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {"tools": {}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .dispatcher
            .registry()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.schema().to_json_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcFailure> {
        let CallParams { name, arguments } = serde_json::from_value(params)
            .map_err(|err| RpcFailure::new(INVALID_PARAMS, format!("invalid params: {err}")))?;

        self.dispatcher
            .invoke(InvocationRequest::new(name, arguments))
            .await
            .map(widget_tools::ToolResponse::into_value)
            .map_err(RpcFailure::from)
    }
}

struct RpcFailure {
    code: i64,
    message: String,
    data: Option<Value>,
}

impl RpcFailure {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<DispatchError> for RpcFailure {
    fn from(err: DispatchError) -> Self {
        let code = match err {
            DispatchError::ToolNotFound { .. } | DispatchError::InvalidArguments { .. } => {
                INVALID_PARAMS
            }
            DispatchError::HandlerExecution { .. } => INTERNAL_ERROR,
        };

        let mut data = Map::new();
        data.insert("kind".into(), Value::from(err.kind()));
        data.insert("tool".into(), Value::from(err.tool()));
        if let Some(field) = err.field() {
            data.insert("field".into(), Value::from(field));
        }

        Self {
            code,
            message: err.to_string(),
            data: Some(Value::Object(data)),
        }
    }
}

fn error_reply(id: Value, code: i64, message: &str, data: Option<Value>) -> Value {
    let mut error = json!({"code": code, "message": message});
    if let Some(data) = data {
        error["data"] = data;
    }
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "error": error})
}

async fn write_replies<W>(
    mut rx: mpsc::UnboundedReceiver<Value>,
    mut writer: W,
) -> Result<(), ChannelError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(reply) = rx.recv().await {
        let mut line = serde_json::to_vec(&reply)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(err) = result {
        warn!(error = %err, "request task failed");
    }
}
