use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use widget_catalog::WidgetCatalog;
use widget_server::{Channel, ServerConfig, StartupError, dispatcher_for};
use widget_tools::DispatchConfig;

fn channel() -> Channel {
    let catalog = WidgetCatalog::from_names(["clock", "note"]).unwrap();
    Channel::new(dispatcher_for(&catalog, DispatchConfig::default()).unwrap())
}

/// Writes `requests` one per line, closes the input, and collects every reply.
async fn exchange(requests: &[Value]) -> Vec<Value> {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);

    let serve = tokio::spawn(async move {
        channel()
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    for request in requests {
        let mut line = serde_json::to_vec(request).unwrap();
        line.push(b'\n');
        client.write_all(&line).await.unwrap();
    }
    client.shutdown().await.unwrap();

    serve.await.unwrap().unwrap();

    let mut replies = Vec::new();
    let mut lines = BufReader::new(client).lines();
    while let Some(line) = lines.next_line().await.unwrap() {
        replies.push(serde_json::from_str(&line).unwrap());
    }
    replies
}

fn reply_for(replies: &[Value], id: i64) -> &Value {
    replies
        .iter()
        .find(|reply| reply["id"] == id)
        .unwrap_or_else(|| panic!("no reply for id {id}"))
}

#[tokio::test]
async fn lists_and_calls_tools() {
    let replies = exchange(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "v1"}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "add", "arguments": {"a": 2, "b": 3}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {"name": "add_widget", "arguments": {
            "widget_name": "clock", "column_index": 1, "row_index": 1, "column_span": 2, "row_span": 1
        }}}),
    ])
    .await;

    assert_eq!(replies.len(), 4);

    let tools = reply_for(&replies, 2)["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        vec![
            "ping",
            "add",
            "get_datetime",
            "list_tools",
            "conversational_fallback",
            "add_widget"
        ]
    );
    let widget_schema = &tools[5]["inputSchema"];
    assert_eq!(
        widget_schema["properties"]["widget_name"]["enum"],
        json!(["clock", "note"])
    );

    assert_eq!(
        reply_for(&replies, 3)["result"],
        json!({"content": "5", "function_name": "", "args": {}})
    );

    let widget = &reply_for(&replies, 4)["result"];
    assert_eq!(widget["function_name"], "addWidget");
    assert_eq!(
        widget["args"],
        json!({"widget_name": "clock", "column_index": 1, "row_index": 1, "column_span": 2, "row_span": 1})
    );
}

#[tokio::test]
async fn per_call_errors_do_not_stop_the_channel() {
    let replies = exchange(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "nonexistent_tool", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "add", "arguments": {"a": "x", "b": 2}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "ping"}}),
    ])
    .await;

    let not_found = &reply_for(&replies, 1)["error"];
    assert_eq!(not_found["data"]["kind"], "tool_not_found");
    assert_eq!(not_found["data"]["tool"], "nonexistent_tool");

    let invalid = &reply_for(&replies, 2)["error"];
    assert_eq!(invalid["data"]["kind"], "invalid_arguments");
    assert_eq!(invalid["data"]["field"], "a");

    assert_eq!(reply_for(&replies, 3)["result"]["content"], "pong");
}

#[tokio::test]
async fn missing_catalog_aborts_startup() {
    let mut path = std::env::temp_dir();
    path.push(format!("missing-catalog-{}.json", uuid::Uuid::new_v4()));
    let config = ServerConfig {
        catalog: path,
        call_timeout_ms: 1_000,
        log_level: "info".into(),
    };

    let err = widget_server::start(&config).await.unwrap_err();
    assert!(matches!(err, StartupError::Catalog(_)));
}

#[tokio::test]
async fn starts_from_catalog_file() {
    let mut path = std::env::temp_dir();
    path.push(format!("catalog-{}.json", uuid::Uuid::new_v4()));
    tokio::fs::write(&path, r#"[{"name": "clock"}, "note"]"#)
        .await
        .unwrap();
    let config = ServerConfig {
        catalog: path.clone(),
        call_timeout_ms: 1_000,
        log_level: "info".into(),
    };

    let dispatcher = widget_server::start(&config).await.unwrap();
    let description = dispatcher
        .registry()
        .resolve("add_widget")
        .unwrap()
        .description()
        .to_owned();
    assert!(description.contains("clock, note"));

    tokio::fs::remove_file(&path).await.unwrap();
}
