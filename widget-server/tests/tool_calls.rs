use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{Value, json};
use widget_catalog::WidgetCatalog;
use widget_server::builtin::{
    ADD_WIDGET_ACTION, CONVERSATIONAL_INSTRUCTION, DATETIME_FORMAT, build_registry,
    describe_add_widget,
};
use widget_server::dispatcher_for;
use widget_tools::{DispatchConfig, DispatchError, Dispatcher, InvocationRequest};

fn catalog() -> WidgetCatalog {
    WidgetCatalog::from_names(["clock", "note"]).unwrap()
}

fn dispatcher() -> Dispatcher {
    dispatcher_for(&catalog(), DispatchConfig::default()).unwrap()
}

async fn call(name: &str, arguments: Value) -> Result<widget_tools::ToolResponse, DispatchError> {
    dispatcher()
        .invoke(InvocationRequest::new(name, arguments))
        .await
}

#[tokio::test]
async fn ping_acknowledges() {
    let response = call("ping", json!({})).await.unwrap();
    assert_eq!(response.content(), "pong");
    assert!(!response.is_action());
}

#[tokio::test]
async fn add_returns_decimal_sum() {
    let response = call("add", json!({"a": 2, "b": 3})).await.unwrap();
    assert_eq!(response.content(), "5");
    assert_eq!(response.action_name(), "");
    assert!(response.action_args().is_empty());
}

#[tokio::test]
async fn add_handles_integers_past_i64() {
    let response = call("add", json!({"a": 9_223_372_036_854_775_808_u64, "b": 1}))
        .await
        .unwrap();
    assert_eq!(response.content(), "9223372036854775809");

    let response = call("add", json!({"a": i64::MAX, "b": i64::MAX})).await.unwrap();
    assert_eq!(response.content(), "18446744073709551614");

    let response = call(
        "add",
        json!({"a": "-170141183460469231731687303715884105728", "b": "-9223372036854775808"}),
    )
    .await;
    assert!(matches!(
        response,
        Err(DispatchError::InvalidArguments { ref field, .. }) if field == "b"
    ));

    let err = call("add", json!({"a": "999999999999999999999999999999999999999999", "b": 1}))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::InvalidArguments {
            tool: "add".into(),
            field: "a".into(),
            reason: "integer out of supported range".into(),
        }
    );
}

#[tokio::test]
async fn add_rejects_non_numeric_text() {
    let err = call("add", json!({"a": "x", "b": 2})).await.unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArguments { ref field, .. } if field == "a"));
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let err = call("nonexistent_tool", json!({})).await.unwrap_err();
    assert!(matches!(err, DispatchError::ToolNotFound { ref name } if name == "nonexistent_tool"));
}

#[tokio::test]
async fn datetime_matches_format() {
    let response = call("get_datetime", Value::Null).await.unwrap();
    assert!(NaiveDateTime::parse_from_str(response.content(), DATETIME_FORMAT).is_ok());
}

#[tokio::test]
async fn conversational_fallback_returns_instruction() {
    let response = call("conversational_fallback", json!({})).await.unwrap();
    assert_eq!(response.content(), CONVERSATIONAL_INSTRUCTION);
}

#[tokio::test]
async fn list_tools_includes_every_tool_and_itself() {
    let dispatcher = dispatcher();
    let response = dispatcher
        .invoke(InvocationRequest::new("list_tools", json!({})))
        .await
        .unwrap();

    let listed: Vec<&str> = response.content().lines().skip(1).collect();
    let expected: Vec<String> = dispatcher
        .list_tools()
        .into_iter()
        .map(|tool| format!("- {}: {}", tool.name, tool.description))
        .collect();
    assert_eq!(listed, expected);
    assert!(listed.iter().any(|line| line.starts_with("- list_tools:")));
}

#[tokio::test]
async fn add_widget_emits_matching_action() {
    let args = json!({
        "widget_name": "clock",
        "column_index": 1,
        "row_index": 1,
        "column_span": 2,
        "row_span": 1
    });
    let response = call("add_widget", args.clone()).await.unwrap();

    assert_eq!(response.action_name(), ADD_WIDGET_ACTION);
    assert_eq!(Value::Object(response.action_args().clone()), args);
    assert!(response.content().contains("column 1, row 1"));
    assert!(response.content().contains("2 columns and 1 row"));
}

#[tokio::test]
async fn add_widget_coerces_numeric_strings() {
    let response = call(
        "add_widget",
        json!({
            "widget_name": "note",
            "column_index": "2",
            "row_index": 3,
            "column_span": 1,
            "row_span": "2"
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.action_args()["column_index"], 2);
    assert_eq!(response.action_args()["row_span"], 2);
}

#[tokio::test]
async fn add_widget_enforces_grid_bounds() {
    let base = json!({
        "widget_name": "clock",
        "column_index": 1,
        "row_index": 1,
        "column_span": 1,
        "row_span": 1
    });

    let mut out_of_range = base.clone();
    out_of_range["row_index"] = json!(5);
    let err = call("add_widget", out_of_range).await.unwrap_err();
    assert_eq!(err.field(), Some("row_index"));

    let mut overflowing = base.clone();
    overflowing["column_index"] = json!(4);
    overflowing["column_span"] = json!(2);
    let err = call("add_widget", overflowing).await.unwrap_err();
    assert_eq!(err.field(), Some("column_span"));

    let mut unknown = base;
    unknown["widget_name"] = json!("weather");
    let err = call("add_widget", unknown).await.unwrap_err();
    assert_eq!(err.field(), Some("widget_name"));
}

#[tokio::test]
async fn add_widget_requires_every_field() {
    let err = call("add_widget", json!({"widget_name": "clock"}))
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("column_index"));
}

#[test]
fn description_reflects_catalog_and_is_idempotent() {
    let first = build_registry(&catalog()).unwrap();
    let second = build_registry(&catalog()).unwrap();

    let description = first.resolve("add_widget").unwrap().description().to_owned();
    assert_eq!(description, second.resolve("add_widget").unwrap().description());
    assert_eq!(description, describe_add_widget(&catalog()));
    assert!(description.contains("clock, note"));
    assert!(!description.contains("weather"));
}

#[test]
fn registry_can_be_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>(_: &T) {}
    let registry = Arc::new(build_registry(&catalog()).unwrap());
    assert_send_sync(&registry);
}
