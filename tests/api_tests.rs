//! API integration tests
//!
//! Requests go through the full router, middleware included, via
//! `tower::ServiceExt::oneshot`; no socket is bound.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use excel_mcp::api::server::{ApiConfig, AppState};
use excel_mcp::api::router;
use excel_mcp::WorkspaceConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let state = Arc::new(AppState::new(&WorkspaceConfig::new(dir.path())));
    (dir, router(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn tool(app: &Router, name: &str, args: Value) -> (StatusCode, Value) {
    send(app, Method::POST, &format!("/api/v1/tools/{}", name), Some(args)).await
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = ApiConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let (_dir, app) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["request_id"].as_str().is_some());
}

#[tokio::test]
async fn test_root_and_version() {
    let (_dir, app) = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Excel API Server");
    assert!(!body["data"]["endpoints"].as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["tools"].as_array().unwrap().len(), 17);
}

#[tokio::test]
async fn test_list_tools_has_schemas() {
    let (_dir, app) = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/tools", None).await;
    assert_eq!(status, StatusCode::OK);
    let tools = body["data"].as_array().unwrap();
    let save_as = tools.iter().find(|t| t["name"] == "save_as_new_file").unwrap();
    assert_eq!(
        save_as["input_schema"]["required"],
        json!(["old_filename", "new_filename"])
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// TOOL CALLS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_tool_calls_end_to_end() {
    let (_dir, app) = app();

    let (status, body) = tool(&app, "create_excel_file", json!({"filename": "report.xlsx"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Created report.xlsx with sheet 'Sheet1'");

    let (status, _) = tool(
        &app,
        "write_row",
        json!({"filename": "report.xlsx", "sheet": "Sheet1", "start_cell": "A1", "data": ["x", 2, true]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = tool(
        &app,
        "read_cell",
        json!({"filename": "report.xlsx", "sheet": "Sheet1", "cell": "B1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["value"], 2);

    let (_, body) = tool(
        &app,
        "read_range",
        json!({"filename": "report.xlsx", "sheet": "Sheet1", "cell_range": "A1:C1"}),
    )
    .await;
    assert_eq!(body["data"], json!([["x", 2, true]]));

    let (status, body) = send(&app, Method::GET, "/api/v1/files", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["report.xlsx"]));

    let (status, body) = send(&app, Method::GET, "/api/v1/files/report.xlsx/sheets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filename"], "report.xlsx");
    assert_eq!(body["data"]["sheets"], json!(["Sheet1"]));
}

#[tokio::test]
async fn test_error_statuses() {
    let (_dir, app) = app();

    let (status, body) = tool(&app, "list_sheets", json!({"filename": "ghost.xlsx"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_kind"], "not_found");

    let (status, body) = tool(&app, "greet_user", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_kind"], "unknown_operation");

    let (status, _) = tool(&app, "add_sheet", json!({"filename": "a.xlsx"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    tool(&app, "create_excel_file", json!({"filename": "a.xlsx"})).await;
    let (status, body) = tool(&app, "add_sheet", json!({"filename": "a.xlsx", "sheet_name": "Sheet1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_kind"], "conflict");

    let (status, body) = tool(&app, "delete_sheet", json!({"filename": "a.xlsx", "sheet_name": "Sheet1"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_kind"], "invalid_state");
}

#[tokio::test]
async fn test_empty_body_counts_as_empty_arguments() {
    let (_dir, app) = app();
    let (status, body) = send(&app, Method::POST, "/api/v1/tools/list_sheets", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_kind"], "invalid_argument");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (_dir, app) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/tools/list_sheets")
        .body(Body::from("{nope"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sheets_of_missing_file() {
    let (_dir, app) = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/files/ghost.xlsx/sheets", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
