//! API request handlers
//!
//! Handlers for all REST API endpoints. Tool calls run on the blocking pool
//! because every operation does synchronous file I/O.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::error::{ErrorKind, ErrorReport, SheetError};

use super::server::AppState;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    pub fn err(report: ErrorReport) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(report.error),
            error_kind: Some(report.error_kind),
        }
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound | ErrorKind::UnknownOperation => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidFormat => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::InvalidState | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Io => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

type ApiResult = (StatusCode, Json<ApiResponse<Value>>);

fn success(data: impl Serialize) -> ApiResult {
    let data = serde_json::to_value(data).unwrap_or(Value::Null);
    (StatusCode::OK, Json(ApiResponse::ok(data)))
}

fn failure(report: ErrorReport) -> ApiResult {
    (status_for(report.error_kind), Json(ApiResponse::err(report)))
}

fn join_failure(err: tokio::task::JoinError) -> ApiResult {
    error!(error = %err, "blocking task failed");
    failure(ErrorReport {
        error: format!("operation aborted: {}", err),
        error_kind: ErrorKind::Io,
    })
}

/// Root endpoint response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Excel API Server".to_string(),
        version: state.version.clone(),
        description: "HTTP API for creating, editing and inspecting Excel workbooks".to_string(),
        endpoints: vec![
            EndpointInfo::new("GET", "/health", "Health check endpoint"),
            EndpointInfo::new("GET", "/version", "Get server version"),
            EndpointInfo::new("GET", "/api/v1/tools", "List tools with their argument schemas"),
            EndpointInfo::new("POST", "/api/v1/tools/:name", "Run a tool; the body is its JSON arguments"),
            EndpointInfo::new("GET", "/api/v1/files", "List spreadsheet files in the documents root"),
            EndpointInfo::new("GET", "/api/v1/files/:filename/sheets", "List the sheets of one file"),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub tools: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        tools: state
            .dispatcher
            .tools()
            .iter()
            .map(|t| t.name.to_string())
            .collect(),
    }))
}

/// One advertised tool
#[derive(Debug, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// GET /api/v1/tools - Tool descriptors
pub async fn list_tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let tools: Vec<ToolInfo> = state
        .dispatcher
        .tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name.to_string(),
            description: t.description.to_string(),
            input_schema: t.input_schema(),
        })
        .collect();
    Json(ApiResponse::ok(tools))
}

/// POST /api/v1/tools/:name - Run a tool
///
/// An empty body is treated as an empty argument object.
pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> impl IntoResponse {
    let args: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                let err = SheetError::InvalidArgument(format!("request body is not JSON: {}", e));
                return failure(ErrorReport::from(&err));
            }
        }
    };

    let task = tokio::task::spawn_blocking(move || state.dispatcher.call(&name, &args));
    match task.await {
        Ok(Ok(output)) => success(output.to_json()),
        Ok(Err(e)) => failure(ErrorReport::from(&e)),
        Err(e) => join_failure(e),
    }
}

/// GET /api/v1/files - Spreadsheet files under the root
pub async fn list_files(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let task = tokio::task::spawn_blocking(move || state.dispatcher.list_files());
    match task.await {
        Ok(Ok(files)) => success(files),
        Ok(Err(e)) => failure(ErrorReport::from(&e)),
        Err(e) => join_failure(e),
    }
}

/// Sheet listing of one file
#[derive(Debug, Serialize)]
pub struct SheetsResponse {
    pub filename: String,
    pub sheets: Vec<String>,
}

/// GET /api/v1/files/:filename/sheets - Sheet names of one file
pub async fn file_sheets(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    let task = tokio::task::spawn_blocking(move || {
        let sheets = state.dispatcher.sheet_resource(&filename);
        (filename, sheets)
    });
    match task.await {
        Ok((filename, Ok(sheets))) => success(SheetsResponse { filename, sheets }),
        Ok((_, Err(report))) => failure(report),
        Err(e) => join_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::UnknownOperation), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidArgument), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(ErrorKind::InvalidFormat),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::InvalidState), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Io), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_response_err_carries_kind() {
        let err = SheetError::SheetExists("Data".into());
        let response: ApiResponse<Value> = ApiResponse::err(ErrorReport::from(&err));
        assert!(!response.success);
        assert_eq!(response.error_kind, Some(ErrorKind::Conflict));
        assert!(response.data.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error_kind"], "conflict");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a: ApiResponse<()> = ApiResponse::ok(());
        let b: ApiResponse<()> = ApiResponse::ok(());
        assert_ne!(a.request_id, b.request_id);
    }
}
