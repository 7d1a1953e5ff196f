//! MCP server implementation
//!
//! JSON-RPC 2.0 over stdin/stdout, one message per line. Tool calls and
//! resource reads are delegated to the [`Dispatcher`].

use std::io::{BufRead, BufReader, Write};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::WorkspaceConfig;
use crate::dispatch::Dispatcher;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

const FILES_LIST_URI: &str = "excel-files://list";
const FILE_SCHEME: &str = "excel-file://";
const SHEETNAMES_SCHEME: &str = "excel-sheetnames://";

/// JSON-RPC request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"jsonrpc":"2.0","id":null,"error":{{"code":-32603,"message":"Internal error: {}"}}}}"#,
                e
            )
        })
    }
}

/// MCP tool definition
#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

/// MCP server over a documents root
#[derive(Debug)]
pub struct ExcelMcpServer {
    dispatcher: Dispatcher,
}

impl ExcelMcpServer {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one line of input. Returns the encoded response, if any.
    pub fn handle_line(&self, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "unparseable JSON-RPC message");
                let response = JsonRpcResponse::error(Value::Null, -32700, format!("Parse error: {}", e));
                return Some(response.encode());
            }
        };

        self.handle_request(&request).map(|r| r.encode())
    }

    fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications carry no id and never get a reply.
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "notification");
            return None;
        };
        debug!(method = %request.method, "request");

        match request.method.as_str() {
            "initialize" => Some(JsonRpcResponse::result(
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": { "listChanged": false },
                        "resources": { "subscribe": false, "listChanged": false }
                    },
                    "serverInfo": {
                        "name": "excel-mcp",
                        "version": env!("CARGO_PKG_VERSION")
                    },
                    "instructions": "Create, inspect, edit and format Excel (.xlsx) workbooks stored under the server's documents root. File names are relative to that root."
                }),
            )),
            "notifications/initialized" => None, // No response for notifications
            "ping" => Some(JsonRpcResponse::result(id, json!({}))),
            "tools/list" => Some(JsonRpcResponse::result(id, json!({ "tools": self.tools() }))),
            "tools/call" => {
                let tool_name = request
                    .params
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let arguments = request
                    .params
                    .get("arguments")
                    .cloned()
                    .unwrap_or(json!({}));

                Some(JsonRpcResponse::result(id, self.call_tool(tool_name, &arguments)))
            }
            "resources/list" => Some(JsonRpcResponse::result(id, self.list_resources())),
            "resources/templates/list" => Some(JsonRpcResponse::result(
                id,
                json!({
                    "resourceTemplates": [{
                        "uriTemplate": format!("{}{{filename}}", SHEETNAMES_SCHEME),
                        "name": "Sheet names",
                        "description": "Ordered sheet names of one workbook",
                        "mimeType": "text/plain"
                    }]
                }),
            )),
            "resources/read" => {
                let uri = request
                    .params
                    .get("uri")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                Some(match self.read_resource(uri) {
                    Some(result) => JsonRpcResponse::result(id, result),
                    None => JsonRpcResponse::error(id, -32602, format!("Unknown resource: {}", uri)),
                })
            }
            _ => Some(JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            )),
        }
    }

    fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .tools()
            .iter()
            .map(|t| Tool {
                name: t.name.to_string(),
                description: t.description.to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    fn call_tool(&self, name: &str, arguments: &Value) -> Value {
        let (text, is_error) = self.dispatcher.call_text(name, arguments);
        json!({
            "content": [{
                "type": "text",
                "text": text
            }],
            "isError": is_error
        })
    }

    fn list_resources(&self) -> Value {
        let mut resources = vec![json!({
            "uri": FILES_LIST_URI,
            "name": "Excel files",
            "description": "Spreadsheet files in the documents root",
            "mimeType": "application/json"
        })];

        match self.dispatcher.list_files() {
            Ok(files) => resources.extend(files.into_iter().map(|name| {
                json!({
                    "uri": format!("{}{}", FILE_SCHEME, name),
                    "name": name,
                    "mimeType": "text/plain"
                })
            })),
            Err(e) => warn!(error = %e, "could not list documents root"),
        }

        json!({ "resources": resources })
    }

    fn read_resource(&self, uri: &str) -> Option<Value> {
        let text = if uri == FILES_LIST_URI {
            match self.dispatcher.list_files() {
                Ok(files) => json!(files).to_string(),
                Err(e) => format!("Error: {}", e),
            }
        } else {
            let filename = uri
                .strip_prefix(FILE_SCHEME)
                .or_else(|| uri.strip_prefix(SHEETNAMES_SCHEME))?;
            match self.dispatcher.sheet_resource(filename) {
                Ok(sheets) => sheets.join("\n"),
                Err(report) => format!("Error: {}", report.error),
            }
        };

        let mime = if uri == FILES_LIST_URI {
            "application/json"
        } else {
            "text/plain"
        };
        Some(json!({
            "contents": [{
                "uri": uri,
                "mimeType": mime,
                "text": text
            }]
        }))
    }
}

/// Serve MCP over stdin/stdout until EOF.
///
/// # Coverage Exclusion
/// Reads stdin forever. Request handling is covered through
/// [`ExcelMcpServer::handle_line`].
#[cfg(not(coverage))]
pub fn run_mcp_server_sync(config: &WorkspaceConfig) {
    let server = ExcelMcpServer::new(config);
    info!(root = %config.root_dir.display(), "excel-mcp server ready on stdio");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin.lock());

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        if let Some(response) = server.handle_line(&line) {
            let _ = writeln!(stdout, "{}", response);
            let _ = stdout.flush();
        }
    }

    info!("stdin closed, excel-mcp server exiting");
}

/// Stub for coverage builds
#[cfg(coverage)]
pub fn run_mcp_server_sync(_config: &WorkspaceConfig) {}
