//! Excel API Server binary
//!
//! HTTP REST API over the Excel tools.

use std::path::PathBuf;

use clap::Parser;
use excel_mcp::api::{run_api_server, ApiConfig};
use excel_mcp::config::{WorkspaceConfig, DEFAULT_ROOT, ROOT_ENV};
use excel_mcp::logging;

#[derive(Parser, Debug)]
#[command(name = "excel-server")]
#[command(version)]
#[command(about = "Excel API Server - HTTP REST API for editing Excel workbooks")]
#[command(long_about = r#"
Excel API Server - HTTP REST API

Endpoints:
  - GET  /api/v1/tools                    - Tool list with JSON argument schemas
  - POST /api/v1/tools/:name              - Run a tool (body: JSON arguments)
  - GET  /api/v1/files                    - Spreadsheet files in the documents root
  - GET  /api/v1/files/:filename/sheets   - Sheet names of one file

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  excel-server --root ./excel_files
  excel-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/tools/create_excel_file \
    -H "Content-Type: application/json" \
    -d '{"filename": "report.xlsx"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "EXCEL_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "EXCEL_PORT")]
    port: u16,

    /// Directory holding the workbooks
    #[arg(long, default_value = DEFAULT_ROOT, env = ROOT_ENV)]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init("excel_mcp=info,excel_server=info,tower_http=info");

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, WorkspaceConfig::new(args.root)).await
}
