//! Excel MCP Server binary
//!
//! Model Context Protocol server over stdio.
//! Run with: `excel-mcp --root ./excel_files`
//!
//! Configure in an MCP client:
//! ```json
//! {
//!   "mcpServers": {
//!     "excel": {
//!       "command": "excel-mcp",
//!       "env": { "EXCEL_FILES_DIR": "/path/to/workbooks" }
//!     }
//!   }
//! }
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use excel_mcp::config::{WorkspaceConfig, DEFAULT_ROOT, ROOT_ENV};
use excel_mcp::logging;
use excel_mcp::mcp::run_mcp_server_sync;

#[derive(Parser, Debug)]
#[command(name = "excel-mcp")]
#[command(version)]
#[command(about = "Excel MCP Server - workbook tools for AI agents over stdio")]
struct Args {
    /// Directory holding the workbooks
    #[arg(long, default_value = DEFAULT_ROOT, env = ROOT_ENV)]
    root: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(logging::DEFAULT_FILTER);

    let config = WorkspaceConfig::new(args.root);
    config
        .prepare()
        .with_context(|| format!("cannot create documents root {}", config.root_dir.display()))?;

    run_mcp_server_sync(&config);
    Ok(())
}
