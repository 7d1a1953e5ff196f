//! Excel MCP server
//!
//! Model Context Protocol server that lets AI agents create, inspect and
//! edit workbooks under a documents root.
//!
//! ## Tools
//!
//! - Files: `create_excel_file`, `save_as_new_file`, `list_sheets`
//! - Sheets: `add_sheet`, `rename_sheet`, `delete_sheet`
//! - Cells: `write_cell`, `read_cell`, `write_formula`, `write_row`, `write_column`
//! - Ranges: `merge_cells`, `unmerge_cells`, `set_border`, `read_range`,
//!   `get_used_range`, `auto_fit_columns`
//!
//! ## Resources
//!
//! - `excel-files://list` - spreadsheet files in the root
//! - `excel-file://<name>`, `excel-sheetnames://<name>` - sheet names of one file
//!
//! ## Usage
//!
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

pub mod server;

pub use server::run_mcp_server_sync;
pub use server::ExcelMcpServer;
