//! Excel MCP - workbook tools for AI agents
//!
//! This library creates, edits and inspects `.xlsx` workbooks on disk and
//! exposes those edits as named tools over three transports: MCP on stdio,
//! a REST API, and a CLI.
//!
//! # Features
//!
//! - Sheet management (add, rename, delete, list)
//! - Cell values, formulas, rows and columns
//! - Cell styling: font, fill, alignment and thin borders
//! - Merged ranges and auto-fitted column widths
//! - Styles, merges and widths survive every load/save cycle
//! - File access confined to a single documents root
//!
//! # Example
//!
//! ```no_run
//! use excel_mcp::{Dispatcher, WorkspaceConfig};
//! use serde_json::json;
//!
//! let config = WorkspaceConfig::new("./excel_files");
//! config.prepare()?;
//! let dispatcher = Dispatcher::new(&config);
//!
//! dispatcher.call("create_excel_file", &json!({"filename": "report.xlsx"}))?;
//! dispatcher.call(
//!     "write_cell",
//!     &json!({"filename": "report.xlsx", "sheet": "Sheet1", "cell": "A1", "value": "Total"}),
//! )?;
//! let value = dispatcher.call(
//!     "read_cell",
//!     &json!({"filename": "report.xlsx", "sheet": "Sheet1", "cell": "A1"}),
//! )?;
//! println!("{}", value);
//! # Ok::<(), excel_mcp::SheetError>(())
//! ```

pub mod address;
pub mod api;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod excel;
pub mod logging;
pub mod mcp;
pub mod ops;
pub mod types;
pub mod workbook;

// Re-export commonly used types
pub use config::WorkspaceConfig;
pub use dispatch::Dispatcher;
pub use error::{ErrorKind, SheetError, SheetResult};
pub use types::CellValue;
pub use workbook::Workbook;
