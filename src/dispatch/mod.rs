//! Tool dispatch
//!
//! Maps a tool name plus a JSON argument object onto a document operation:
//! schema validation, typed decoding, path confinement under the documents
//! root, per-file locking, and rendering of the result.

pub mod descriptor;
mod locks;
mod output;
pub mod request;
mod workspace;

pub use descriptor::{ArgKind, ArgSpec, ToolDescriptor, TOOLS};
pub use locks::FileLocks;
pub use output::ToolOutput;
pub use request::ToolRequest;
pub use workspace::{list_files, resolve};

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::address::{CellRange, CellRef};
use crate::config::WorkspaceConfig;
use crate::error::{ErrorReport, SheetResult};
use crate::ops::{DocumentStore, Documents, XlsxStore};
use crate::types::CellValue;

/// Entry point shared by the MCP, HTTP and CLI adapters.
#[derive(Debug)]
pub struct Dispatcher<S = XlsxStore> {
    root: PathBuf,
    docs: Documents<S>,
    locks: FileLocks,
}

impl Dispatcher<XlsxStore> {
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self::with_store(config, XlsxStore)
    }
}

impl<S: DocumentStore> Dispatcher<S> {
    pub fn with_store(config: &WorkspaceConfig, store: S) -> Self {
        Self {
            root: config.root_dir.clone(),
            docs: Documents::new(store),
            locks: FileLocks::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Advertised tools, in a stable order.
    pub fn tools(&self) -> &'static [ToolDescriptor] {
        TOOLS
    }

    /// Run one tool call.
    pub fn call(&self, name: &str, args: &Value) -> SheetResult<ToolOutput> {
        let result = self.run(name, args);
        match &result {
            Ok(_) => info!(tool = name, "tool call succeeded"),
            Err(e) => warn!(tool = name, kind = ?e.kind(), error = %e, "tool call failed"),
        }
        result
    }

    /// Run one tool call and render it as text plus an error flag.
    pub fn call_text(&self, name: &str, args: &Value) -> (String, bool) {
        match self.call(name, args) {
            Ok(output) => (output.to_text(), false),
            Err(e) => (e.to_string(), true),
        }
    }

    fn run(&self, name: &str, args: &Value) -> SheetResult<ToolOutput> {
        let request = ToolRequest::parse(name, args)?;
        let paths = request
            .filenames()
            .into_iter()
            .map(|f| resolve(&self.root, f))
            .collect::<SheetResult<Vec<PathBuf>>>()?;

        debug!(tool = request.name(), files = ?paths, "dispatching");
        self.locks
            .with_locked(&paths, || self.execute(&request, &paths))
    }

    fn execute(&self, request: &ToolRequest, paths: &[PathBuf]) -> SheetResult<ToolOutput> {
        let path = paths[0].as_path();
        let docs = &self.docs;

        let output = match request {
            ToolRequest::CreateFile(a) => {
                docs.create(path, &a.sheet_name)?;
                ToolOutput::Message(format!(
                    "Created {} with sheet '{}'",
                    a.filename, a.sheet_name
                ))
            }
            ToolRequest::AddSheet(a) => {
                docs.add_sheet(path, &a.sheet_name)?;
                ToolOutput::Message(format!("Added sheet '{}'", a.sheet_name))
            }
            ToolRequest::RenameSheet(a) => {
                docs.rename_sheet(path, &a.old_name, &a.new_name)?;
                ToolOutput::Message(format!(
                    "Renamed sheet from '{}' to '{}'",
                    a.old_name, a.new_name
                ))
            }
            ToolRequest::DeleteSheet(a) => {
                docs.delete_sheet(path, &a.sheet_name)?;
                ToolOutput::Message(format!("Deleted sheet '{}'", a.sheet_name))
            }
            ToolRequest::WriteCell(a) => {
                let cell = CellRef::parse(&a.cell)?;
                let value = CellValue::from_json(&a.value)?;
                let style = a.style_update()?;
                let shown = value.to_string();
                docs.write_cell(path, &a.sheet, cell, value, &style)?;
                ToolOutput::Message(format!(
                    "Wrote value '{}' to {} in '{}'",
                    shown, cell, a.sheet
                ))
            }
            ToolRequest::ReadCell(a) => {
                let cell = CellRef::parse(&a.cell)?;
                ToolOutput::Value(docs.read_cell(path, &a.sheet, cell)?)
            }
            ToolRequest::MergeCells(a) => {
                let range = CellRange::parse(&a.cell_range)?;
                docs.merge_cells(path, &a.sheet, range)?;
                ToolOutput::Message(format!("Merged cells {}", range))
            }
            ToolRequest::UnmergeCells(a) => {
                let range = CellRange::parse(&a.cell_range)?;
                docs.unmerge_cells(path, &a.sheet, range)?;
                ToolOutput::Message(format!("Unmerged cells {}", range))
            }
            ToolRequest::WriteRow(a) => {
                let start = CellRef::parse(&a.start_cell)?;
                docs.write_row(path, &a.sheet, start, a.values()?)?;
                ToolOutput::Message(format!("Wrote row starting at {}", start))
            }
            ToolRequest::WriteColumn(a) => {
                let start = CellRef::parse(&a.start_cell)?;
                docs.write_column(path, &a.sheet, start, a.values()?)?;
                ToolOutput::Message(format!("Wrote column starting at {}", start))
            }
            ToolRequest::SetBorder(a) => {
                let range = CellRange::parse(&a.cell_range)?;
                docs.set_border(path, &a.sheet, range)?;
                ToolOutput::Message(format!("Applied border to {}", range))
            }
            ToolRequest::AutoFitColumns(a) => {
                let columns = docs.auto_fit_columns(path, &a.sheet)?;
                debug!(sheet = %a.sheet, columns = ?columns, "auto-fitted");
                ToolOutput::Message(format!("Auto-fitted columns in '{}'", a.sheet))
            }
            ToolRequest::GetUsedRange(a) => {
                let used = docs.get_used_range(path, &a.sheet)?;
                ToolOutput::Json(json!(used))
            }
            ToolRequest::ReadRange(a) => {
                let range = CellRange::parse(&a.cell_range)?;
                let rows = docs.read_range(path, &a.sheet, range)?;
                ToolOutput::Json(json!(rows))
            }
            ToolRequest::WriteFormula(a) => {
                let cell = CellRef::parse(&a.cell)?;
                docs.write_formula(path, &a.sheet, cell, &a.formula)?;
                ToolOutput::Message(format!("Wrote formula '{}' in {}", a.formula, cell))
            }
            ToolRequest::SaveAs(a) => {
                docs.save_as(path, &paths[1])?;
                ToolOutput::Message(format!("Saved copy as {}", a.new_filename))
            }
            ToolRequest::ListSheets(_) => ToolOutput::Json(json!(docs.list_sheets(path)?)),
        };

        Ok(output)
    }

    /// Spreadsheet files directly under the root, sorted.
    pub fn list_files(&self) -> SheetResult<Vec<String>> {
        list_files(&self.root)
    }

    /// Sheet names of one file under the root.
    pub fn sheets(&self, filename: &str) -> SheetResult<Vec<String>> {
        let path = resolve(&self.root, filename)?;
        self.locks
            .with_locked(std::slice::from_ref(&path), || self.docs.list_sheets(&path))
    }

    /// Sheet names of one file, or a description of why they are unavailable.
    pub fn sheet_resource(&self, filename: &str) -> Result<Vec<String>, ErrorReport> {
        self.sheets(filename).map_err(|e| {
            debug!(file = filename, error = %e, "sheet listing unavailable");
            ErrorReport::from(&e)
        })
    }
}
