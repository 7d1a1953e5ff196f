//! .xlsx codec
//!
//! Values and formulas are read with calamine. Styles, merge regions and
//! column widths are read straight from the OOXML parts with zip and
//! quick-xml. Writing goes through rust_xlsxwriter.

mod exporter;
mod importer;
mod ooxml;

pub use exporter::ExcelExporter;
pub use importer::{sheet_names, ExcelImporter};
