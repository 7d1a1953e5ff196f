use std::path::Path;

use crate::error::SheetResult;
use crate::excel::{self, ExcelExporter, ExcelImporter};
use crate::workbook::Workbook;

/// Where documents are loaded from and persisted to.
pub trait DocumentStore: Send + Sync {
    fn load(&self, path: &Path) -> SheetResult<Workbook>;

    /// Persist the whole document, replacing any existing file.
    fn save(&self, book: &Workbook, path: &Path) -> SheetResult<()>;

    /// Sheet names in workbook order.
    fn sheet_names(&self, path: &Path) -> SheetResult<Vec<String>> {
        Ok(self.load(path)?.sheet_names())
    }
}

/// Reads and writes `.xlsx` files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxStore;

impl DocumentStore for XlsxStore {
    fn load(&self, path: &Path) -> SheetResult<Workbook> {
        ExcelImporter::new(path).import()
    }

    fn save(&self, book: &Workbook, path: &Path) -> SheetResult<()> {
        ExcelExporter::new(book).export(path)
    }

    fn sheet_names(&self, path: &Path) -> SheetResult<Vec<String>> {
        excel::sheet_names(path)
    }
}
