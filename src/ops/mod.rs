//! Document operations
//!
//! Every operation is one transaction against a file: load, apply a single
//! change or read, and save when something changed. The save only happens
//! after the in-memory change succeeded, so a failed call leaves the file as
//! it was.

mod store;

pub use store::{DocumentStore, XlsxStore};

use std::path::Path;

use crate::address::{CellRange, CellRef};
use crate::error::SheetResult;
use crate::types::{CellValue, StyleUpdate, UsedRange};
use crate::workbook::Workbook;

/// Runs operations against documents through a [`DocumentStore`].
#[derive(Debug, Clone, Default)]
pub struct Documents<S = XlsxStore> {
    store: S,
}

impl<S: DocumentStore> Documents<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn modify<T>(
        &self,
        path: &Path,
        action: impl FnOnce(&mut Workbook) -> SheetResult<T>,
    ) -> SheetResult<T> {
        let mut book = self.store.load(path)?;
        let out = action(&mut book)?;
        self.store.save(&book, path)?;
        Ok(out)
    }

    fn inspect<T>(
        &self,
        path: &Path,
        action: impl FnOnce(&Workbook) -> SheetResult<T>,
    ) -> SheetResult<T> {
        let book = self.store.load(path)?;
        action(&book)
    }

    // ═══════════════════════════════════════════════════════════════
    // Sheets
    // ═══════════════════════════════════════════════════════════════

    /// Create (or overwrite) a document with a single empty sheet.
    pub fn create(&self, path: &Path, sheet_name: &str) -> SheetResult<()> {
        let book = Workbook::new(sheet_name)?;
        self.store.save(&book, path)
    }

    pub fn add_sheet(&self, path: &Path, sheet_name: &str) -> SheetResult<()> {
        self.modify(path, |book| book.add_sheet(sheet_name).map(|_| ()))
    }

    pub fn rename_sheet(&self, path: &Path, old_name: &str, new_name: &str) -> SheetResult<()> {
        self.modify(path, |book| book.rename_sheet(old_name, new_name))
    }

    pub fn delete_sheet(&self, path: &Path, sheet_name: &str) -> SheetResult<()> {
        self.modify(path, |book| book.delete_sheet(sheet_name))
    }

    pub fn list_sheets(&self, path: &Path) -> SheetResult<Vec<String>> {
        self.store.sheet_names(path)
    }

    // ═══════════════════════════════════════════════════════════════
    // Cells
    // ═══════════════════════════════════════════════════════════════

    pub fn write_cell(
        &self,
        path: &Path,
        sheet: &str,
        cell: CellRef,
        value: CellValue,
        style: &StyleUpdate,
    ) -> SheetResult<()> {
        self.modify(path, |book| {
            let ws = book.sheet_mut(sheet)?;
            ws.ensure_writable(cell)?;
            let next_style = style.apply(&ws.style(cell));
            ws.set_value(cell, value)?;
            ws.set_style(cell, next_style);
            Ok(())
        })
    }

    pub fn read_cell(&self, path: &Path, sheet: &str, cell: CellRef) -> SheetResult<CellValue> {
        self.inspect(path, |book| Ok(book.sheet(sheet)?.value(cell)))
    }

    pub fn write_formula(
        &self,
        path: &Path,
        sheet: &str,
        cell: CellRef,
        formula: &str,
    ) -> SheetResult<()> {
        let value = CellValue::formula(formula)?;
        self.modify(path, |book| book.sheet_mut(sheet)?.set_value(cell, value))
    }

    pub fn write_row(
        &self,
        path: &Path,
        sheet: &str,
        start: CellRef,
        values: Vec<CellValue>,
    ) -> SheetResult<()> {
        self.modify(path, |book| book.sheet_mut(sheet)?.write_row(start, values))
    }

    pub fn write_column(
        &self,
        path: &Path,
        sheet: &str,
        start: CellRef,
        values: Vec<CellValue>,
    ) -> SheetResult<()> {
        self.modify(path, |book| book.sheet_mut(sheet)?.write_column(start, values))
    }

    // ═══════════════════════════════════════════════════════════════
    // Ranges and formatting
    // ═══════════════════════════════════════════════════════════════

    pub fn merge_cells(&self, path: &Path, sheet: &str, range: CellRange) -> SheetResult<()> {
        self.modify(path, |book| book.sheet_mut(sheet)?.merge(range))
    }

    pub fn unmerge_cells(&self, path: &Path, sheet: &str, range: CellRange) -> SheetResult<()> {
        self.modify(path, |book| book.sheet_mut(sheet)?.unmerge(range))
    }

    pub fn set_border(&self, path: &Path, sheet: &str, range: CellRange) -> SheetResult<()> {
        self.modify(path, |book| book.sheet_mut(sheet)?.set_border(range))
    }

    /// Returns the letters of the columns that were resized.
    pub fn auto_fit_columns(&self, path: &Path, sheet: &str) -> SheetResult<Vec<String>> {
        self.modify(path, |book| Ok(book.sheet_mut(sheet)?.auto_fit_columns()))
    }

    pub fn get_used_range(&self, path: &Path, sheet: &str) -> SheetResult<UsedRange> {
        self.inspect(path, |book| Ok(book.sheet(sheet)?.used_range()))
    }

    pub fn read_range(
        &self,
        path: &Path,
        sheet: &str,
        range: CellRange,
    ) -> SheetResult<Vec<Vec<CellValue>>> {
        self.inspect(path, |book| book.sheet(sheet)?.read_range(range))
    }

    // ═══════════════════════════════════════════════════════════════
    // Files
    // ═══════════════════════════════════════════════════════════════

    /// Persist a copy of `source` under `target`. `source` is not modified.
    pub fn save_as(&self, source: &Path, target: &Path) -> SheetResult<()> {
        let book = self.store.load(source)?;
        self.store.save(&book, target)
    }
}
