//! Excel importer: .xlsx → workbook model

use crate::address::{CellRef, MAX_COL};
use crate::error::{SheetError, SheetResult};
use crate::excel::ooxml::{Package, SheetParts};
use crate::types::CellValue;
use crate::workbook::{Cell, Workbook, Worksheet};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Loads an .xlsx file with values, formulas, styles, merges and column widths
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn import(&self) -> SheetResult<Workbook> {
        if !self.path.is_file() {
            return Err(SheetError::DocumentNotFound(self.path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| {
            SheetError::InvalidFormat(format!("{}: {}", self.path.display(), e))
        })?;

        let mut package = Package::open(&self.path)?;
        let styles = package.style_table()?;
        let sheet_paths = package.sheet_paths()?;

        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            let values = workbook.worksheet_range(&sheet_name).map_err(|e| {
                SheetError::InvalidFormat(format!("sheet '{}': {}", sheet_name, e))
            })?;
            let formulas = workbook.worksheet_formula(&sheet_name).ok();
            let parts = match sheet_paths.get(&sheet_name) {
                Some(part) => package.sheet_parts(part)?,
                None => SheetParts::default(),
            };

            let mut cells: BTreeMap<CellRef, Cell> = BTreeMap::new();
            collect_values(&values, &mut cells);
            if let Some(formulas) = &formulas {
                collect_formulas(formulas, &mut cells);
            }
            for (at, style_id) in &parts.style_ids {
                if let Some(style) = styles.get(*style_id) {
                    cells.entry(*at).or_default().style = style.clone();
                }
            }

            let mut sheet = Worksheet::new(&sheet_name);
            for (at, cell) in cells {
                sheet.insert_loaded(at, cell);
            }
            for range in parts.merges {
                sheet.insert_loaded_merge(range);
            }
            for (min, max, width) in parts.column_widths {
                for col in min..=max.min(MAX_COL) {
                    sheet.set_column_width(col, width);
                }
            }

            sheets.push(sheet);
        }

        Workbook::from_sheets(sheets)
    }
}

/// calamine reports positions relative to the range start.
fn absolute(range_start: Option<(u32, u32)>, row: usize, col: usize) -> Option<CellRef> {
    let (row0, col0) = range_start?;
    CellRef::new(row0 + row as u32 + 1, col0 + col as u32 + 1).ok()
}

fn collect_values(range: &Range<Data>, cells: &mut BTreeMap<CellRef, Cell>) {
    let start = range.start();
    for (row, col, data) in range.used_cells() {
        let Some(at) = absolute(start, row, col) else {
            continue;
        };
        if let Some(value) = data_to_value(data) {
            cells.entry(at).or_default().value = value;
        }
    }
}

fn collect_formulas(range: &Range<String>, cells: &mut BTreeMap<CellRef, Cell>) {
    let start = range.start();
    for (row, col, formula) in range.used_cells() {
        if let (Some(at), Ok(value)) = (absolute(start, row, col), CellValue::formula(formula)) {
            cells.entry(at).or_default().value = value;
        }
    }
}

fn data_to_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
    }
}

/// Convenience for listing sheets without materializing cells.
pub fn sheet_names(path: &Path) -> SheetResult<Vec<String>> {
    if !path.is_file() {
        return Err(SheetError::DocumentNotFound(path.display().to_string()));
    }
    let workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| SheetError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
    Ok(workbook.sheet_names().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExcelImporter::new(dir.path().join("nope.xlsx"))
            .import()
            .unwrap_err();
        assert!(matches!(err, SheetError::DocumentNotFound(_)));
    }

    #[test]
    fn test_import_garbage_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        let err = ExcelImporter::new(&path).import().unwrap_err();
        assert!(matches!(err, SheetError::InvalidFormat(_)));
    }

    #[test]
    fn test_data_to_value() {
        assert_eq!(data_to_value(&Data::Int(3)), Some(CellValue::Number(3.0)));
        assert_eq!(data_to_value(&Data::Empty), None);
        assert_eq!(data_to_value(&Data::String(String::new())), None);
        assert_eq!(
            data_to_value(&Data::Bool(true)),
            Some(CellValue::Bool(true))
        );
    }
}
