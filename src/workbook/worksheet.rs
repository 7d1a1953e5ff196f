use std::collections::BTreeMap;

use crate::address::{column_letter, CellRange, CellRef};
use crate::error::{SheetError, SheetResult};
use crate::types::{BorderLine, Borders, CellStyle, CellValue, UsedRange};

/// Extra characters added to the longest value by auto-fit.
pub const AUTO_FIT_PADDING: usize = 2;

/// Largest range accepted by bulk reads and border fills.
pub const MAX_RANGE_CELLS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    fn is_blank(&self) -> bool {
        self.value.is_empty() && self.style.is_default()
    }
}

/// One sheet: sparse cells keyed by (row, col), merge regions, column widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    merges: Vec<CellRange>,
    column_widths: BTreeMap<u32, f64>,
}

fn check_range_size(range: &CellRange) -> SheetResult<()> {
    if range.cell_count() > MAX_RANGE_CELLS {
        return Err(SheetError::InvalidArgument(format!(
            "range {} covers {} cells; the limit is {}",
            range,
            range.cell_count(),
            MAX_RANGE_CELLS
        )));
    }
    Ok(())
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellRef { row, col }, cell))
    }

    pub fn merges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn cell(&self, at: CellRef) -> Option<&Cell> {
        self.cells.get(&(at.row, at.col))
    }

    pub fn value(&self, at: CellRef) -> CellValue {
        self.cell(at).map(|c| c.value.clone()).unwrap_or_default()
    }

    pub fn style(&self, at: CellRef) -> CellStyle {
        self.cell(at).map(|c| c.style.clone()).unwrap_or_default()
    }

    /// Merge region covering `at` where `at` is not the anchor.
    fn covering_merge(&self, at: CellRef) -> Option<&CellRange> {
        self.merges
            .iter()
            .find(|m| m.contains(at) && m.start != at)
    }

    fn cell_entry(&mut self, at: CellRef) -> &mut Cell {
        self.cells.entry((at.row, at.col)).or_default()
    }

    fn prune(&mut self, at: CellRef) {
        if self
            .cells
            .get(&(at.row, at.col))
            .is_some_and(Cell::is_blank)
        {
            self.cells.remove(&(at.row, at.col));
        }
    }

    /// Fail if `at` sits inside a merge region but is not its anchor.
    pub fn ensure_writable(&self, at: CellRef) -> SheetResult<()> {
        match self.covering_merge(at) {
            Some(range) => Err(SheetError::MergedCell {
                cell: at.to_string(),
                range: range.to_string(),
                anchor: range.start.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn set_value(&mut self, at: CellRef, value: CellValue) -> SheetResult<()> {
        if !value.is_empty() {
            self.ensure_writable(at)?;
        }
        self.cell_entry(at).value = value;
        self.prune(at);
        Ok(())
    }

    pub fn set_style(&mut self, at: CellRef, style: CellStyle) {
        self.cell_entry(at).style = style;
        self.prune(at);
    }

    /// Place cell data as loaded from a file, bypassing merge checks.
    pub(crate) fn insert_loaded(&mut self, at: CellRef, cell: Cell) {
        if !cell.is_blank() {
            self.cells.insert((at.row, at.col), cell);
        }
    }

    pub(crate) fn insert_loaded_merge(&mut self, range: CellRange) {
        if !range.is_single_cell() && !self.merges.iter().any(|m| m.intersects(&range)) {
            self.merges.push(range);
        }
    }

    /// Write values left to right from `start`. Validates every target first.
    pub fn write_row(&mut self, start: CellRef, values: Vec<CellValue>) -> SheetResult<()> {
        let targets = (0..values.len())
            .map(|i| start.right(i))
            .collect::<SheetResult<Vec<_>>>()?;
        self.write_all(targets, values)
    }

    /// Write values top to bottom from `start`. Validates every target first.
    pub fn write_column(&mut self, start: CellRef, values: Vec<CellValue>) -> SheetResult<()> {
        let targets = (0..values.len())
            .map(|i| start.down(i))
            .collect::<SheetResult<Vec<_>>>()?;
        self.write_all(targets, values)
    }

    fn write_all(&mut self, targets: Vec<CellRef>, values: Vec<CellValue>) -> SheetResult<()> {
        for (at, value) in targets.iter().zip(&values) {
            if !value.is_empty() {
                self.ensure_writable(*at)?;
            }
        }
        for (at, value) in targets.into_iter().zip(values) {
            self.set_value(at, value)?;
        }
        Ok(())
    }

    /// Merge a range. Values outside the anchor are dropped; styles stay.
    pub fn merge(&mut self, range: CellRange) -> SheetResult<()> {
        if range.is_single_cell() {
            return Err(SheetError::InvalidArgument(format!(
                "cannot merge a single cell ({})",
                range.start
            )));
        }
        check_range_size(&range)?;
        if let Some(existing) = self.merges.iter().find(|m| m.intersects(&range)) {
            return Err(SheetError::MergeConflict {
                range: range.to_string(),
                existing: existing.to_string(),
            });
        }

        let covered: Vec<CellRef> = self
            .cells
            .range((range.start.row, 0)..=(range.end.row, u32::MAX))
            .map(|(&(row, col), _)| CellRef { row, col })
            .filter(|at| range.contains(*at) && *at != range.start)
            .collect();
        for at in covered {
            self.cell_entry(at).value = CellValue::Empty;
            self.prune(at);
        }

        self.merges.push(range);
        Ok(())
    }

    /// Remove a merge region that matches `range` exactly.
    pub fn unmerge(&mut self, range: CellRange) -> SheetResult<()> {
        let index = self
            .merges
            .iter()
            .position(|m| *m == range)
            .ok_or_else(|| SheetError::NotMerged(range.to_string()))?;
        self.merges.remove(index);
        Ok(())
    }

    /// Thin border on all four edges of every cell in the range.
    pub fn set_border(&mut self, range: CellRange) -> SheetResult<()> {
        check_range_size(&range)?;
        for at in range.cells() {
            self.cell_entry(at).style.borders = Borders::uniform(BorderLine::Thin);
        }
        Ok(())
    }

    /// Values of the range, row-major.
    pub fn read_range(&self, range: CellRange) -> SheetResult<Vec<Vec<CellValue>>> {
        check_range_size(&range)?;
        Ok((range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| self.value(CellRef { row, col }))
                    .collect()
            })
            .collect())
    }

    /// Bounding box of non-empty cells.
    pub fn used_range(&self) -> UsedRange {
        let mut used: Option<UsedRange> = None;
        for (at, cell) in self.cells() {
            if cell.value.is_empty() {
                continue;
            }
            used = Some(match used {
                None => UsedRange {
                    min_row: at.row,
                    max_row: at.row,
                    min_col: at.col,
                    max_col: at.col,
                },
                Some(u) => UsedRange {
                    min_row: u.min_row.min(at.row),
                    max_row: u.max_row.max(at.row),
                    min_col: u.min_col.min(at.col),
                    max_col: u.max_col.max(at.col),
                },
            });
        }
        used.unwrap_or_default()
    }

    /// Size each column holding values to its longest displayed text plus padding.
    /// Returns the adjusted column letters in order.
    pub fn auto_fit_columns(&mut self) -> Vec<String> {
        let mut longest: BTreeMap<u32, usize> = BTreeMap::new();
        for (at, cell) in self.cells() {
            let Some(text) = cell.value.display_text() else {
                continue;
            };
            let len = text.chars().count();
            let entry = longest.entry(at.col).or_insert(0);
            *entry = (*entry).max(len);
        }

        let mut adjusted = Vec::with_capacity(longest.len());
        for (col, len) in longest {
            self.column_widths
                .insert(col, (len + AUTO_FIT_PADDING) as f64);
            adjusted.push(column_letter(col));
        }
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(a1: &str) -> CellRef {
        CellRef::parse(a1).unwrap()
    }

    fn range(r: &str) -> CellRange {
        CellRange::parse(r).unwrap()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_set_and_get_value() {
        let mut ws = Worksheet::new("S");
        ws.set_value(at("B2"), text("Revenue")).unwrap();
        assert_eq!(ws.value(at("B2")), text("Revenue"));
        assert_eq!(ws.value(at("A1")), CellValue::Empty);
    }

    #[test]
    fn test_clearing_unstyled_cell_removes_it() {
        let mut ws = Worksheet::new("S");
        ws.set_value(at("A1"), text("x")).unwrap();
        ws.set_value(at("A1"), CellValue::Empty).unwrap();
        assert_eq!(ws.cells().count(), 0);
    }

    #[test]
    fn test_write_row_and_column() {
        let mut ws = Worksheet::new("S");
        ws.write_row(at("A1"), vec![text("x"), text("y"), text("z")])
            .unwrap();
        ws.write_column(at("D1"), vec![CellValue::Number(1.0), CellValue::Number(2.0)])
            .unwrap();

        assert_eq!(
            ws.read_range(range("A1:C1")).unwrap(),
            vec![vec![text("x"), text("y"), text("z")]]
        );
        assert_eq!(
            ws.read_range(range("D1:D2")).unwrap(),
            vec![vec![CellValue::Number(1.0)], vec![CellValue::Number(2.0)]]
        );
    }

    #[test]
    fn test_write_row_past_edge_writes_nothing() {
        let mut ws = Worksheet::new("S");
        let err = ws
            .write_row(at("XFC1"), vec![text("a"), text("b"), text("c")])
            .unwrap_err();
        assert!(matches!(err, SheetError::InvalidArgument(_)));
        assert_eq!(ws.cells().count(), 0);
    }

    #[test]
    fn test_merge_clears_non_anchor_values() {
        let mut ws = Worksheet::new("S");
        ws.write_row(at("A1"), vec![text("keep"), text("drop")])
            .unwrap();
        ws.merge(range("A1:B2")).unwrap();
        assert_eq!(ws.value(at("A1")), text("keep"));
        assert_eq!(ws.value(at("B1")), CellValue::Empty);
    }

    #[test]
    fn test_merged_non_anchor_rejects_writes_until_unmerged() {
        let mut ws = Worksheet::new("S");
        ws.merge(range("A1:B2")).unwrap();

        let err = ws.set_value(at("B2"), text("x")).unwrap_err();
        assert!(matches!(err, SheetError::MergedCell { .. }));
        ws.set_value(at("A1"), text("anchor")).unwrap();

        ws.unmerge(range("A1:B2")).unwrap();
        ws.set_value(at("B2"), text("x")).unwrap();
        assert_eq!(ws.value(at("B2")), text("x"));
    }

    #[test]
    fn test_write_row_through_merge_is_atomic() {
        let mut ws = Worksheet::new("S");
        ws.merge(range("B1:C1")).unwrap();
        let err = ws
            .write_row(at("A1"), vec![text("a"), text("b"), text("c")])
            .unwrap_err();
        assert!(matches!(err, SheetError::MergedCell { .. }));
        assert_eq!(ws.value(at("A1")), CellValue::Empty);
    }

    #[test]
    fn test_merge_conflicts() {
        let mut ws = Worksheet::new("S");
        ws.merge(range("A1:B2")).unwrap();
        assert!(matches!(
            ws.merge(range("B2:C3")),
            Err(SheetError::MergeConflict { .. })
        ));
        assert!(matches!(
            ws.merge(range("D4")),
            Err(SheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unmerge_requires_exact_region() {
        let mut ws = Worksheet::new("S");
        ws.merge(range("A1:C3")).unwrap();
        assert!(matches!(
            ws.unmerge(range("A1:B2")),
            Err(SheetError::NotMerged(_))
        ));
        ws.unmerge(range("C3:A1")).unwrap();
        assert!(ws.merges().is_empty());
    }

    #[test]
    fn test_set_border_styles_every_cell() {
        let mut ws = Worksheet::new("S");
        ws.set_value(at("A1"), text("x")).unwrap();
        ws.set_border(range("A1:B2")).unwrap();
        for a1 in ["A1", "B1", "A2", "B2"] {
            assert_eq!(ws.style(at(a1)).borders, Borders::uniform(BorderLine::Thin));
        }
        assert_eq!(ws.value(at("A1")), text("x"));
        // Bordered blanks are not part of the used range.
        assert_eq!(
            ws.used_range(),
            UsedRange {
                min_row: 1,
                max_row: 1,
                min_col: 1,
                max_col: 1
            }
        );
    }

    #[test]
    fn test_oversized_range_rejected() {
        let ws = Worksheet::new("S");
        assert!(matches!(
            ws.read_range(range("A1:Z100000")),
            Err(SheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_oversized_merge_rejected() {
        let mut ws = Worksheet::new("S");
        assert!(matches!(
            ws.merge(range("A1:A1048576")),
            Err(SheetError::InvalidArgument(_))
        ));
        assert!(matches!(
            ws.merge(range("A1:XFD1048576")),
            Err(SheetError::InvalidArgument(_))
        ));
        assert!(ws.merges().is_empty());
    }

    #[test]
    fn test_used_range() {
        let mut ws = Worksheet::new("S");
        assert!(ws.used_range().is_empty());
        ws.set_value(at("C5"), CellValue::Number(1.0)).unwrap();
        ws.set_value(at("B7"), CellValue::Bool(true)).unwrap();
        assert_eq!(
            ws.used_range(),
            UsedRange {
                min_row: 5,
                max_row: 7,
                min_col: 2,
                max_col: 3
            }
        );
    }

    #[test]
    fn test_auto_fit_columns() {
        let mut ws = Worksheet::new("S");
        ws.write_column(at("A1"), vec![text("Name"), text("Alexandria")])
            .unwrap();
        ws.set_value(at("C1"), CellValue::Number(12345.0)).unwrap();
        ws.set_border(range("B1:B3")).unwrap();

        let adjusted = ws.auto_fit_columns();
        assert_eq!(adjusted, vec!["A", "C"]);
        assert_eq!(ws.column_width(1), Some(12.0));
        assert_eq!(ws.column_width(2), None);
        assert_eq!(ws.column_width(3), Some(7.0));
    }
}
