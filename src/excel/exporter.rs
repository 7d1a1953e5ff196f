//! Excel exporter: workbook model → .xlsx

use crate::error::{SheetError, SheetResult};
use crate::types::{BorderLine, CellStyle, CellValue, HorizontalAlign};
use crate::workbook::{Workbook as SheetBook, Worksheet as SheetModel};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, Formula, Workbook, Worksheet,
    XlsxError,
};
use std::io::Write;
use std::path::Path;

fn write_error(context: &str, err: XlsxError) -> SheetError {
    SheetError::Write(format!("{}: {}", context, err))
}

/// Serializes a workbook model into an .xlsx package
pub struct ExcelExporter<'a> {
    book: &'a SheetBook,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(book: &'a SheetBook) -> Self {
        Self { book }
    }

    /// Render the whole package in memory.
    pub fn to_buffer(&self) -> SheetResult<Vec<u8>> {
        let mut workbook = Workbook::new();

        for sheet in self.book.sheets() {
            let worksheet = workbook.add_worksheet();
            Self::export_sheet(worksheet, sheet)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| write_error("Failed to serialize workbook", e))
    }

    /// Write to `output_path`, replacing any existing file.
    ///
    /// The package is written to a temp file in the same directory and then
    /// renamed over the target, so readers never observe a partial file.
    pub fn export(&self, output_path: &Path) -> SheetResult<()> {
        let buffer = self.to_buffer()?;

        let dir = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(&buffer)?;
        staged.as_file().sync_all()?;
        staged.persist(output_path).map_err(|e| SheetError::Io(e.error))?;

        Ok(())
    }

    fn export_sheet(worksheet: &mut Worksheet, sheet: &SheetModel) -> SheetResult<()> {
        worksheet
            .set_name(sheet.name())
            .map_err(|e| write_error("Failed to set worksheet name", e))?;

        for (&col, &width) in sheet.column_widths() {
            worksheet
                .set_column_width((col - 1) as u16, width)
                .map_err(|e| write_error("Failed to set column width", e))?;
        }

        // Merges go first; anchor values and styles are written over them below.
        let blank = Format::new();
        for range in sheet.merges() {
            let (first_row, first_col) = range.start.zero_based();
            let (last_row, last_col) = range.end.zero_based();
            worksheet
                .merge_range(first_row, first_col, last_row, last_col, "", &blank)
                .map_err(|e| write_error(&format!("Failed to merge {}", range), e))?;
        }

        for (at, cell) in sheet.cells() {
            let (row, col) = at.zero_based();
            let format = build_format(&cell.style);
            let written = match &cell.value {
                CellValue::Empty => worksheet.write_blank(row, col, &format),
                CellValue::Text(text) => worksheet.write_string_with_format(row, col, text, &format),
                CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, &format),
                CellValue::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, &format),
                CellValue::Formula(f) => {
                    worksheet.write_formula_with_format(row, col, Formula::new(f), &format)
                }
            };
            written.map_err(|e| write_error(&format!("Failed to write {}", at), e))?;
        }

        Ok(())
    }
}

fn rgb(hex: &str) -> Color {
    Color::RGB(u32::from_str_radix(hex, 16).unwrap_or(0))
}

fn border(line: BorderLine) -> FormatBorder {
    match line {
        BorderLine::Thin => FormatBorder::Thin,
        BorderLine::Medium => FormatBorder::Medium,
        BorderLine::Thick => FormatBorder::Thick,
        BorderLine::Double => FormatBorder::Double,
        BorderLine::Dashed => FormatBorder::Dashed,
        BorderLine::Dotted => FormatBorder::Dotted,
        BorderLine::Hair => FormatBorder::Hair,
    }
}

fn align(align: HorizontalAlign) -> FormatAlign {
    match align {
        HorizontalAlign::General => FormatAlign::General,
        HorizontalAlign::Left => FormatAlign::Left,
        HorizontalAlign::Center => FormatAlign::Center,
        HorizontalAlign::Right => FormatAlign::Right,
        HorizontalAlign::Justify => FormatAlign::Justify,
        HorizontalAlign::Fill => FormatAlign::Fill,
    }
}

/// Translate a cell style into a rust_xlsxwriter format.
pub(crate) fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    if let Some(color) = &style.font_color {
        format = format.set_font_color(rgb(color));
    }
    if let Some(color) = &style.bg_color {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(rgb(color));
    }
    if let Some(a) = style.align {
        format = format.set_align(align(a));
    }

    let edges = &style.borders;
    if let Some(line) = edges.left {
        format = format.set_border_left(border(line));
    }
    if let Some(line) = edges.right {
        format = format.set_border_right(border(line));
    }
    if let Some(line) = edges.top {
        format = format.set_border_top(border(line));
    }
    if let Some(line) = edges.bottom {
        format = format.set_border_bottom(border(line));
    }

    format
}
