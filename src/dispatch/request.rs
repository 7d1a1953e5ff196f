//! Typed tool requests
//!
//! Arguments are validated against the tool's JSON Schema first and then
//! deserialized into one struct per tool.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::descriptor;
use crate::error::{SheetError, SheetResult};
use crate::types::{normalize_color, CellValue, HorizontalAlign, StyleUpdate};

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFileArgs {
    pub filename: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetNameArgs {
    pub filename: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameSheetArgs {
    pub filename: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteCellArgs {
    pub filename: String,
    pub sheet: String,
    pub cell: String,
    pub value: Value,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub italic: Option<bool>,
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub align: Option<String>,
}

impl WriteCellArgs {
    pub fn style_update(&self) -> SheetResult<StyleUpdate> {
        Ok(StyleUpdate {
            bold: self.bold,
            italic: self.italic,
            font_color: self.font_color.as_deref().map(normalize_color).transpose()?,
            bg_color: self.bg_color.as_deref().map(normalize_color).transpose()?,
            align: self.align.as_deref().map(HorizontalAlign::parse).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellArgs {
    pub filename: String,
    pub sheet: String,
    pub cell: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeArgs {
    pub filename: String,
    pub sheet: String,
    pub cell_range: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesArgs {
    pub filename: String,
    pub sheet: String,
    pub start_cell: String,
    pub data: Vec<Value>,
}

impl SeriesArgs {
    pub fn values(&self) -> SheetResult<Vec<CellValue>> {
        self.data.iter().map(CellValue::from_json).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetArgs {
    pub filename: String,
    pub sheet: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormulaArgs {
    pub filename: String,
    pub sheet: String,
    pub cell: String,
    pub formula: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAsArgs {
    pub old_filename: String,
    pub new_filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileArgs {
    pub filename: String,
}

/// A parsed, schema-checked tool call.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    CreateFile(CreateFileArgs),
    AddSheet(SheetNameArgs),
    RenameSheet(RenameSheetArgs),
    DeleteSheet(SheetNameArgs),
    WriteCell(WriteCellArgs),
    ReadCell(CellArgs),
    MergeCells(RangeArgs),
    UnmergeCells(RangeArgs),
    WriteRow(SeriesArgs),
    WriteColumn(SeriesArgs),
    SetBorder(RangeArgs),
    AutoFitColumns(SheetArgs),
    GetUsedRange(SheetArgs),
    ReadRange(RangeArgs),
    WriteFormula(FormulaArgs),
    SaveAs(SaveAsArgs),
    ListSheets(FileArgs),
}

fn decode<T: DeserializeOwned>(tool: &str, args: Value) -> SheetResult<T> {
    serde_json::from_value(args)
        .map_err(|e| SheetError::InvalidArgument(format!("{}: {}", tool, e)))
}

impl ToolRequest {
    /// Validate `args` for tool `name` and decode them.
    ///
    /// A missing or null argument object counts as `{}`.
    pub fn parse(name: &str, args: &Value) -> SheetResult<Self> {
        let tool = descriptor::find(name).ok_or_else(|| SheetError::UnknownTool(name.to_string()))?;

        let args = match args {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        tool.validate(&args)?;

        let request = match tool.name {
            "create_excel_file" => Self::CreateFile(decode(name, args)?),
            "add_sheet" => Self::AddSheet(decode(name, args)?),
            "rename_sheet" => Self::RenameSheet(decode(name, args)?),
            "delete_sheet" => Self::DeleteSheet(decode(name, args)?),
            "write_cell" => Self::WriteCell(decode(name, args)?),
            "read_cell" => Self::ReadCell(decode(name, args)?),
            "merge_cells" => Self::MergeCells(decode(name, args)?),
            "unmerge_cells" => Self::UnmergeCells(decode(name, args)?),
            "write_row" => Self::WriteRow(decode(name, args)?),
            "write_column" => Self::WriteColumn(decode(name, args)?),
            "set_border" => Self::SetBorder(decode(name, args)?),
            "auto_fit_columns" => Self::AutoFitColumns(decode(name, args)?),
            "get_used_range" => Self::GetUsedRange(decode(name, args)?),
            "read_range" => Self::ReadRange(decode(name, args)?),
            "write_formula" => Self::WriteFormula(decode(name, args)?),
            "save_as_new_file" => Self::SaveAs(decode(name, args)?),
            "list_sheets" => Self::ListSheets(decode(name, args)?),
            other => return Err(SheetError::UnknownTool(other.to_string())),
        };
        Ok(request)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateFile(_) => "create_excel_file",
            Self::AddSheet(_) => "add_sheet",
            Self::RenameSheet(_) => "rename_sheet",
            Self::DeleteSheet(_) => "delete_sheet",
            Self::WriteCell(_) => "write_cell",
            Self::ReadCell(_) => "read_cell",
            Self::MergeCells(_) => "merge_cells",
            Self::UnmergeCells(_) => "unmerge_cells",
            Self::WriteRow(_) => "write_row",
            Self::WriteColumn(_) => "write_column",
            Self::SetBorder(_) => "set_border",
            Self::AutoFitColumns(_) => "auto_fit_columns",
            Self::GetUsedRange(_) => "get_used_range",
            Self::ReadRange(_) => "read_range",
            Self::WriteFormula(_) => "write_formula",
            Self::SaveAs(_) => "save_as_new_file",
            Self::ListSheets(_) => "list_sheets",
        }
    }

    /// File names the request touches, in argument order.
    pub fn filenames(&self) -> Vec<&str> {
        match self {
            Self::CreateFile(a) => vec![a.filename.as_str()],
            Self::AddSheet(a) | Self::DeleteSheet(a) => vec![a.filename.as_str()],
            Self::RenameSheet(a) => vec![a.filename.as_str()],
            Self::WriteCell(a) => vec![a.filename.as_str()],
            Self::ReadCell(a) => vec![a.filename.as_str()],
            Self::MergeCells(a) | Self::UnmergeCells(a) | Self::SetBorder(a) | Self::ReadRange(a) => {
                vec![a.filename.as_str()]
            }
            Self::WriteRow(a) | Self::WriteColumn(a) => vec![a.filename.as_str()],
            Self::AutoFitColumns(a) | Self::GetUsedRange(a) => vec![a.filename.as_str()],
            Self::WriteFormula(a) => vec![a.filename.as_str()],
            Self::SaveAs(a) => vec![a.old_filename.as_str(), a.new_filename.as_str()],
            Self::ListSheets(a) => vec![a.filename.as_str()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_applies_default_sheet_name() {
        let request = ToolRequest::parse("create_excel_file", &json!({"filename": "a.xlsx"})).unwrap();
        match request {
            ToolRequest::CreateFile(args) => assert_eq!(args.sheet_name, "Sheet1"),
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = ToolRequest::parse("greet_user", &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Unknown tool: greet_user");
    }

    #[test]
    fn test_parse_missing_required_argument() {
        let err = ToolRequest::parse("add_sheet", &json!({"filename": "a.xlsx"})).unwrap_err();
        assert!(matches!(err, SheetError::InvalidArgument(_)));

        let err = ToolRequest::parse("list_sheets", &Value::Null).unwrap_err();
        assert!(matches!(err, SheetError::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_mistyped_argument() {
        let err = ToolRequest::parse(
            "write_cell",
            &json!({"filename": "a.xlsx", "sheet": "S", "cell": "A1", "value": 1, "bold": "yes"}),
        )
        .unwrap_err();
        assert!(matches!(err, SheetError::InvalidArgument(_)));
    }

    #[test]
    fn test_save_as_touches_both_files() {
        let request = ToolRequest::parse(
            "save_as_new_file",
            &json!({"old_filename": "a.xlsx", "new_filename": "b.xlsx"}),
        )
        .unwrap();
        assert_eq!(request.name(), "save_as_new_file");
        assert_eq!(request.filenames(), vec!["a.xlsx", "b.xlsx"]);
    }

    #[test]
    fn test_style_update_from_args() {
        let request = ToolRequest::parse(
            "write_cell",
            &json!({
                "filename": "a.xlsx", "sheet": "S", "cell": "A1", "value": "x",
                "bold": true, "font_color": "#ff0000", "align": "center"
            }),
        )
        .unwrap();
        let ToolRequest::WriteCell(args) = request else {
            panic!("expected write_cell");
        };
        let update = args.style_update().unwrap();
        assert_eq!(update.bold, Some(true));
        assert_eq!(update.font_color.as_deref(), Some("FF0000"));
        assert_eq!(update.align, Some(HorizontalAlign::Center));
        assert!(update.bg_color.is_none());
    }

    #[test]
    fn test_bad_color_is_invalid_argument() {
        let ToolRequest::WriteCell(args) = ToolRequest::parse(
            "write_cell",
            &json!({"filename": "a.xlsx", "sheet": "S", "cell": "A1", "value": "x", "bg_color": "yellow"}),
        )
        .unwrap() else {
            panic!("expected write_cell");
        };
        assert!(matches!(
            args.style_update(),
            Err(SheetError::InvalidArgument(_))
        ));
    }
}
