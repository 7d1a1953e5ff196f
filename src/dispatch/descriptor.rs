//! Static tool descriptors
//!
//! The same table drives capability advertisement (`tools/list`,
//! `GET /api/v1/tools`) and argument validation, so the two cannot drift.

use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{SheetError, SheetResult};

/// Semantic type of a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// A string.
    Text,
    /// A string, number, boolean or null cell value.
    Scalar,
    /// An array of scalar cell values.
    List,
    /// A boolean.
    Flag,
}

impl ArgKind {
    fn schema(self) -> Value {
        let scalar = json!(["string", "number", "boolean", "null"]);
        match self {
            ArgKind::Text => json!({ "type": "string" }),
            ArgKind::Scalar => json!({ "type": scalar }),
            ArgKind::List => json!({ "type": "array", "items": { "type": scalar } }),
            ArgKind::Flag => json!({ "type": "boolean" }),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ArgSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

const fn required(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        description,
        kind,
        required: true,
        default: None,
    }
}

const fn optional(name: &'static str, kind: ArgKind, description: &'static str) -> ArgSpec {
    ArgSpec {
        name,
        description,
        kind,
        required: false,
        default: None,
    }
}

/// Name, description and argument list of one tool.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub args: &'static [ArgSpec],
}

impl ToolDescriptor {
    /// JSON Schema for the argument object.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for arg in self.args {
            let mut schema = arg.kind.schema();
            schema["description"] = json!(arg.description);
            if let Some(default) = arg.default {
                schema["default"] = json!(default);
            }
            properties.insert(arg.name.to_string(), schema);
        }

        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check an argument object against [`Self::input_schema`].
    pub fn validate(&self, args: &Value) -> SheetResult<()> {
        let schema = self.input_schema();
        let compiled = JSONSchema::compile(&schema).map_err(|e| {
            SheetError::InvalidArgument(format!("schema for '{}' is invalid: {}", self.name, e))
        })?;

        if let Err(errors) = compiled.validate(args) {
            let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(SheetError::InvalidArgument(format!(
                "{}: {}",
                self.name,
                messages.join("; ")
            )));
        }
        Ok(())
    }
}

const FILENAME: ArgSpec = required(
    "filename",
    ArgKind::Text,
    "Workbook file name, relative to the documents root",
);
const SHEET: ArgSpec = required("sheet", ArgKind::Text, "Name of the sheet");
const CELL: ArgSpec = required("cell", ArgKind::Text, "Cell address in A1 notation (e.g. B2)");
const CELL_RANGE: ArgSpec = required(
    "cell_range",
    ArgKind::Text,
    "Cell range in A1 notation (e.g. A1:C3)",
);
const START_CELL: ArgSpec = required(
    "start_cell",
    ArgKind::Text,
    "First cell to write, in A1 notation",
);
const DATA: ArgSpec = required("data", ArgKind::List, "Values to write, in order");

/// Every tool this server offers.
pub static TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "create_excel_file",
        description: "Create a new Excel file with an initial sheet. Overwrites an existing file.",
        args: &[
            FILENAME,
            ArgSpec {
                name: "sheet_name",
                description: "Name of the initial sheet",
                kind: ArgKind::Text,
                required: false,
                default: Some("Sheet1"),
            },
        ],
    },
    ToolDescriptor {
        name: "add_sheet",
        description: "Add a new sheet to an existing Excel file.",
        args: &[
            FILENAME,
            required("sheet_name", ArgKind::Text, "Name of the new sheet"),
        ],
    },
    ToolDescriptor {
        name: "rename_sheet",
        description: "Rename a sheet in an Excel file, keeping its position.",
        args: &[
            FILENAME,
            required("old_name", ArgKind::Text, "Current name of the sheet"),
            required("new_name", ArgKind::Text, "New name for the sheet"),
        ],
    },
    ToolDescriptor {
        name: "delete_sheet",
        description: "Delete a sheet from an Excel file. The last sheet cannot be deleted.",
        args: &[
            FILENAME,
            required("sheet_name", ArgKind::Text, "Name of the sheet to delete"),
        ],
    },
    ToolDescriptor {
        name: "write_cell",
        description: "Write a value to a cell, optionally setting its font, fill and alignment.",
        args: &[
            FILENAME,
            SHEET,
            CELL,
            required("value", ArgKind::Scalar, "Value to write; text starting with '=' is stored as a formula"),
            optional("bold", ArgKind::Flag, "Bold font"),
            optional("italic", ArgKind::Flag, "Italic font"),
            optional("font_color", ArgKind::Text, "Font color as RRGGBB hex (default 000000)"),
            optional("bg_color", ArgKind::Text, "Solid background fill as RRGGBB hex"),
            optional("align", ArgKind::Text, "Horizontal alignment: left, center, right, justify, fill or general"),
        ],
    },
    ToolDescriptor {
        name: "read_cell",
        description: "Read the value of a cell. Returns null for an empty cell.",
        args: &[FILENAME, SHEET, CELL],
    },
    ToolDescriptor {
        name: "merge_cells",
        description: "Merge a range of cells. Only the top-left cell keeps its value.",
        args: &[FILENAME, SHEET, CELL_RANGE],
    },
    ToolDescriptor {
        name: "unmerge_cells",
        description: "Unmerge a merged range. The range must match the merged region exactly.",
        args: &[FILENAME, SHEET, CELL_RANGE],
    },
    ToolDescriptor {
        name: "write_row",
        description: "Write values left to right starting at a cell.",
        args: &[FILENAME, SHEET, START_CELL, DATA],
    },
    ToolDescriptor {
        name: "write_column",
        description: "Write values top to bottom starting at a cell.",
        args: &[FILENAME, SHEET, START_CELL, DATA],
    },
    ToolDescriptor {
        name: "set_border",
        description: "Apply a thin border on all four sides of every cell in a range.",
        args: &[FILENAME, SHEET, CELL_RANGE],
    },
    ToolDescriptor {
        name: "auto_fit_columns",
        description: "Set each used column's width to its longest value plus two characters.",
        args: &[FILENAME, SHEET],
    },
    ToolDescriptor {
        name: "get_used_range",
        description: "Bounding box (min_row, max_row, min_col, max_col) of the non-empty cells in a sheet.",
        args: &[FILENAME, SHEET],
    },
    ToolDescriptor {
        name: "read_range",
        description: "Read a range of cells as a row-major list of rows.",
        args: &[FILENAME, SHEET, CELL_RANGE],
    },
    ToolDescriptor {
        name: "write_formula",
        description: "Write a formula to a cell. The formula is stored, not evaluated.",
        args: &[
            FILENAME,
            SHEET,
            CELL,
            required("formula", ArgKind::Text, "Formula text, with or without the leading '='"),
        ],
    },
    ToolDescriptor {
        name: "save_as_new_file",
        description: "Save a copy of an Excel file under a new name.",
        args: &[
            required("old_filename", ArgKind::Text, "Existing file name"),
            required("new_filename", ArgKind::Text, "Name of the copy"),
        ],
    },
    ToolDescriptor {
        name: "list_sheets",
        description: "List the sheet names of an Excel file in order.",
        args: &[FILENAME],
    },
];

pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.name == name)
}
