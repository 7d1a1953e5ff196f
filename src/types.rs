//! Core value and style types shared by the workbook model, the codec and the dispatcher

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{SheetError, SheetResult};

/// Longest string Excel stores in one cell.
pub const MAX_TEXT_LEN: usize = 32_767;

/// Content of a single cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula text including the leading `=`. Never evaluated.
    Formula(String),
}

impl CellValue {
    /// Text input, with `=`-prefixed strings stored as formulas.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let has_body = text
            .strip_prefix('=')
            .is_some_and(|body| !body.trim().is_empty());
        if text.is_empty() {
            CellValue::Empty
        } else if has_body {
            CellValue::Formula(text)
        } else {
            CellValue::Text(text)
        }
    }

    /// Formula text with exactly one leading `=`. An empty body is rejected.
    pub fn formula(formula: &str) -> SheetResult<Self> {
        let body = formula.trim().trim_start_matches('=').trim_start();
        if body.is_empty() {
            return Err(SheetError::InvalidArgument(format!(
                "formula '{}' has no expression",
                formula
            )));
        }
        Ok(CellValue::Formula(format!("={}", body)))
    }

    /// Convert a JSON tool argument into a cell value.
    pub fn from_json(value: &Value) -> SheetResult<Self> {
        match value {
            Value::Null => Ok(CellValue::Empty),
            Value::Bool(b) => Ok(CellValue::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .ok_or_else(|| SheetError::InvalidArgument(format!("number {} is out of range", n))),
            Value::String(s) if s.chars().count() > MAX_TEXT_LEN => {
                Err(SheetError::InvalidArgument(format!(
                    "text of {} characters exceeds Excel's limit of {}",
                    s.chars().count(),
                    MAX_TEXT_LEN
                )))
            }
            Value::String(s) => Ok(CellValue::from_text(s.as_str())),
            other => Err(SheetError::InvalidArgument(format!(
                "cell values must be text, numbers, booleans or null, got {}",
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text shown for the value, `None` when empty.
    pub fn display_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            other => Some(other.to_string()),
        }
    }
}

/// Format a number for display, dropping a redundant `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) | CellValue::Formula(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) | CellValue::Formula(s) => serializer.serialize_str(s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// Horizontal alignment of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
    Right,
    Justify,
    Fill,
}

impl HorizontalAlign {
    pub fn parse(s: &str) -> SheetResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(Self::General),
            "left" => Ok(Self::Left),
            "center" | "centre" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            "justify" => Ok(Self::Justify),
            "fill" => Ok(Self::Fill),
            other => Err(SheetError::InvalidArgument(format!(
                "unknown alignment '{}' (expected left, center, right, justify, fill or general)",
                other
            ))),
        }
    }
}

/// Border line style of one cell edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BorderLine {
    Thin,
    Medium,
    Thick,
    Double,
    Dashed,
    Dotted,
    Hair,
}

impl BorderLine {
    /// Map an OOXML `style` attribute. Unsupported decorative styles read as thin.
    pub fn from_ooxml(s: &str) -> Option<Self> {
        match s {
            "" | "none" => None,
            "thin" => Some(Self::Thin),
            "medium" | "mediumDashed" | "mediumDashDot" | "mediumDashDotDot" => Some(Self::Medium),
            "thick" => Some(Self::Thick),
            "double" => Some(Self::Double),
            "dashed" | "dashDot" | "dashDotDot" | "slantDashDot" => Some(Self::Dashed),
            "dotted" => Some(Self::Dotted),
            "hair" => Some(Self::Hair),
            _ => Some(Self::Thin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Borders {
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
}

impl Borders {
    pub fn uniform(line: BorderLine) -> Self {
        Self {
            left: Some(line),
            right: Some(line),
            top: Some(line),
            bottom: Some(line),
        }
    }
}

/// Display attributes of a cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    /// RRGGBB, upper case.
    pub font_color: Option<String>,
    /// RRGGBB, upper case. Applied as a solid fill.
    pub bg_color: Option<String>,
    pub align: Option<HorizontalAlign>,
    pub borders: Borders,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}

/// Style arguments of a single write.
///
/// When any field is set the font and alignment are replaced as a unit,
/// with unset fields taking their defaults. The fill changes only when
/// `bg_color` is given and borders are never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleUpdate {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub font_color: Option<String>,
    pub bg_color: Option<String>,
    pub align: Option<HorizontalAlign>,
}

pub const DEFAULT_FONT_COLOR: &str = "000000";

impl StyleUpdate {
    pub fn is_empty(&self) -> bool {
        *self == StyleUpdate::default()
    }

    pub fn apply(&self, current: &CellStyle) -> CellStyle {
        if self.is_empty() {
            return current.clone();
        }
        CellStyle {
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            font_color: Some(
                self.font_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FONT_COLOR.to_string()),
            ),
            bg_color: self.bg_color.clone().or_else(|| current.bg_color.clone()),
            align: Some(self.align.unwrap_or(HorizontalAlign::Left)),
            borders: current.borders,
        }
    }
}

/// Normalize "#ff0000" / "FF0000" / "FFFF0000" (ARGB) into "FF0000".
pub fn normalize_color(input: &str) -> SheetResult<String> {
    let hex = input.trim().trim_start_matches('#');
    let rgb = match hex.len() {
        6 => hex,
        8 => &hex[2..],
        _ => {
            return Err(SheetError::InvalidArgument(format!(
                "color '{}' must be six hex digits (RRGGBB)",
                input
            )))
        }
    };
    if !rgb.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SheetError::InvalidArgument(format!(
            "color '{}' must be six hex digits (RRGGBB)",
            input
        )));
    }
    Ok(rgb.to_ascii_uppercase())
}

/// Bounding box of non-empty cells. All zero for an empty sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UsedRange {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl UsedRange {
    pub fn is_empty(&self) -> bool {
        self.min_row == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_text_detects_formula() {
        assert_eq!(
            CellValue::from_text("=SUM(A1:A3)"),
            CellValue::Formula("=SUM(A1:A3)".into())
        );
        assert_eq!(CellValue::from_text("="), CellValue::Text("=".into()));
        assert_eq!(CellValue::from_text(""), CellValue::Empty);
        assert_eq!(CellValue::from_text("plain"), CellValue::Text("plain".into()));
    }

    #[test]
    fn test_formula_marker_not_doubled() {
        assert_eq!(
            CellValue::formula("SUM(A1)").unwrap(),
            CellValue::Formula("=SUM(A1)".into())
        );
        assert_eq!(
            CellValue::formula("=SUM(A1)").unwrap(),
            CellValue::Formula("=SUM(A1)".into())
        );
    }

    #[test]
    fn test_empty_formula_rejected() {
        for input in ["", "=", "   ", " = "] {
            assert!(
                matches!(CellValue::formula(input), Err(SheetError::InvalidArgument(_))),
                "{:?} was accepted",
                input
            );
        }
        assert_eq!(CellValue::from_text("=  "), CellValue::Text("=  ".into()));
    }

    #[test]
    fn test_text_over_excel_limit_rejected() {
        let long = "x".repeat(MAX_TEXT_LEN + 1);
        assert!(matches!(
            CellValue::from_json(&json!(long)),
            Err(SheetError::InvalidArgument(_))
        ));
        let exact = "x".repeat(MAX_TEXT_LEN);
        assert_eq!(
            CellValue::from_json(&json!(exact)).unwrap(),
            CellValue::Text(exact)
        );
    }

    #[test]
    fn test_from_json() {
        assert_eq!(CellValue::from_json(&json!(null)).unwrap(), CellValue::Empty);
        assert_eq!(CellValue::from_json(&json!(true)).unwrap(), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&json!(2.5)).unwrap(), CellValue::Number(2.5));
        assert_eq!(
            CellValue::from_json(&json!("x")).unwrap(),
            CellValue::Text("x".into())
        );
        assert!(matches!(
            CellValue::from_json(&json!([1, 2])),
            Err(SheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_display_and_serialize_numbers() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(serde_json::to_value(CellValue::Number(42.0)).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(CellValue::Number(0.25)).unwrap(), json!(0.25));
        assert_eq!(serde_json::to_value(CellValue::Empty).unwrap(), json!(null));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#ff0000").unwrap(), "FF0000");
        assert_eq!(normalize_color("FFFFFF00").unwrap(), "FFFF00");
        assert!(normalize_color("red").is_err());
        assert!(normalize_color("#12345").is_err());
    }

    #[test]
    fn test_style_update_keeps_style_when_empty() {
        let current = CellStyle {
            bold: true,
            bg_color: Some("FFFF00".into()),
            ..CellStyle::default()
        };
        assert_eq!(StyleUpdate::default().apply(&current), current);
    }

    #[test]
    fn test_style_update_resets_font_and_keeps_fill_and_borders() {
        let current = CellStyle {
            bold: true,
            italic: true,
            bg_color: Some("FFFF00".into()),
            borders: Borders::uniform(BorderLine::Thin),
            ..CellStyle::default()
        };
        let update = StyleUpdate {
            italic: Some(true),
            ..StyleUpdate::default()
        };
        let next = update.apply(&current);
        assert!(!next.bold);
        assert!(next.italic);
        assert_eq!(next.font_color.as_deref(), Some("000000"));
        assert_eq!(next.align, Some(HorizontalAlign::Left));
        assert_eq!(next.bg_color.as_deref(), Some("FFFF00"));
        assert_eq!(next.borders, Borders::uniform(BorderLine::Thin));
    }

    #[test]
    fn test_align_parse() {
        assert_eq!(HorizontalAlign::parse("Center").unwrap(), HorizontalAlign::Center);
        assert!(HorizontalAlign::parse("middle").is_err());
    }
}
