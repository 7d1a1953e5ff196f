use std::fmt;

use serde_json::{json, Value};

use crate::types::CellValue;

/// Result of a successful tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Confirmation text for a mutation.
    Message(String),
    /// A single cell value.
    Value(CellValue),
    /// Structured data: used range, range contents, sheet lists.
    Json(Value),
}

impl ToolOutput {
    /// Text sent back to agents. Empty cells render as `null`.
    pub fn to_text(&self) -> String {
        match self {
            ToolOutput::Message(message) => message.clone(),
            ToolOutput::Value(value) => value.display_text().unwrap_or_else(|| "null".to_string()),
            ToolOutput::Json(value) => value.to_string(),
        }
    }

    /// JSON payload for the HTTP API.
    pub fn to_json(&self) -> Value {
        match self {
            ToolOutput::Message(message) => json!({ "message": message }),
            ToolOutput::Value(value) => json!({ "value": value }),
            ToolOutput::Json(value) => value.clone(),
        }
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_rendering() {
        assert_eq!(ToolOutput::Message("done".into()).to_text(), "done");
        assert_eq!(ToolOutput::Value(CellValue::Empty).to_text(), "null");
        assert_eq!(ToolOutput::Value(CellValue::Number(3.0)).to_text(), "3");
        assert_eq!(
            ToolOutput::Json(json!([["x", 1, null]])).to_text(),
            r#"[["x",1,null]]"#
        );
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(
            ToolOutput::Value(CellValue::Text("Revenue".into())).to_json(),
            json!({"value": "Revenue"})
        );
        assert_eq!(
            ToolOutput::Value(CellValue::Empty).to_json(),
            json!({"value": null})
        );
    }
}
