use serde::Serialize;
use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("File not found: {0}")]
    DocumentNotFound(String),

    #[error("Sheet '{0}' does not exist")]
    SheetNotFound(String),

    #[error("Not a valid spreadsheet file: {0}")]
    InvalidFormat(String),

    #[error("Invalid cell address: '{0}'")]
    InvalidAddress(String),

    #[error("Invalid cell range: '{0}'")]
    InvalidRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Path '{0}' is outside the workspace root")]
    PathOutsideRoot(String),

    #[error("Cannot delete '{0}': a workbook must keep at least one sheet")]
    LastSheet(String),

    #[error("Range {0} is not merged")]
    NotMerged(String),

    #[error("Cell {cell} is covered by merged range {range}; only {anchor} can hold a value")]
    MergedCell {
        cell: String,
        range: String,
        anchor: String,
    },

    #[error("Sheet '{0}' already exists")]
    SheetExists(String),

    #[error("Range {range} overlaps merged range {existing}")]
    MergeConflict { range: String, existing: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write spreadsheet: {0}")]
    Write(String),
}

/// Coarse error category surfaced to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    InvalidArgument,
    InvalidState,
    Conflict,
    UnknownOperation,
    Io,
}

impl SheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::DocumentNotFound(_) | SheetError::SheetNotFound(_) => ErrorKind::NotFound,
            SheetError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            SheetError::InvalidAddress(_)
            | SheetError::InvalidRange(_)
            | SheetError::InvalidArgument(_)
            | SheetError::PathOutsideRoot(_) => ErrorKind::InvalidArgument,
            SheetError::LastSheet(_) | SheetError::NotMerged(_) | SheetError::MergedCell { .. } => {
                ErrorKind::InvalidState
            }
            SheetError::SheetExists(_) | SheetError::MergeConflict { .. } => ErrorKind::Conflict,
            SheetError::UnknownTool(_) => ErrorKind::UnknownOperation,
            SheetError::Io(_) | SheetError::Write(_) => ErrorKind::Io,
        }
    }
}

/// Serializable description of a failure, for resource listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub error: String,
    pub error_kind: ErrorKind,
}

impl From<&SheetError> for ErrorReport {
    fn from(err: &SheetError) -> Self {
        Self {
            error: err.to_string(),
            error_kind: err.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            SheetError::DocumentNotFound("a.xlsx".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            SheetError::InvalidAddress("1A".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            SheetError::LastSheet("Sheet1".into()).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            SheetError::SheetExists("Data".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            SheetError::UnknownTool("nope".into()).kind(),
            ErrorKind::UnknownOperation
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidArgument).unwrap();
        assert_eq!(json, "\"invalid_argument\"");
    }

    #[test]
    fn test_error_report() {
        let err = SheetError::SheetNotFound("Data".into());
        let report = ErrorReport::from(&err);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "error": "Sheet 'Data' does not exist",
                "error_kind": "not_found"
            })
        );
    }

    #[test]
    fn test_messages() {
        let err = SheetError::MergeConflict {
            range: "B2:C3".into(),
            existing: "A1:B2".into(),
        };
        assert_eq!(err.to_string(), "Range B2:C3 overlaps merged range A1:B2");
        assert_eq!(
            SheetError::UnknownTool("greet".into()).to_string(),
            "Unknown tool: greet"
        );
    }
}
