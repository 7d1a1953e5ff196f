//! In-memory workbook model
//!
//! This is the object graph the codec loads into and saves from. Every
//! structural rule (unique sheet names, at least one sheet, merge anchors)
//! is enforced here so the document operations stay thin.

mod worksheet;

pub use worksheet::{Cell, Worksheet};

use crate::error::{SheetError, SheetResult};

/// Sheet title length limit imposed by Excel.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Check a sheet title against Excel's naming rules.
pub fn validate_sheet_name(name: &str) -> SheetResult<()> {
    if name.is_empty() {
        return Err(SheetError::InvalidArgument(
            "sheet name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN {
        return Err(SheetError::InvalidArgument(format!(
            "sheet name '{}' is longer than {} characters",
            name, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(SheetError::InvalidArgument(format!(
            "sheet name '{}' contains forbidden character '{}'",
            name, ch
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(SheetError::InvalidArgument(format!(
            "sheet name '{}' must not start or end with an apostrophe",
            name
        )));
    }
    Ok(())
}

/// An ordered collection of uniquely named worksheets.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// New workbook with a single empty sheet.
    pub fn new(sheet_name: &str) -> SheetResult<Self> {
        validate_sheet_name(sheet_name)?;
        Ok(Self {
            sheets: vec![Worksheet::new(sheet_name)],
        })
    }

    /// Assemble from loaded sheets. Used by the codec.
    pub fn from_sheets(sheets: Vec<Worksheet>) -> SheetResult<Self> {
        if sheets.is_empty() {
            return Err(SheetError::InvalidFormat(
                "workbook contains no worksheets".to_string(),
            ));
        }
        Ok(Self { sheets })
    }

    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name().to_string()).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|s| s.name() == name)
    }

    fn name_taken(&self, name: &str, except: Option<usize>) -> bool {
        self.sheets
            .iter()
            .enumerate()
            .any(|(i, s)| Some(i) != except && s.name().eq_ignore_ascii_case(name))
    }

    pub fn sheet(&self, name: &str) -> SheetResult<&Worksheet> {
        self.position(name)
            .map(|i| &self.sheets[i])
            .ok_or_else(|| SheetError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_mut(&mut self, name: &str) -> SheetResult<&mut Worksheet> {
        match self.position(name) {
            Some(i) => Ok(&mut self.sheets[i]),
            None => Err(SheetError::SheetNotFound(name.to_string())),
        }
    }

    /// Append a new empty sheet.
    pub fn add_sheet(&mut self, name: &str) -> SheetResult<&mut Worksheet> {
        validate_sheet_name(name)?;
        if self.name_taken(name, None) {
            return Err(SheetError::SheetExists(name.to_string()));
        }
        self.sheets.push(Worksheet::new(name));
        let last = self.sheets.len() - 1;
        Ok(&mut self.sheets[last])
    }

    /// Rename in place; position is kept.
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> SheetResult<()> {
        let index = self
            .position(old_name)
            .ok_or_else(|| SheetError::SheetNotFound(old_name.to_string()))?;
        validate_sheet_name(new_name)?;
        if self.name_taken(new_name, Some(index)) {
            return Err(SheetError::SheetExists(new_name.to_string()));
        }
        self.sheets[index].set_name(new_name);
        Ok(())
    }

    pub fn delete_sheet(&mut self, name: &str) -> SheetResult<()> {
        let index = self
            .position(name)
            .ok_or_else(|| SheetError::SheetNotFound(name.to_string()))?;
        if self.sheets.len() == 1 {
            return Err(SheetError::LastSheet(name.to_string()));
        }
        self.sheets.remove(index);
        Ok(())
    }
}
