//! A1-style cell addresses and rectangular ranges
//!
//! Rows and columns are 1-indexed everywhere in this crate. The codec
//! converts to the 0-indexed coordinates used by calamine and
//! rust_xlsxwriter at the file boundary.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{SheetError, SheetResult};

/// Last addressable row in an .xlsx worksheet.
pub const MAX_ROW: u32 = 1_048_576;
/// Last addressable column (XFD).
pub const MAX_COL: u32 = 16_384;

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").expect("valid regex"))
}

/// Convert a 1-based column number to its letters (1 -> A, 27 -> AA).
pub fn column_letter(col: u32) -> String {
    let mut result = String::new();
    let mut idx = col.saturating_sub(1);

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Convert column letters to a 1-based column number (A -> 1, AA -> 27).
pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Some(col)
}

/// A single cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(row: u32, col: u32) -> SheetResult<Self> {
        if row == 0 || row > MAX_ROW || col == 0 || col > MAX_COL {
            return Err(SheetError::InvalidAddress(format!("R{}C{}", row, col)));
        }
        Ok(Self { row, col })
    }

    /// Parse "C7", "c7" or "$C$7".
    pub fn parse(input: &str) -> SheetResult<Self> {
        let trimmed = input.trim();
        let caps = address_regex()
            .captures(trimmed)
            .ok_or_else(|| SheetError::InvalidAddress(input.to_string()))?;

        let col = column_number(&caps[1])
            .ok_or_else(|| SheetError::InvalidAddress(input.to_string()))?;
        let row: u32 = caps[2]
            .parse()
            .map_err(|_| SheetError::InvalidAddress(input.to_string()))?;

        Self::new(row, col).map_err(|_| SheetError::InvalidAddress(input.to_string()))
    }

    /// Step `n` cells to the right.
    pub fn right(self, n: usize) -> SheetResult<Self> {
        let col = u32::try_from(n)
            .ok()
            .and_then(|n| self.col.checked_add(n))
            .filter(|c| *c <= MAX_COL)
            .ok_or_else(|| {
                SheetError::InvalidArgument(format!("writing {} cells right of {} passes column XFD", n, self))
            })?;
        Ok(Self { row: self.row, col })
    }

    /// Step `n` cells down.
    pub fn down(self, n: usize) -> SheetResult<Self> {
        let row = u32::try_from(n)
            .ok()
            .and_then(|n| self.row.checked_add(n))
            .filter(|r| *r <= MAX_ROW)
            .ok_or_else(|| {
                SheetError::InvalidArgument(format!("writing {} cells below {} passes row {}", n, self, MAX_ROW))
            })?;
        Ok(Self { row, col: self.col })
    }

    /// Zero-based (row, col) as used by calamine and rust_xlsxwriter.
    pub fn zero_based(self) -> (u32, u16) {
        (self.row - 1, (self.col - 1) as u16)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A normalized rectangle: `start` is top-left, `end` is bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Build from two corners in any order.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        Self {
            start: CellRef {
                row: a.row.min(b.row),
                col: a.col.min(b.col),
            },
            end: CellRef {
                row: a.row.max(b.row),
                col: a.col.max(b.col),
            },
        }
    }

    /// Parse "A1:B2". A bare address is a 1x1 range.
    pub fn parse(input: &str) -> SheetResult<Self> {
        let trimmed = input.trim();
        let mut parts = trimmed.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() || first.is_empty() {
            return Err(SheetError::InvalidRange(input.to_string()));
        }

        let invalid = |_| SheetError::InvalidRange(input.to_string());
        let a = CellRef::parse(first).map_err(invalid)?;
        let b = match second {
            Some(s) => CellRef::parse(s).map_err(invalid)?,
            None => a,
        };
        Ok(Self::new(a, b))
    }

    pub fn rows(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows()) * u64::from(self.cols())
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.start.row <= other.end.row
            && other.start.row <= self.end.row
            && self.start.col <= other.end.col
            && other.start.col <= self.end.col
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellRef { row, col })
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for CellRange {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
