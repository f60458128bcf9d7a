//! Spreadsheet-style coordinates: column letters and `A1:B5` ranges.

use once_cell::sync::Lazy;
use regex::Regex;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)([0-9]+)(?::([A-Za-z]+)([0-9]+))?$").expect("valid range regex")
});

/// Inclusive cell rectangle with 0-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: usize,
    pub last_row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

/// Parses a column label (`A` = 0, `Z` = 25, `AA` = 26), case-insensitive.
pub fn parse_column(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut index: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Renders a 0-based column index as its label.
pub fn column_label(mut index: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}

/// Parses `B2` or `A1:C4` into a 0-based inclusive range.
///
/// Rows are 1-based in the input; row `0`, reversed bounds and malformed
/// text yield `None`.
pub fn parse_range(text: &str) -> Option<CellRange> {
    let captures = RANGE_RE.captures(text.trim())?;
    let first_col = parse_column(&captures[1])?;
    let first_row = parse_row(&captures[2])?;
    let (last_col, last_row) = match (captures.get(3), captures.get(4)) {
        (Some(col), Some(row)) => (parse_column(col.as_str())?, parse_row(row.as_str())?),
        _ => (first_col, first_row),
    };
    if last_col < first_col || last_row < first_row {
        return None;
    }
    Some(CellRange {
        first_row,
        last_row,
        first_col,
        last_col,
    })
}

/// Parses a 1-based row number into a 0-based index.
pub fn parse_row(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok()?.checked_sub(1)
}
