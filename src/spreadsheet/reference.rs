//! Conversions between 0-based (row, column) indexes and A1-style references.

use regex::Regex;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)$").expect("Hardcode regex pattern"))
}

/// Converts a 0-based column index to column letters (0 = A, 26 = AA).
pub fn col_to_name(col: usize) -> String {
    let mut column = col + 1;
    let mut name = Vec::<char>::new();
    while column > 0 {
        column -= 1;
        name.push(char::from(b'A' + (column % 26) as u8));
        column /= 26;
    }
    name.iter().rev().collect()
}

/// Converts column letters to a 0-based column index.
pub fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .map(|byte| (byte - b'A') as usize + 1)
        .reduce(|index, digit| index * 26 + digit)
        .map(|column| column - 1)
}

/// Converts a 1-based row number string to a 0-based row index.
pub fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}

/// Converts 0-based indexes to an A1-style reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", col_to_name(col), row + 1)
}

/// Parses an A1-style reference (absolute markers allowed) into 0-based indexes.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = reference_pattern().captures(reference.trim())?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}
