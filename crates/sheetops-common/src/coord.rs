//! A1-style position codec.
//!
//! Grid coordinates are 0-based `(row, column)` pairs. Their textual form is
//! the familiar spreadsheet position: bijective base-26 column letters followed
//! by the 1-based row number (`(0, 0) -> "A1"`, `(9, 27) -> "AB10"`). The
//! encoding is total over non-negative coordinates and [`parse_a1`] inverts
//! [`to_a1`] exactly.

use thiserror::Error;

/// Errors returned when decoding an A1 position.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum A1ParseError {
    #[error("position is empty")]
    Empty,
    #[error("position `{0}` has no column letters")]
    MissingColumn(String),
    #[error("position `{0}` has no row number")]
    MissingRow(String),
    #[error("position `{input}` contains unexpected character `{ch}`")]
    InvalidCharacter { input: String, ch: char },
    #[error("row numbers are 1-based; `{0}` uses row 0")]
    ZeroRow(String),
    #[error("position `{0}` exceeds the addressable range")]
    Overflow(String),
}

/// Encode a 0-based column index as spreadsheet letters (`0 -> A`, `26 -> AA`).
pub fn column_to_letters(mut col: usize) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// Decode spreadsheet letters into a 0-based column index.
///
/// Only uppercase ASCII letters are accepted; returns `None` on anything else
/// or when the value does not fit in `usize`.
pub fn letters_to_column(s: &str) -> Option<usize> {
    if s.is_empty() {
        return None;
    }
    let mut col: usize = 0;
    for (idx, ch) in s.bytes().enumerate() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let val = (ch - b'A') as usize;
        col = col.checked_mul(26)?;
        col = col.checked_add(val)?;
        if idx != s.len() - 1 {
            col = col.checked_add(1)?;
        }
    }
    Some(col)
}

/// Render a 0-based `(row, column)` pair as an A1 position.
pub fn to_a1(row: usize, col: usize) -> String {
    // u128 keeps `usize::MAX + 1` representable.
    format!("{}{}", column_to_letters(col), row as u128 + 1)
}

/// Parse an A1 position back into a 0-based `(row, column)` pair.
pub fn parse_a1(input: &str) -> Result<(usize, usize), A1ParseError> {
    if input.is_empty() {
        return Err(A1ParseError::Empty);
    }
    let split = input
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(input.len());
    let (letters, digits) = input.split_at(split);
    if letters.is_empty() {
        return match input.chars().next() {
            Some(ch) if !ch.is_ascii_digit() => Err(A1ParseError::InvalidCharacter {
                input: input.to_string(),
                ch,
            }),
            _ => Err(A1ParseError::MissingColumn(input.to_string())),
        };
    }
    if digits.is_empty() {
        return Err(A1ParseError::MissingRow(input.to_string()));
    }
    if let Some(ch) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(A1ParseError::InvalidCharacter {
            input: input.to_string(),
            ch,
        });
    }

    let col = letters_to_column(letters).ok_or_else(|| A1ParseError::Overflow(input.to_string()))?;
    let row1: u128 = digits
        .parse()
        .map_err(|_| A1ParseError::Overflow(input.to_string()))?;
    if row1 == 0 {
        return Err(A1ParseError::ZeroRow(input.to_string()));
    }
    let row = usize::try_from(row1 - 1).map_err(|_| A1ParseError::Overflow(input.to_string()))?;
    Ok((row, col))
}
