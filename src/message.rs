//! Message — the stock delta grammar and the canonical stock payload.
//!
//! DESIGN
//! ======
//! Inbound text is a loose JSON-like fragment. Whitespace is dropped first,
//! then the two required fields are located by key, in either order:
//!
//! ```text
//! "flower_id":<digits>      non-negative, fits u64
//! "number":-?<digits>       signed, fits i64
//! ```
//!
//! Anything else in the payload is ignored. Outbound text is always exactly
//! `{"flower_id":<id>, "number":<total>}`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field name of the item identifier.
pub const FIELD_FLOWER_ID: &str = "flower_id";

/// Field name of the quantity (delta inbound, running total outbound).
pub const FIELD_NUMBER: &str = "number";

// =============================================================================
// ERROR CODES
// =============================================================================

/// Trait for typed errors that carry a grepable code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "E_PARSE_MISSING_FIELD",
            Self::InvalidNumber { .. } => "E_PARSE_INVALID_NUMBER",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// Inbound adjustment: add `number` to the total of `flower_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDelta {
    pub flower_id: u64,
    pub number: i64,
}

/// Outbound report of the current total for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub flower_id: u64,
    pub number: i64,
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"{FIELD_FLOWER_ID}\":{}, \"{FIELD_NUMBER}\":{}}}", self.flower_id, self.number)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse an inbound stock delta.
///
/// # Errors
///
/// Returns [`ParseError::MissingField`] when either key is absent and
/// [`ParseError::InvalidNumber`] when a value is not an integer in range.
pub fn parse_delta(text: &str) -> Result<StockDelta, ParseError> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let raw_id = field_value(&compact, FIELD_FLOWER_ID, false)?;
    let raw_number = field_value(&compact, FIELD_NUMBER, true)?;

    let flower_id = raw_id
        .parse::<u64>()
        .map_err(|_| invalid(FIELD_FLOWER_ID, raw_id))?;
    let number = raw_number
        .parse::<i64>()
        .map_err(|_| invalid(FIELD_NUMBER, raw_number))?;

    Ok(StockDelta { flower_id, number })
}

/// Locate `"<field>":` and return the integer literal that follows it.
fn field_value<'a>(compact: &'a str, field: &'static str, signed: bool) -> Result<&'a str, ParseError> {
    let key = format!("\"{field}\":");
    let Some(start) = compact.find(&key) else {
        return Err(ParseError::MissingField(field));
    };

    let rest = &compact[start + key.len()..];
    let sign_len = usize::from(signed && rest.starts_with('-'));
    let digits = rest[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits == 0 {
        return Err(invalid(field, rest));
    }
    Ok(&rest[..sign_len + digits])
}

fn invalid(field: &'static str, raw: &str) -> ParseError {
    ParseError::InvalidNumber { field, value: raw.chars().take(24).collect() }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
