//! Parser for the note input format
//!
//! Format, one event per line:
//! <timestamp_ms> <midi_note>
//!
//! - Tokens are separated by spaces and/or tabs; leading and trailing
//!   whitespace is ignored
//! - Each token is a decimal integer with an optional leading '-'
//! - A negative midi note ends the sequence
//! - Lines are limited in length (30 bytes by default)

use std::num::IntErrorKind;

/// A raw input event before range checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTimedEvent {
    /// Milliseconds since an arbitrary origin
    pub timestamp: i64,
    /// MIDI note number, negative for end of sequence
    pub midi_note: i64,
}

impl RawTimedEvent {
    pub fn new(timestamp: i64, midi_note: i64) -> Self {
        Self {
            timestamp,
            midi_note,
        }
    }
}

/// Parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    LineTooLong { max: usize },
    NotUtf8,
    WrongTokenCount(usize),
    NotAnInteger(String),
    UnexpectedEof,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::LineTooLong { max } => {
                write!(f, "too many characters on one line (limit {})", max)
            }
            ParseError::NotUtf8 => write!(f, "line is not valid UTF-8"),
            ParseError::WrongTokenCount(n) => {
                write!(f, "expected <timestamp> <midi note>, found {} values", n)
            }
            ParseError::NotAnInteger(s) => write!(f, "not an integer: {:?}", s),
            ParseError::UnexpectedEof => {
                write!(f, "input ended before a negative midi note closed the sequence")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Check that a token is a decimal integer: an optional leading '-' followed
/// by at least one digit
pub fn is_only_int(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a validated integer token, saturating at the i64 bounds
///
/// Out-of-range magnitudes are left for the bounds checks to reject.
fn parse_int(token: &str) -> Result<i64, ParseError> {
    if !is_only_int(token) {
        return Err(ParseError::NotAnInteger(token.to_string()));
    }
    match token.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(ParseError::NotAnInteger(token.to_string())),
        },
    }
}

/// Parse one input line into an event
///
/// `max_len` is the longest accepted line in bytes, excluding the line terminator.
pub fn parse_line(line: &str, max_len: usize) -> Result<RawTimedEvent, ParseError> {
    if line.len() > max_len {
        return Err(ParseError::LineTooLong { max: max_len });
    }

    let tokens: Vec<&str> = line
        .split([' ', '\t'])
        .filter(|s| !s.is_empty())
        .collect();
    if tokens.len() != 2 {
        return Err(ParseError::WrongTokenCount(tokens.len()));
    }

    let timestamp = parse_int(tokens[0])?;
    let midi_note = parse_int(tokens[1])?;
    Ok(RawTimedEvent {
        timestamp,
        midi_note,
    })
}
