//! Error types for the note-to-sample pipeline

use thiserror::Error;

use crate::pipeline::parser::ParseError;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, MidiOscError>;

/// Broad failure classes, each with its own process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed command line.
    CommandLine,
    /// Malformed runtime input.
    RuntimeInput,
    /// A value outside the accepted bounds.
    OutOfBounds,
}

impl ErrorCategory {
    /// Exit code reported to the shell.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCategory::CommandLine => 1,
            ErrorCategory::RuntimeInput => 2,
            ErrorCategory::OutOfBounds => 3,
        }
    }
}

/// Errors that can occur while reading notes or rendering samples.
#[derive(Debug, Error)]
pub enum MidiOscError {
    /// MIDI note number above 127 or below the 32-bit range.
    #[error("the MIDI 'note on' message contains data out of bounds: {value}")]
    OutOfRange {
        /// The rejected note number.
        value: i64,
    },

    /// Timestamp not strictly greater than its predecessor.
    #[error("time values must increase: {timestamp} follows {previous}")]
    NonMonotonic {
        /// Timestamp of the preceding event.
        previous: i32,
        /// The rejected timestamp.
        timestamp: i64,
    },

    /// Timestamp outside the signed 32-bit range used for arithmetic.
    #[error("timestamp {timestamp} will cause overflow, choose a smaller value")]
    TimestampOverflow {
        /// The rejected timestamp.
        timestamp: i64,
    },

    /// Note duration would overflow the sample index counter.
    #[error("the duration of note number {} is too long ({duration_ms} ms)", .index + 1)]
    DurationTooLong {
        /// Zero-based position of the offending note.
        index: usize,
        /// Its duration in milliseconds.
        duration_ms: i64,
    },

    /// An input line that does not hold exactly two integers.
    #[error("input line {line} not in a recognised format: {source}")]
    MalformedInput {
        /// One-based input line number.
        line: usize,
        /// What the tokenizer rejected.
        #[source]
        source: ParseError,
    },

    /// The very first event already ends the sequence.
    #[error("no valid MIDI note values entered, cannot print samples")]
    NoNotesEntered,

    /// Unusable configuration value.
    #[error("invalid configuration '{name}': {message}")]
    InvalidConfig {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        message: String,
    },

    /// Rendered melody does not fit in memory.
    #[error("melody of {samples} samples is too large to render in memory")]
    RenderTooLarge {
        /// Samples the melody would produce.
        samples: u64,
    },

    /// I/O error while reading input or writing samples.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MidiOscError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name,
            message: message.into(),
        }
    }

    /// Which failure class this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            MidiOscError::OutOfRange { .. }
            | MidiOscError::NonMonotonic { .. }
            | MidiOscError::TimestampOverflow { .. }
            | MidiOscError::DurationTooLong { .. }
            | MidiOscError::RenderTooLarge { .. } => ErrorCategory::OutOfBounds,
            MidiOscError::MalformedInput { .. }
            | MidiOscError::NoNotesEntered
            | MidiOscError::Io(_) => ErrorCategory::RuntimeInput,
            MidiOscError::InvalidConfig { .. } => ErrorCategory::CommandLine,
        }
    }

    /// Exit code for this error.
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }
}
