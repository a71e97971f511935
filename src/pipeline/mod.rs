//! Note-to-sample pipeline
//!
//! Turns line-oriented note input into a stream of oscillator samples:
//! - Parser: Tokenize `<timestamp> <midi note>` lines
//! - Validator: Range, ordering and overflow checks
//! - Sequence: Capacity-limited note list closed by a negative note
//! - Runner: Phase-continuous rendering of the closed sequence

pub mod parser;
pub mod runner;
pub mod sequence;
pub mod validator;

pub use parser::{parse_line, ParseError, RawTimedEvent};
pub use runner::NoteSequenceRunner;
pub use sequence::{read_sequence, Note, NoteSequence, NoteSequenceBuilder};
pub use validator::{within_duration_limit, NoteValidator, Pitch, ValidatedEvent};
