//! Phase-continuous sine oscillator driven by timed MIDI notes
//!
//! Reads `<timestamp_ms> <midi_note>` pairs, validates them into a note
//! sequence, and renders the sequence as 48 kHz sine samples whose phase
//! carries across note boundaries.

pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;

pub use config::SynthConfig;
pub use error::{ErrorCategory, MidiOscError, Result};
