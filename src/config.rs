//! Synthesis configuration

use crate::error::{MidiOscError, Result};

/// Configuration for reading notes and rendering samples
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Maximum number of input events; the last one always ends the sequence
    pub max_events: usize,
    /// Maximum characters on one input line (newline excluded)
    pub max_line_len: usize,
    /// Largest value the per-note sample index may reach
    pub max_sample_index: u64,
    /// Number of samples rendered per frame
    pub frame_size: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            max_events: 100,
            max_line_len: 30,
            max_sample_index: i32::MAX as u64,
            frame_size: 64,
        }
    }
}

impl SynthConfig {
    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(MidiOscError::invalid_config(
                "sample_rate",
                "must be greater than zero",
            ));
        }
        // One event to start a note and one to close it.
        if self.max_events < 2 {
            return Err(MidiOscError::invalid_config(
                "max_events",
                format!("need at least 2 events, got {}", self.max_events),
            ));
        }
        if self.frame_size == 0 {
            return Err(MidiOscError::invalid_config(
                "frame_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Samples rendered for a note of `duration_ms` milliseconds.
    pub fn samples_for(&self, duration_ms: u32) -> u64 {
        u64::from(duration_ms) * u64::from(self.sample_rate) / 1000
    }
}
