//! Renders a note sequence through the phase-continuous oscillator
//!
//! Samples are produced frame by frame in note order. After the last note one
//! extra sample is emitted: the angle left over by the final segment, i.e. the
//! sample that would have started the next note.

use std::io::Write;

use log::{debug, info};

use crate::config::SynthConfig;
use crate::error::{MidiOscError, Result};
use crate::generator::{midi_to_frequency, PhaseContinuousOscillator, SignalGenerator};
use crate::pipeline::sequence::NoteSequence;

/// Samples reserved up front by `render`; longer melodies grow on demand
const RENDER_PREALLOC_SAMPLES: usize = 1 << 20;

/// Drives the oscillator over a closed note sequence
pub struct NoteSequenceRunner {
    config: SynthConfig,
    oscillator: PhaseContinuousOscillator,
}

impl NoteSequenceRunner {
    /// Create a runner with a fresh oscillator
    pub fn new(config: SynthConfig) -> Self {
        let oscillator = PhaseContinuousOscillator::new(config.sample_rate);
        Self { config, oscillator }
    }

    pub fn oscillator(&self) -> &PhaseContinuousOscillator {
        &self.oscillator
    }

    /// Render every sample of `sequence`, passing each one to `emit` in order
    ///
    /// Returns the number of samples emitted.
    pub fn for_each_sample<F>(&mut self, sequence: &NoteSequence, mut emit: F) -> Result<u64>
    where
        F: FnMut(f64) -> Result<()>,
    {
        if sequence.is_empty() {
            return Err(MidiOscError::NoNotesEntered);
        }
        self.config.validate()?;

        let mut frame_buffer = vec![0.0f64; self.config.frame_size];
        let mut emitted = 0u64;

        for (index, note) in sequence.notes().iter().enumerate() {
            let frequency = midi_to_frequency(note.midi_note);
            let mut segment = self.oscillator.synthesize(note.duration_ms, frequency);
            debug!(
                "note {}: midi {} -> {:.3} Hz, {} samples",
                index,
                note.midi_note,
                frequency,
                segment.len()
            );

            loop {
                let written = segment.process(&mut frame_buffer);
                if written == 0 {
                    break;
                }
                for &sample in &frame_buffer[..written] {
                    emit(sample)?;
                }
                emitted += written as u64;
            }
        }

        emit(self.oscillator.boundary_sample())?;
        emitted += 1;

        info!(
            "rendered {} notes as {} samples at {} Hz",
            sequence.len(),
            emitted,
            self.config.sample_rate
        );
        Ok(emitted)
    }

    /// Write every sample to `out`, one per line with six decimals
    pub fn run<W: Write>(&mut self, sequence: &NoteSequence, out: &mut W) -> Result<u64> {
        let emitted = self.for_each_sample(sequence, |sample| {
            writeln!(out, "{:.6}", sample)?;
            Ok(())
        })?;
        out.flush()?;
        Ok(emitted)
    }

    /// Collect every sample into memory
    ///
    /// Fails with `RenderTooLarge` instead of aborting when the melody does not fit.
    pub fn render(&mut self, sequence: &NoteSequence) -> Result<Vec<f64>> {
        let total = sequence.total_samples(&self.config);
        let mut samples = Vec::with_capacity(initial_capacity(total));
        self.for_each_sample(sequence, |sample| {
            if samples.len() == samples.capacity() {
                let additional = samples.capacity().max(RENDER_PREALLOC_SAMPLES);
                reserve(&mut samples, additional, total)?;
            }
            samples.push(sample);
            Ok(())
        })?;
        Ok(samples)
    }
}

fn initial_capacity(total_samples: u64) -> usize {
    usize::try_from(total_samples)
        .map_or(RENDER_PREALLOC_SAMPLES, |total| total.min(RENDER_PREALLOC_SAMPLES))
}

/// Reserve room for `additional` samples, reporting allocation failure as an error
fn reserve(samples: &mut Vec<f64>, additional: usize, total_samples: u64) -> Result<()> {
    samples
        .try_reserve(additional)
        .map_err(|_| MidiOscError::RenderTooLarge {
            samples: total_samples,
        })
}
