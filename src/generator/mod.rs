pub mod frequency;
pub mod oscillator;

pub use frequency::midi_to_frequency;
pub use oscillator::{phase_angle, PhaseContinuousOscillator, ToneSegment};

/// Core trait for frame-based signal generators
///
/// Generators produce a finite run of samples, one frame at a time.
pub trait SignalGenerator {
    /// Process the next frame of samples
    ///
    /// # Arguments
    /// * `buffer` - Mutable slice to write samples into. The length determines frame size.
    ///
    /// # Returns
    /// The number of samples written from the start of `buffer`. Fewer than
    /// `buffer.len()` means the generator ran out; 0 means it was already complete.
    /// Slots past the returned count are left untouched.
    fn process(&mut self, buffer: &mut [f64]) -> usize;

    /// Check if this generator has produced all of its samples
    fn is_complete(&self) -> bool;

    /// Rewind the generator to its first sample
    fn reset(&mut self);
}
