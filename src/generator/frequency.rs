//! MIDI note number to frequency conversion (12-tone equal temperament)

/// MIDI note tuned to [`REFERENCE_FREQUENCY`] (A above middle C).
pub const REFERENCE_MIDI_NOTE: f64 = 69.0;

/// Frequency of [`REFERENCE_MIDI_NOTE`] in Hz.
pub const REFERENCE_FREQUENCY: f64 = 440.0;

/// Highest valid MIDI note number.
pub const MAX_MIDI_NOTE: u8 = 127;

/// Convert a MIDI note number to frequency in Hz.
///
/// Formula: f = 440 * 2^((n - 69) / 12)
///
/// # Example
/// ```
/// use midiosc::generator::frequency::midi_to_frequency;
///
/// assert_eq!(midi_to_frequency(69), 440.0);
/// assert!((midi_to_frequency(81) - 880.0).abs() < 1e-9);
/// ```
pub fn midi_to_frequency(midi_note: u8) -> f64 {
    let semitones = f64::from(midi_note) - REFERENCE_MIDI_NOTE;
    REFERENCE_FREQUENCY * 2f64.powf(semitones / 12.0)
}
