//! Range and ordering checks that turn raw events into note durations

use crate::error::{MidiOscError, Result};
use crate::generator::frequency::MAX_MIDI_NOTE;
use crate::pipeline::parser::RawTimedEvent;

/// Validated pitch of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// A MIDI note in 0..=127
    Note(u8),
    /// Negative input: no more notes
    End,
}

/// An event that passed every check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedEvent {
    pub timestamp: i32,
    pub pitch: Pitch,
    /// Duration of the previous note, closed by this event's timestamp
    /// (`None` for the first event)
    pub previous_duration: Option<u32>,
}

/// Check that a note of `duration_ms` keeps its sample index within
/// `max_sample_index`
///
/// A zero duration renders no samples and is always within the limit.
pub fn within_duration_limit(duration_ms: u64, sample_rate: u32, max_sample_index: u64) -> bool {
    match duration_ms.checked_mul(u64::from(sample_rate)) {
        Some(scaled) => scaled / 1000 <= max_sample_index,
        None => false,
    }
}

/// Validates a stream of events, remembering the previous timestamp
#[derive(Debug, Clone)]
pub struct NoteValidator {
    sample_rate: u32,
    max_sample_index: u64,
    previous_timestamp: Option<i32>,
}

impl NoteValidator {
    pub fn new(sample_rate: u32, max_sample_index: u64) -> Self {
        Self {
            sample_rate,
            max_sample_index,
            previous_timestamp: None,
        }
    }

    /// Timestamp of the last accepted event
    pub fn previous_timestamp(&self) -> Option<i32> {
        self.previous_timestamp
    }

    /// Validate the next event
    ///
    /// `previous_index` is the position of the note this event closes, used to
    /// report an over-long duration. State only changes when the event is accepted.
    pub fn validate(
        &mut self,
        event: RawTimedEvent,
        previous_index: usize,
    ) -> Result<ValidatedEvent> {
        let pitch = check_midi_note(event.midi_note)?;

        let timestamp = i32::try_from(event.timestamp).map_err(|_| {
            MidiOscError::TimestampOverflow {
                timestamp: event.timestamp,
            }
        })?;

        let previous_duration = match self.previous_timestamp {
            None => None,
            Some(previous) if timestamp <= previous => {
                return Err(MidiOscError::NonMonotonic {
                    previous,
                    timestamp: event.timestamp,
                });
            }
            Some(previous) => {
                // Both fit in i32, so the gap is positive and fits in u32
                let duration = (i64::from(timestamp) - i64::from(previous)) as u64;
                if !within_duration_limit(duration, self.sample_rate, self.max_sample_index) {
                    return Err(MidiOscError::DurationTooLong {
                        index: previous_index,
                        duration_ms: duration as i64,
                    });
                }
                Some(duration as u32)
            }
        };

        self.previous_timestamp = Some(timestamp);
        Ok(ValidatedEvent {
            timestamp,
            pitch,
            previous_duration,
        })
    }
}

fn check_midi_note(midi_note: i64) -> Result<Pitch> {
    if midi_note > i64::from(MAX_MIDI_NOTE) || midi_note < i64::from(i32::MIN) {
        return Err(MidiOscError::OutOfRange { value: midi_note });
    }
    Ok(match u8::try_from(midi_note) {
        Ok(note) => Pitch::Note(note),
        Err(_) => Pitch::End,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48000;
    const MAX_INDEX: u64 = i32::MAX as u64;

    fn validator() -> NoteValidator {
        NoteValidator::new(RATE, MAX_INDEX)
    }

    #[test]
    fn test_first_event_has_no_duration() {
        let mut v = validator();
        let event = v.validate(RawTimedEvent::new(50, 60), 0).unwrap();
        assert_eq!(event.previous_duration, None);
        assert_eq!(event.pitch, Pitch::Note(60));
        assert_eq!(v.previous_timestamp(), Some(50));
    }

    #[test]
    fn test_duration_from_gap() {
        let mut v = validator();
        v.validate(RawTimedEvent::new(50, 60), 0).unwrap();
        let event = v.validate(RawTimedEvent::new(70, 62), 0).unwrap();
        assert_eq!(event.previous_duration, Some(20));
        assert_eq!(event.timestamp, 70);
    }

    #[test]
    fn test_negative_note_is_end() {
        let mut v = validator();
        let event = v.validate(RawTimedEvent::new(0, -1), 0).unwrap();
        assert_eq!(event.pitch, Pitch::End);
        let event = v.validate(RawTimedEvent::new(1, -2_000_000_000), 0).unwrap();
        assert_eq!(event.pitch, Pitch::End);
    }

    #[test]
    fn test_midi_out_of_range() {
        let mut v = validator();
        assert!(matches!(
            v.validate(RawTimedEvent::new(0, 200), 0),
            Err(MidiOscError::OutOfRange { value: 200 })
        ));
        assert!(matches!(
            v.validate(RawTimedEvent::new(0, 128), 0),
            Err(MidiOscError::OutOfRange { value: 128 })
        ));
        assert!(matches!(
            v.validate(RawTimedEvent::new(0, i64::from(i32::MIN) - 1), 0),
            Err(MidiOscError::OutOfRange { .. })
        ));
        assert!(v.validate(RawTimedEvent::new(0, 127), 0).is_ok());
    }

    #[test]
    fn test_timestamp_overflow() {
        let mut v = validator();
        assert!(matches!(
            v.validate(RawTimedEvent::new(i64::from(i32::MAX) + 1, 60), 0),
            Err(MidiOscError::TimestampOverflow { .. })
        ));
        assert!(matches!(
            v.validate(RawTimedEvent::new(i64::MIN, 60), 0),
            Err(MidiOscError::TimestampOverflow { .. })
        ));
        assert_eq!(v.previous_timestamp(), None);
    }

    #[test]
    fn test_non_monotonic() {
        let mut v = validator();
        v.validate(RawTimedEvent::new(5, 60), 0).unwrap();
        assert!(matches!(
            v.validate(RawTimedEvent::new(3, 62), 0),
            Err(MidiOscError::NonMonotonic {
                previous: 5,
                timestamp: 3
            })
        ));
        assert!(matches!(
            v.validate(RawTimedEvent::new(5, 62), 0),
            Err(MidiOscError::NonMonotonic { .. })
        ));
        // Rejected events leave the state alone
        assert_eq!(v.previous_timestamp(), Some(5));
    }

    #[test]
    fn test_negative_first_timestamp_allowed() {
        let mut v = validator();
        v.validate(RawTimedEvent::new(-100, 60), 0).unwrap();
        let event = v.validate(RawTimedEvent::new(-40, -1), 0).unwrap();
        assert_eq!(event.previous_duration, Some(60));
    }

    #[test]
    fn test_duration_limit_boundary() {
        // 48 samples per ms: a limit of 48 * 1000 allows exactly 1000 ms
        assert!(within_duration_limit(1000, RATE, 48_000));
        assert!(!within_duration_limit(1001, RATE, 48_000));
        assert!(within_duration_limit(0, RATE, 0));
        assert!(within_duration_limit(44_739_242, RATE, MAX_INDEX));
        assert!(!within_duration_limit(44_739_243, RATE, MAX_INDEX));
        assert!(!within_duration_limit(u64::MAX, RATE, MAX_INDEX));
    }

    #[test]
    fn test_duration_too_long_reports_index() {
        let mut v = NoteValidator::new(RATE, 48_000);
        v.validate(RawTimedEvent::new(0, 60), 0).unwrap();
        v.validate(RawTimedEvent::new(1000, 62), 0).unwrap();
        let err = v.validate(RawTimedEvent::new(2001, -1), 1).unwrap_err();
        assert!(matches!(
            err,
            MidiOscError::DurationTooLong {
                index: 1,
                duration_ms: 1001
            }
        ));
        assert_eq!(v.previous_timestamp(), Some(1000));
    }

    #[test]
    fn test_widest_gap() {
        let mut v = validator();
        v.validate(RawTimedEvent::new(i64::from(i32::MIN), 60), 0).unwrap();
        let err = v
            .validate(RawTimedEvent::new(i64::from(i32::MAX), -1), 0)
            .unwrap_err();
        assert!(matches!(err, MidiOscError::DurationTooLong { .. }));
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let events = [
            RawTimedEvent::new(0, 60),
            RawTimedEvent::new(250, 64),
            RawTimedEvent::new(500, 67),
            RawTimedEvent::new(1000, -1),
        ];
        let run = || {
            let mut v = validator();
            events
                .iter()
                .enumerate()
                .map(|(i, &e)| v.validate(e, i.saturating_sub(1)).map(|r| r.previous_duration))
                .collect::<Result<Vec<_>>>()
                .unwrap()
        };
        let first = run();
        assert_eq!(first, vec![None, Some(250), Some(250), Some(500)]);
        assert_eq!(run(), first);
    }
}
