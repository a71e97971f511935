//! Ordered, capacity-limited list of timed notes
//!
//! Each note's duration is only known once the next timestamp arrives, so the
//! builder holds the newest pitch as pending until the following event closes it.

use std::io::{self, BufRead, Read};

use log::{debug, warn};

use crate::config::SynthConfig;
use crate::error::{MidiOscError, Result};
use crate::generator::frequency::MAX_MIDI_NOTE;
use crate::pipeline::parser::{parse_line, ParseError, RawTimedEvent};
use crate::pipeline::validator::{NoteValidator, Pitch};

/// A note with a known duration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// Length in milliseconds, always > 0
    pub duration_ms: u32,
    /// MIDI note number in 0..=127
    pub midi_note: u8,
}

/// A closed, immutable sequence of notes ready to render
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteSequence {
    notes: Vec<Note>,
}

impl NoteSequence {
    /// Build a sequence directly from notes
    ///
    /// Fails with `OutOfRange` for a note above 127. Zero-length notes are dropped.
    pub fn from_notes(notes: Vec<Note>) -> Result<Self> {
        if let Some(bad) = notes.iter().find(|n| n.midi_note > MAX_MIDI_NOTE) {
            return Err(MidiOscError::OutOfRange {
                value: i64::from(bad.midi_note),
            });
        }
        let notes = notes.into_iter().filter(|n| n.duration_ms > 0).collect();
        Ok(Self { notes })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total rendered samples, including the trailing boundary sample
    pub fn total_samples(&self, config: &SynthConfig) -> u64 {
        self.notes
            .iter()
            .map(|n| config.samples_for(n.duration_ms))
            .sum::<u64>()
            + 1
    }
}

/// Accumulates validated events until the sequence is closed
#[derive(Debug)]
pub struct NoteSequenceBuilder {
    validator: NoteValidator,
    notes: Vec<Note>,
    /// Pitch waiting for the next timestamp to fix its duration
    pending: Option<u8>,
    events_seen: usize,
    max_events: usize,
    closed: bool,
}

impl NoteSequenceBuilder {
    pub fn new(config: &SynthConfig) -> Self {
        Self {
            validator: NoteValidator::new(config.sample_rate, config.max_sample_index),
            notes: Vec::new(),
            pending: None,
            events_seen: 0,
            max_events: config.max_events,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of events accepted so far
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Add the next event
    ///
    /// Returns `true` once the sequence is closed, either by a negative midi note
    /// or because the event capacity is reached. Events after that are ignored.
    pub fn push(&mut self, event: RawTimedEvent) -> Result<bool> {
        if self.closed {
            return Ok(true);
        }

        let validated = self.validator.validate(event, self.notes.len())?;
        if self.events_seen == 0 && validated.pitch == Pitch::End {
            return Err(MidiOscError::NoNotesEntered);
        }

        if let (Some(duration_ms), Some(midi_note)) =
            (validated.previous_duration, self.pending.take())
        {
            debug!(
                "note {}: midi {} for {} ms",
                self.notes.len(),
                midi_note,
                duration_ms
            );
            self.notes.push(Note {
                duration_ms,
                midi_note,
            });
        }
        self.events_seen += 1;

        match validated.pitch {
            Pitch::End => self.closed = true,
            Pitch::Note(midi_note) if self.events_seen >= self.max_events => {
                warn!(
                    "reached the limit of {} events, ignoring midi note {} at {} ms",
                    self.max_events, midi_note, validated.timestamp
                );
                self.closed = true;
            }
            Pitch::Note(midi_note) => self.pending = Some(midi_note),
        }
        Ok(self.closed)
    }

    /// Finish building
    ///
    /// Fails with `MalformedInput` if no event closed the sequence.
    pub fn finish(self) -> Result<NoteSequence> {
        if !self.closed {
            return Err(MidiOscError::MalformedInput {
                line: self.events_seen + 1,
                source: ParseError::UnexpectedEof,
            });
        }
        Ok(NoteSequence { notes: self.notes })
    }
}

/// Read one line of at most `max_len` bytes, without its terminator
///
/// Returns `Ok(None)` at end of input. Never buffers more than `max_len + 2`
/// bytes, so input without newlines cannot grow memory.
fn read_bounded_line<R: BufRead>(
    reader: &mut R,
    max_len: usize,
) -> io::Result<Option<std::result::Result<String, ParseError>>> {
    // Room for the line, "\r\n", and nothing else
    let limit = max_len as u64 + 2;
    let mut buf = Vec::new();
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buf)?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if read as u64 == limit {
        return Ok(Some(Err(ParseError::LineTooLong { max: max_len })));
    }

    Ok(Some(String::from_utf8(buf).map_err(|_| ParseError::NotUtf8)))
}

/// Read events line by line until the sequence closes
///
/// Lines after the closing event are not read.
pub fn read_sequence<R: BufRead>(mut reader: R, config: &SynthConfig) -> Result<NoteSequence> {
    config.validate()?;
    let mut builder = NoteSequenceBuilder::new(config);
    let mut line_number = 0;

    while let Some(line) = read_bounded_line(&mut reader, config.max_line_len)? {
        line_number += 1;
        let event = line
            .and_then(|line| parse_line(&line, config.max_line_len))
            .map_err(|source| MidiOscError::MalformedInput {
                line: line_number,
                source,
            })?;
        if builder.push(event)? {
            break;
        }
    }

    builder.finish()
}
