use std::f64::consts::TAU;

use super::SignalGenerator;

/// Angle in radians of sample `sample_index` of a sine at `frequency` Hz,
/// offset by `phase_offset` and wrapped to [0, 2π).
///
/// Wrapping keeps the angle small so `sin` stays precise over long notes.
pub fn phase_angle(sample_index: u64, frequency: f64, phase_offset: f64, sample_rate: u32) -> f64 {
    (TAU * frequency * sample_index as f64 / f64::from(sample_rate) + phase_offset) % TAU
}

/// Sine oscillator whose phase carries over from one note to the next
///
/// Every call to [`synthesize`](Self::synthesize) starts where the previous
/// segment's waveform would have continued, so a change of frequency does not
/// produce a jump in the signal (a click).
#[derive(Debug, Clone)]
pub struct PhaseContinuousOscillator {
    sample_rate: u32,
    /// Angle of the next sample to be emitted, in [0, 2π)
    last_phase: f64,
}

impl PhaseContinuousOscillator {
    /// Create an oscillator starting at phase 0
    ///
    /// # Example
    /// ```
    /// use midiosc::generator::PhaseContinuousOscillator;
    ///
    /// let mut osc = PhaseContinuousOscillator::new(48000);
    /// let samples: Vec<f64> = osc.synthesize(1, 440.0).collect();
    /// assert_eq!(samples.len(), 48);
    /// assert_eq!(samples[0], 0.0);
    /// ```
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            last_phase: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Angle that the next segment's first sample will use
    pub fn last_phase(&self) -> f64 {
        self.last_phase
    }

    /// Schedule `duration_ms` milliseconds of a sine at `frequency` Hz
    ///
    /// The returned segment yields `duration_ms * sample_rate / 1000` samples
    /// (indices `0..count`). The oscillator's phase moves to the angle of index
    /// `count`, the sample that is never emitted here but starts the next segment.
    pub fn synthesize(&mut self, duration_ms: u32, frequency: f64) -> ToneSegment {
        let len = u64::from(duration_ms) * u64::from(self.sample_rate) / 1000;
        let segment = ToneSegment {
            frequency,
            phase_offset: self.last_phase,
            sample_rate: self.sample_rate,
            position: 0,
            len,
        };
        self.last_phase = phase_angle(len, frequency, self.last_phase, self.sample_rate);
        segment
    }

    /// The sample that would start the next segment
    pub fn boundary_sample(&self) -> f64 {
        self.last_phase.sin()
    }
}

/// A finite run of sine samples at one frequency
#[derive(Debug, Clone)]
pub struct ToneSegment {
    frequency: f64,
    phase_offset: f64,
    sample_rate: u32,
    /// Index of the next sample to produce
    position: u64,
    /// Total samples in this segment
    len: u64,
}

impl ToneSegment {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Total number of samples in the segment
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples not yet produced
    pub fn remaining(&self) -> u64 {
        self.len - self.position
    }

    fn sample_at(&self, sample_index: u64) -> f64 {
        phase_angle(sample_index, self.frequency, self.phase_offset, self.sample_rate).sin()
    }
}

impl Iterator for ToneSegment {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.position >= self.len {
            return None;
        }
        let sample = self.sample_at(self.position);
        self.position += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl SignalGenerator for ToneSegment {
    fn process(&mut self, buffer: &mut [f64]) -> usize {
        let count = usize::try_from(self.remaining()).map_or(buffer.len(), |r| r.min(buffer.len()));
        for (i, sample) in buffer[..count].iter_mut().enumerate() {
            *sample = self.sample_at(self.position + i as u64);
        }
        self.position += count as u64;
        count
    }

    fn is_complete(&self) -> bool {
        self.position >= self.len
    }

    fn reset(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 48000;

    #[test]
    fn test_initial_angle() {
        assert_eq!(phase_angle(0, 1376.42, 0.0, RATE), 0.0);
    }

    #[test]
    fn test_second_angle() {
        let angle = phase_angle(1, 1376.42, 0.0, RATE);
        assert!((angle - 0.1801729567).abs() < 1e-9);
    }

    #[test]
    fn test_angle_wraps() {
        // One full cycle of 1 kHz at 48 kHz lands back on 0 (mod 2π)
        let angle = phase_angle(48, 1000.0, 0.0, RATE);
        assert!(angle < 1e-9 || (TAU - angle) < 1e-9);
        for i in 0..1000 {
            let angle = phase_angle(i, 3135.96, 5.0, RATE);
            assert!((0.0..TAU).contains(&angle));
        }
    }

    #[test]
    fn test_segment_length_truncates() {
        let mut osc = PhaseContinuousOscillator::new(44100);
        assert_eq!(osc.synthesize(1, 440.0).len(), 44);
        assert_eq!(osc.synthesize(10, 440.0).count(), 441);
        assert!(osc.synthesize(0, 440.0).is_empty());
    }

    #[test]
    fn test_first_segment_is_plain_sine() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        let samples: Vec<f64> = osc.synthesize(10, 440.0).collect();
        assert_eq!(samples.len(), 480);
        for (i, &s) in samples.iter().enumerate() {
            let expected = (TAU * 440.0 * i as f64 / 48000.0).sin();
            assert!((s - expected).abs() < 1e-9, "sample {}", i);
        }
    }

    #[test]
    fn test_phase_continuity_across_frequency_change() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        let first = osc.synthesize(7, 440.0);
        let carried = osc.last_phase();
        let expected = phase_angle(first.len(), 440.0, 0.0, RATE);
        assert_eq!(carried, expected);

        let mut second = osc.synthesize(5, 3135.96);
        let first_sample = second.next().unwrap();
        assert_eq!(first_sample, carried.sin());
        assert_eq!(phase_angle(0, 3135.96, carried, RATE), carried);
    }

    #[test]
    fn test_no_click_at_boundary() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        let low: Vec<f64> = osc.synthesize(13, 220.0).collect();
        let high: Vec<f64> = osc.synthesize(13, 1760.0).collect();
        // |Δsin| is bounded by the phase step of the faster tone
        let bound = TAU * 1760.0 / 48000.0 + 1e-12;
        let step = (high[0] - low[low.len() - 1]).abs();
        assert!(step <= bound, "step {} > {}", step, bound);
    }

    #[test]
    fn test_empty_segment_keeps_phase() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        osc.synthesize(3, 440.0);
        let before = osc.last_phase();
        let segment = osc.synthesize(0, 880.0);
        assert!(segment.is_complete());
        assert_eq!(osc.last_phase(), before);
    }

    #[test]
    fn test_process_matches_iterator() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        let segment = osc.synthesize(3, 523.25);
        let expected: Vec<f64> = segment.clone().collect();

        let mut framed = segment;
        let mut buffer = [0.0f64; 64];
        let mut collected = Vec::new();
        loop {
            let written = framed.process(&mut buffer);
            if written == 0 {
                break;
            }
            collected.extend_from_slice(&buffer[..written]);
        }
        assert_eq!(collected, expected);
        assert!(framed.is_complete());

        framed.reset();
        assert_eq!(framed.remaining(), 144);
    }

    #[test]
    fn test_boundary_sample() {
        let mut osc = PhaseContinuousOscillator::new(RATE);
        assert_eq!(osc.boundary_sample(), 0.0);
        osc.synthesize(1000, 440.0);
        let expected = ((TAU * 440.0 * 48000.0 / 48000.0) % TAU).sin();
        assert_eq!(osc.boundary_sample(), expected);
    }
}
