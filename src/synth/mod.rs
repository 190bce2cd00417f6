// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This namespace contains all the parts converting from note data to wave data.

pub mod envelope;
pub mod oscillator;

use log::trace;

use crate::melody::NoteSpec;
use crate::wave::{PcmBuffer, SampleFormat};
use envelope::AttackRelease;
use oscillator::Oscillator;

/// Render a single sine note of `duration` seconds with an attack-release envelope.
///
/// The result has exactly `floor(duration * sample_rate)` samples.
/// Non-positive durations produce an empty buffer.
///
/// # Example
///
/// ```
/// use txt2mp3::synth::synthesize;
/// use txt2mp3::wave::SampleFormat;
///
/// let format = SampleFormat::default();
/// assert_eq!(synthesize(format, 440.0, 0.45, 0.22).len(), 19845);
/// assert_eq!(synthesize(format, 440.0, 0.0, 0.22).len(), 0);
/// ```
pub fn synthesize(
    format: SampleFormat,
    frequency: f64,
    duration: f64,
    amplitude: f64,
) -> PcmBuffer {
    let sample_count = format.samples(duration);
    let envelope = AttackRelease::for_note(duration);
    let mut osc = Oscillator::new(format, frequency);

    let mut samples = Vec::with_capacity(sample_count);
    for _ in 0..sample_count {
        let gain = envelope.eval(osc.time());
        let wave = osc.next_sample();
        samples.push(quantize(wave * amplitude * gain));
    }

    trace!(
        "rendered {:.2} Hz for {:.3} s into {} samples",
        frequency,
        duration,
        sample_count
    );
    PcmBuffer::from_samples(samples)
}

/// Render a note produced by the sequencer.
pub fn synthesize_note(format: SampleFormat, note: &NoteSpec) -> PcmBuffer {
    synthesize(format, note.frequency, note.duration, note.amplitude)
}

/// Clip a sample to [-1, 1] and convert it to signed 16 bit.
/// Ties are rounded away from zero.
///
/// # Example
///
/// ```
/// use txt2mp3::synth::quantize;
///
/// assert_eq!(quantize(0.0), 0);
/// assert_eq!(quantize(1.0), 32767);
/// assert_eq!(quantize(-1.0), -32767);
/// assert_eq!(quantize(3.5), 32767);
/// assert_eq!(quantize(-3.5), -32767);
/// assert_eq!(quantize(1.6 / 32767.0), 2);
/// assert_eq!(quantize(-1.6 / 32767.0), -2);
/// ```
pub fn quantize(value: f64) -> i16 {
    let clipped = value.max(-1.0).min(1.0);
    (clipped * i16::MAX as f64).round() as i16
}
