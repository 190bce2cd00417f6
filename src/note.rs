// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Mapping characters of a phrase to pitches.

/// Semitone offsets of the major pentatonic scale relative to its root.
pub const PENTATONIC: [u32; 5] = [0, 2, 4, 7, 9];

/// Position of a character on the pentatonic keyboard.
///
/// Both the scale degree and the octave are derived from the sum of the
/// character code and its index in the phrase, so that repeated characters
/// still produce a moving melody.
///
/// # Examples
///
/// ```
/// use txt2mp3::note::PentatonicStep;
///
/// // 'h' is 104: 104 mod 5 = 4 selects the sixth, 104 mod 12 = 8 shifts one octave up.
/// let step = PentatonicStep::of('h', 0);
/// assert_eq!(step.degree, 9);
/// assert_eq!(step.octave_shift, 1);
/// assert_eq!(step.semitone(), 21);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PentatonicStep {
    /// Semitone offset within the octave, one of `PENTATONIC`.
    pub degree: u32,
    /// Number of octaves above the reference, between 0 and 2.
    pub octave_shift: u32,
}

impl PentatonicStep {
    pub fn of(ch: char, index: usize) -> Self {
        let position = ch as u64 + index as u64;
        let degree = PENTATONIC[(position % PENTATONIC.len() as u64) as usize];
        let octave_shift = ((position % 12) / 5) as u32;
        Self {
            degree,
            octave_shift,
        }
    }

    /// Semitones above the reference pitch.
    pub fn semitone(self) -> u32 {
        self.degree + 12 * self.octave_shift
    }
}

/// Defines the pitch of the root of the scale.
/// All other pitches follow in equal temperament at 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use txt2mp3::note::Tuning;
/// assert_eq!(Tuning::default().frequency(0), 220.0);
/// assert_eq!(Tuning::default().frequency(12), 440.0);
/// assert_eq!(Tuning::default().frequency(24), 880.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tuning {
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of the pitch `semitones` above the reference.
    pub fn frequency(&self, semitones: u32) -> f64 {
        self.reference_frequency * 2.0f64.powf(semitones as f64 / 12.0)
    }

    /// Frequency of the `index`-th (zero based) character of a phrase.
    pub fn map_character(&self, ch: char, index: usize) -> f64 {
        self.frequency(PentatonicStep::of(ch, index).semitone())
    }
}

/// A3 as the root of the scale.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_frequency: 220.0,
        }
    }
}

/// Frequency in Hz of the `index`-th character of a phrase, using the default tuning.
pub fn map_character(ch: char, index: usize) -> f64 {
    Tuning::default().map_character(ch, index)
}
