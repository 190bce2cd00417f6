// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Turning a phrase of text into a melody.

use crate::note::Tuning;

/// A single note to be rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteSpec {
    /// Pitch in Hz.
    pub frequency: f64,
    /// How long the note is held, in seconds.
    pub duration: f64,
    /// Peak amplitude between 0 and 1.
    pub amplitude: f64,
}

/// How the characters of a phrase are played.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrasing {
    /// Fraction of a beat during which the note sounds.
    pub legato: f64,
    /// Amplitude of the first note of every cycle.
    pub base_amplitude: f64,
    /// Amplitude added for each following note of a cycle.
    pub amplitude_step: f64,
    /// Number of notes after which the amplitude starts over.
    pub amplitude_cycle: usize,
    /// Played instead when the phrase has no visible characters.
    pub placeholder: char,
    pub tuning: Tuning,
}

impl Default for Phrasing {
    fn default() -> Self {
        Self {
            legato: 0.9,
            base_amplitude: 0.22,
            amplitude_step: 0.04,
            amplitude_cycle: 3,
            placeholder: '-',
            tuning: Tuning::default(),
        }
    }
}

impl Phrasing {
    /// Length of a beat in seconds. Tempos below 1 bpm are played at 1 bpm.
    ///
    /// # Example
    ///
    /// ```
    /// use txt2mp3::melody::Phrasing;
    ///
    /// assert_eq!(Phrasing::beat_seconds(120), 0.5);
    /// assert_eq!(Phrasing::beat_seconds(0), 60.0);
    /// assert_eq!(Phrasing::beat_seconds(-20), 60.0);
    /// ```
    pub fn beat_seconds(bpm: i64) -> f64 {
        60.0 / bpm.max(1) as f64
    }

    /// The characters that are turned into notes.
    pub fn playable_chars(&self, phrase: &str) -> Vec<char> {
        let chars: Vec<char> = phrase.chars().filter(|&c| !is_blank(c)).collect();
        if chars.is_empty() {
            vec![self.placeholder]
        } else {
            chars
        }
    }

    pub fn amplitude(&self, index: usize) -> f64 {
        self.base_amplitude + (index % self.amplitude_cycle.max(1)) as f64 * self.amplitude_step
    }

    /// Turn `phrase` into notes, one per non-whitespace character, in phrase order.
    pub fn build_sequence(&self, phrase: &str, bpm: i64) -> Vec<NoteSpec> {
        let duration = Self::beat_seconds(bpm) * self.legato;
        self.playable_chars(phrase)
            .into_iter()
            .enumerate()
            .map(|(index, ch)| NoteSpec {
                frequency: self.tuning.map_character(ch, index),
                duration,
                amplitude: self.amplitude(index),
            })
            .collect()
    }
}

/// Characters skipped when playing a phrase: spaces, line breaks and the byte order mark.
/// NEL (U+0085) is not a line break here and is played like any other character.
///
/// # Example
///
/// ```
/// use txt2mp3::melody::is_blank;
///
/// assert!(is_blank(' '));
/// assert!(is_blank('\u{2028}'));
/// assert!(is_blank('\u{feff}'));
/// assert!(!is_blank('\u{85}'));
/// assert!(!is_blank('-'));
/// ```
pub fn is_blank(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Turn `phrase` into notes using the default phrasing.
///
/// # Example
///
/// ```
/// use txt2mp3::melody::build_sequence;
///
/// let notes = build_sequence("h i", 120);
/// assert_eq!(notes.len(), 2);
/// assert_eq!(notes[0].duration, 0.45);
/// assert_eq!(notes[1].amplitude, 0.26);
/// ```
pub fn build_sequence(phrase: &str, bpm: i64) -> Vec<NoteSpec> {
    Phrasing::default().build_sequence(phrase, bpm)
}
