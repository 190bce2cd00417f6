// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

/// An Attack-Release envelope over a note of known length.
/// The amplitude first rises linearly from zero to one over `attack` seconds,
/// is held at one, and falls linearly back to zero during the final `release`
/// seconds of the note. This avoids clicks at the note boundaries.
///
/// When the two windows overlap, the attack ramp wins for `t < attack`.
///
/// # Example
///
/// ```
/// use txt2mp3::synth::envelope::*;
/// let e = AttackRelease {
///     duration: 1.0,
///     attack: 0.25,
///     release: 0.5,
/// };
/// assert_eq!(e.eval(0.0), 0.0);
/// assert_eq!(e.eval(0.125), 0.5);
/// assert_eq!(e.eval(0.25), 1.0);
/// assert_eq!(e.eval(0.5), 1.0);
/// assert_eq!(e.eval(0.75), 0.5);
/// assert_eq!(e.eval(1.0), 0.0);
/// assert_eq!(e.eval(2.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackRelease {
    /// Length of the whole note in seconds.
    pub duration: f64,
    /// Time in seconds to go from 0.0 to 1.0
    pub attack: f64,
    /// Time in seconds to go from 1.0 to 0.0 at the end of the note.
    pub release: f64,
}

impl AttackRelease {
    /// Longest attack ramp.
    pub const MAX_ATTACK: f64 = 0.02;
    /// Longest release ramp.
    pub const MAX_RELEASE: f64 = 0.04;

    /// Envelope for a note of `duration` seconds.
    /// Short notes spend at most 15% of their length in the attack and 20% in the release.
    ///
    /// ```
    /// use txt2mp3::synth::envelope::*;
    /// let e = AttackRelease::for_note(0.1);
    /// assert_eq!(e.attack, 0.1 * 0.15);
    /// assert_eq!(e.release, 0.1 * 0.2);
    ///
    /// let e = AttackRelease::for_note(0.45);
    /// assert_eq!(e.attack, 0.02);
    /// assert_eq!(e.release, 0.04);
    /// ```
    pub fn for_note(duration: f64) -> Self {
        Self {
            duration,
            attack: Self::MAX_ATTACK.min(duration * 0.15),
            release: Self::MAX_RELEASE.min(duration * 0.2),
        }
    }

    /// Evaluate the envelope curve `t` seconds after the start of the note.
    pub fn eval(&self, t: f64) -> f64 {
        if t < self.attack {
            t / self.attack
        } else if t > self.duration - self.release {
            ((self.duration - t) / self.release).max(0.0)
        } else {
            1.0
        }
    }
}
