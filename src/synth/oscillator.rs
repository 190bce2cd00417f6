// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::wave::SampleFormat;

/// A sine oscillator sampled at a fixed sample rate.
///
/// The phase is computed from the absolute sample index rather than accumulated,
/// so rendering the same note twice yields identical samples.
#[derive(Debug)]
pub struct Oscillator {
    format: SampleFormat,
    frequency: f64,
    current_sample: usize,
}

impl Oscillator {
    pub fn new(format: SampleFormat, frequency: f64) -> Self {
        Self {
            format,
            frequency,
            current_sample: 0,
        }
    }

    /// Seconds since the oscillator started, for the sample returned next.
    pub fn time(&self) -> f64 {
        self.format.time_of(self.current_sample)
    }

    pub fn next_sample(&mut self) -> f64 {
        use std::f64::consts::PI;
        let result = (2.0 * PI * self.frequency * self.time()).sin();
        self.current_sample += 1;
        result
    }
}
