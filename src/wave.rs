// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! This is the namespace for all parts dealing with data in sampled waves.

/// Information about how audio is sampled.
///
/// The format is fixed for a whole rendering run and passed explicitly to every
/// component that needs it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SampleFormat {
    /// Number of samples per second.
    pub sample_rate: u32,
}

impl SampleFormat {
    /// Only mono output is supported.
    pub const CHANNELS: u16 = 1;

    /// Bytes per sample on the wire (signed 16 bit).
    pub const BYTES_PER_SAMPLE: usize = 2;

    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Number of whole samples fitting into `seconds`.
    /// Non-positive (or NaN) durations yield zero samples.
    ///
    /// # Example
    ///
    /// ```
    /// use txt2mp3::wave::SampleFormat;
    ///
    /// let format = SampleFormat::default();
    /// assert_eq!(format.samples(0.45), 19845);
    /// assert_eq!(format.samples(0.03), 1323);
    /// assert_eq!(format.samples(0.0), 0);
    /// assert_eq!(format.samples(-1.0), 0);
    /// ```
    pub fn samples(self, seconds: f64) -> usize {
        let count = (seconds * self.sample_rate as f64).floor();
        if count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    /// Time of the sample with the given index, in seconds.
    pub fn time_of(self, sample: usize) -> f64 {
        sample as f64 / self.sample_rate as f64
    }
}

/// CD quality sample rate.
impl Default for SampleFormat {
    fn default() -> Self {
        Self::new(44100)
    }
}

/// A slice of mono signed 16 bit audio.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<i16>,
}

#[allow(clippy::len_without_is_empty)]
impl PcmBuffer {
    pub fn from_samples(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    /// A buffer of `sample_count` zero samples.
    pub fn silence(sample_count: usize) -> Self {
        Self {
            samples: vec![0; sample_count],
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn byte_len(&self) -> usize {
        self.len() * SampleFormat::BYTES_PER_SAMPLE
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Copy the samples to bytes in little endian order, as expected by `s16le` consumers.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of input samples if the output buffer was not large enough.
    ///
    /// # Example
    ///
    /// ```
    /// use txt2mp3::wave::PcmBuffer;
    ///
    /// let buffer = PcmBuffer::from_samples(vec![1, -2, 0x1234]);
    /// let mut bytes = vec![0u8; buffer.byte_len()];
    /// assert_eq!(buffer.copy_bytes_to(&mut bytes), 3);
    /// assert_eq!(bytes, vec![0x01, 0x00, 0xfe, 0xff, 0x34, 0x12]);
    /// ```
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(2)) {
            target.copy_from_slice(&sample.to_le_bytes());
            processed += 1;
        }
        processed
    }

    /// Like `copy_bytes_to`, but allocating the target.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_len()];
        self.copy_bytes_to(&mut bytes);
        bytes
    }
}
