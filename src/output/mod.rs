// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Streaming rendered notes into an external encoder.

pub mod ffmpeg;

use std::fmt;
use std::io;

use log::{debug, error, trace};

use crate::render::RenderError;
use crate::wave::{PcmBuffer, SampleFormat};

/// Pause inserted after every note, in seconds.
pub const GAP_SECONDS: f64 = 0.03;

/// Something consuming raw `s16le` audio on a byte stream, typically a subprocess.
///
/// The sink only relies on these three capabilities,
/// so it does not care how the encoder is actually launched.
pub trait Encoder {
    type Input: io::Write;

    /// Start the encoder and return the stream it reads its audio from.
    fn open(&mut self, format: SampleFormat) -> io::Result<Self::Input>;

    /// Signal the end of the audio by closing the stream.
    fn close_input(&mut self, input: Self::Input) -> io::Result<()>;

    /// Block until the encoder has terminated.
    fn wait(&mut self) -> io::Result<EncoderStatus>;
}

/// How the encoder terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderStatus {
    /// Exit code, or `None` if the encoder was terminated by a signal.
    pub code: Option<i32>,
}

impl EncoderStatus {
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for EncoderStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for EncoderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => write!(f, "termination by signal"),
        }
    }
}

/// What was written to the encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub notes: usize,
    pub samples: usize,
    pub bytes: usize,
}

/// Owns the write end of the encoder input.
///
/// Every write blocks until the stream has accepted all bytes, so at most one
/// note (plus its trailing gap) is ever in flight, no matter how slowly the
/// encoder consumes its input.
pub struct EncoderSink<E: Encoder> {
    encoder: E,
    input: E::Input,
    gap_samples: usize,
    buffer: Vec<u8>,
    report: SinkReport,
}

impl<E: Encoder> EncoderSink<E> {
    pub fn open(mut encoder: E, format: SampleFormat) -> Result<Self, RenderError> {
        let input = encoder
            .open(format)
            .map_err(|source| RenderError::SpawnEncoder { source })?;
        Ok(Self {
            encoder,
            input,
            gap_samples: format.samples(GAP_SECONDS),
            buffer: Vec::new(),
            report: SinkReport::default(),
        })
    }

    /// Length of the silence following each note, in samples.
    pub fn gap_samples(&self) -> usize {
        self.gap_samples
    }

    /// Write a note followed by a gap of silence.
    /// Returns only once both have been accepted by the encoder input.
    pub fn write_note(&mut self, note: &PcmBuffer) -> Result<(), RenderError> {
        self.write_buffer(note)?;
        let gap = PcmBuffer::silence(self.gap_samples);
        self.write_buffer(&gap)?;

        self.report.notes += 1;
        debug!(
            "wrote note {} ({} samples + {} samples gap)",
            self.report.notes,
            note.len(),
            gap.len()
        );
        Ok(())
    }

    fn write_buffer(&mut self, pcm: &PcmBuffer) -> Result<(), RenderError> {
        use std::io::Write;

        if self.buffer.len() != pcm.byte_len() {
            self.buffer.resize(pcm.byte_len(), 0);
        }
        let n = pcm.copy_bytes_to(&mut self.buffer);
        debug_assert_eq!(n, pcm.len());

        self.input
            .write_all(&self.buffer)
            .and_then(|_| self.input.flush())
            .map_err(|source| RenderError::ChannelWrite { source })?;

        self.report.samples += pcm.len();
        self.report.bytes += self.buffer.len();
        trace!("{} bytes accepted by encoder", self.buffer.len());
        Ok(())
    }

    /// Close the encoder input and wait for the encoder to terminate.
    /// Succeeds only if the encoder exited cleanly.
    pub fn finish(self) -> Result<SinkReport, RenderError> {
        let EncoderSink {
            mut encoder,
            input,
            report,
            ..
        } = self;

        encoder
            .close_input(input)
            .map_err(|source| RenderError::CloseInput { source })?;
        debug!("encoder input closed after {} bytes", report.bytes);

        let status = encoder
            .wait()
            .map_err(|source| RenderError::AwaitEncoder { source })?;
        debug!("encoder terminated with {}", status);

        if status.success() {
            Ok(report)
        } else {
            Err(RenderError::EncoderFailed { status })
        }
    }

    /// Give up after a failed write: close the encoder input anyway and reap the encoder.
    /// Returns how the encoder terminated, if that could still be observed.
    pub fn abort(self) -> Option<EncoderStatus> {
        let EncoderSink {
            mut encoder,
            input,
            report,
            ..
        } = self;

        if let Err(err) = encoder.close_input(input) {
            debug!("closing the encoder input after a failure: {}", err);
        }
        match encoder.wait() {
            Ok(status) => {
                debug!(
                    "encoder terminated with {} after {} notes",
                    status, report.notes
                );
                Some(status)
            }
            Err(err) => {
                error!("Failed to wait for the encoder: {}", err);
                None
            }
        }
    }
}
