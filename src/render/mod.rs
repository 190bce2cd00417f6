// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The glue responsible for turning a phrase into an encoded audio file.

use std::io;

use log::{debug, info};
use snafu::Snafu;

use crate::melody::Phrasing;
use crate::output::{Encoder, EncoderSink, EncoderStatus, SinkReport};
use crate::synth;
use crate::wave::SampleFormat;

#[derive(Debug, Snafu)]
pub enum RenderError {
    #[snafu(display("Failed to start the encoder: {}", source))]
    SpawnEncoder { source: io::Error },
    #[snafu(display("Failed to write audio to the encoder: {}", source))]
    ChannelWrite { source: io::Error },
    #[snafu(display("Failed to close the encoder input: {}", source))]
    CloseInput { source: io::Error },
    #[snafu(display("Failed to wait for the encoder: {}", source))]
    AwaitEncoder { source: io::Error },
    #[snafu(display("Encoder failed with {}", status))]
    EncoderFailed { status: EncoderStatus },
}

impl RenderError {
    /// Process exit code to report this error with.
    /// An encoder failure passes on the encoder's own exit code where there is one.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::EncoderFailed { status } => match status.code {
                Some(code) if code != 0 => code,
                _ => 1,
            },
            _ => 1,
        }
    }
}

/// Plays phrases into an encoder.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub format: SampleFormat,
    pub phrasing: Phrasing,
}

impl Renderer {
    /// Render `phrase` note by note into `encoder`.
    ///
    /// Each note is only synthesized after the previous one has been accepted
    /// by the encoder. The first failure aborts the remaining notes.
    pub fn render<E: Encoder>(
        &self,
        phrase: &str,
        bpm: i64,
        encoder: E,
    ) -> Result<SinkReport, RenderError> {
        let notes = self.phrasing.build_sequence(phrase, bpm);
        let note_seconds = notes.first().map_or(0.0, |n| n.duration);

        info!(
            "playing {} notes at {} bpm at {} Hz",
            notes.len(),
            bpm.max(1),
            self.format.sample_rate
        );
        debug!("each note lasts {:.3} seconds", note_seconds);

        let mut sink = EncoderSink::open(encoder, self.format)?;
        for (index, note) in notes.iter().enumerate() {
            debug!("note {}: {:?}", index, note);
            let pcm = synth::synthesize_note(self.format, note);
            if let Err(err) = sink.write_note(&pcm) {
                sink.abort();
                return Err(err);
            }
        }
        let report = sink.finish()?;

        info!(
            "total length {} samples ({:.2} seconds)",
            report.samples,
            report.samples as f64 / self.format.sample_rate as f64
        );
        Ok(report)
    }
}

/// Render `phrase` with the default format and phrasing.
pub fn render_phrase<E: Encoder>(
    phrase: &str,
    bpm: i64,
    encoder: E,
) -> Result<SinkReport, RenderError> {
    Renderer::default().render(phrase, bpm, encoder)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::melody::build_sequence;
    use crate::output::test::{MemoryEncoder, Op};

    #[test]
    fn hi_at_120() {
        let encoder = MemoryEncoder::new(EncoderStatus::exited(0));
        let log = encoder.log.clone();

        let report = render_phrase("hi", 120, encoder).unwrap();
        assert_eq!(report.notes, 2);
        assert_eq!(report.samples, 2 * (19845 + 1323));

        let writes = MemoryEncoder::writes(&log);
        let lengths: Vec<usize> = writes.iter().map(|w| w.len()).collect();
        assert_eq!(lengths, vec![19845 * 2, 1323 * 2, 19845 * 2, 1323 * 2]);

        let format = SampleFormat::default();
        let notes = build_sequence("hi", 120);
        assert_eq!(writes[0], synth::synthesize_note(format, &notes[0]).to_le_bytes());
        assert_eq!(writes[2], synth::synthesize_note(format, &notes[1]).to_le_bytes());
        assert!(writes[1].iter().chain(writes[3].iter()).all(|&b| b == 0));

        let ops = log.borrow();
        assert_eq!(ops.first(), Some(&Op::Open(format)));
        assert_eq!(ops[ops.len() - 2..], [Op::Close, Op::Wait]);
    }

    #[test]
    fn deterministic_output() {
        let first = MemoryEncoder::new(EncoderStatus::exited(0));
        let second = MemoryEncoder::new(EncoderStatus::exited(0));
        let (first_log, second_log) = (first.log.clone(), second.log.clone());

        render_phrase("Hello, world!", 140, first).unwrap();
        render_phrase("Hello, world!", 140, second).unwrap();
        assert_eq!(
            MemoryEncoder::writes(&first_log),
            MemoryEncoder::writes(&second_log)
        );
    }

    #[test]
    fn empty_phrase_plays_placeholder() {
        let encoder = MemoryEncoder::new(EncoderStatus::exited(0));
        let report = render_phrase(" \n ", 60, encoder).unwrap();
        assert_eq!(report.notes, 1);
    }

    #[test]
    fn encoder_failure_after_all_notes() {
        let encoder = MemoryEncoder::new(EncoderStatus::exited(1));
        let log = encoder.log.clone();
        match render_phrase("abc", 300, encoder) {
            Err(RenderError::EncoderFailed { status }) => assert_eq!(status.code, Some(1)),
            other => panic!("expected encoder failure, got {:?}", other),
        }
        assert_eq!(MemoryEncoder::writes(&log).len(), 6);
    }

    #[test]
    fn broken_channel_stops_the_melody() {
        let mut encoder = MemoryEncoder::new(EncoderStatus::exited(0));
        encoder.fail_after = Some(3);
        let log = encoder.log.clone();
        match render_phrase("abcdef", 120, encoder) {
            Err(RenderError::ChannelWrite { .. }) => {}
            other => panic!("expected write failure, got {:?}", other),
        }
        // note, gap, note; then the encoder is still closed and reaped
        assert_eq!(MemoryEncoder::writes(&log).len(), 3);
        let ops = log.borrow();
        assert_eq!(ops[ops.len() - 2..], [Op::Close, Op::Wait]);
    }

    #[test]
    fn custom_format() {
        let renderer = Renderer {
            format: SampleFormat::new(8000),
            ..Renderer::default()
        };
        let encoder = MemoryEncoder::new(EncoderStatus::exited(0));
        let report = renderer.render("x", 60, encoder).unwrap();
        // 0.9 s note plus 0.03 s gap
        assert_eq!(report.samples, 7200 + 240);
    }

    #[test]
    fn error_messages() {
        let err = RenderError::EncoderFailed {
            status: EncoderStatus::exited(2),
        };
        assert_eq!(err.to_string(), "Encoder failed with exit code 2");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn other_errors_exit_with_one() {
        let killed = RenderError::EncoderFailed {
            status: EncoderStatus { code: None },
        };
        assert_eq!(killed.exit_code(), 1);

        let broken = RenderError::ChannelWrite {
            source: io::Error::new(io::ErrorKind::BrokenPipe, "gone"),
        };
        assert_eq!(broken.exit_code(), 1);
        assert_eq!(
            broken.to_string(),
            "Failed to write audio to the encoder: gone"
        );
    }
}
