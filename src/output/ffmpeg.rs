// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Encoding audio using an ffmpeg subprocess.

use std::ffi::OsString;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use log::debug;

use super::{Encoder, EncoderStatus};
use crate::wave::SampleFormat;

/// Runs ffmpeg reading headerless `s16le` audio from its stdin.
///
/// Defaults to MP3 via LAME at VBR quality 2.
/// Stdout and stderr of the subprocess are inherited.
#[derive(Debug)]
pub struct FfmpegEncoder {
    program: PathBuf,
    output: PathBuf,
    codec: String,
    quality: String,
    process: Subprocess,
}

impl FfmpegEncoder {
    pub fn new<P: AsRef<Path>>(output: P) -> Self {
        // For properly recording the ffmpeg dependency on nix:
        let program = if let Some(ffmpeg_bin) = option_env!("NIX_FFMPEG_BIN") {
            debug!("using ffmpeg from nix store {}", ffmpeg_bin);
            Path::new(ffmpeg_bin).join("ffmpeg")
        } else {
            "ffmpeg".into()
        };
        Self {
            program,
            output: output.as_ref().to_owned(),
            codec: "libmp3lame".to_owned(),
            quality: "2".to_owned(),
            process: Subprocess::default(),
        }
    }

    pub fn program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn codec<S: Into<String>>(mut self, codec: S) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn quality<S: Into<String>>(mut self, quality: S) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// What to report once the output file was written successfully.
    ///
    /// ```
    /// use txt2mp3::output::ffmpeg::FfmpegEncoder;
    ///
    /// let encoder = FfmpegEncoder::new("out.mp3");
    /// assert_eq!(encoder.written_message(), "Audio written to out.mp3 (libmp3lame)");
    /// ```
    pub fn written_message(&self) -> String {
        format!(
            "Audio written to {} ({})",
            self.output.display(),
            self.codec
        )
    }

    /// Command line arguments passed to ffmpeg.
    ///
    /// # Example
    ///
    /// ```
    /// use txt2mp3::output::ffmpeg::FfmpegEncoder;
    /// use txt2mp3::wave::SampleFormat;
    ///
    /// let args = FfmpegEncoder::new("out.mp3").args(SampleFormat::default());
    /// let expected: Vec<&str> =
    ///     "-y -f s16le -ar 44100 -ac 1 -i pipe:0 -codec:a libmp3lame -q:a 2 out.mp3"
    ///         .split(' ')
    ///         .collect();
    /// assert_eq!(args, expected);
    /// ```
    pub fn args(&self, format: SampleFormat) -> Vec<OsString> {
        vec![
            "-y".into(),
            "-f".into(),
            "s16le".into(),
            "-ar".into(),
            format.sample_rate.to_string().into(),
            "-ac".into(),
            SampleFormat::CHANNELS.to_string().into(),
            "-i".into(),
            "pipe:0".into(),
            "-codec:a".into(),
            self.codec.clone().into(),
            "-q:a".into(),
            self.quality.clone().into(),
            self.output.clone().into_os_string(),
        ]
    }
}

impl Encoder for FfmpegEncoder {
    type Input = ChildStdin;

    fn open(&mut self, format: SampleFormat) -> io::Result<ChildStdin> {
        let mut command = Command::new(&self.program);
        command.args(self.args(format));
        self.process.spawn(command)
    }

    fn close_input(&mut self, input: ChildStdin) -> io::Result<()> {
        Subprocess::close(input)
    }

    fn wait(&mut self) -> io::Result<EncoderStatus> {
        self.process.wait()
    }
}

/// A child process fed through its stdin.
#[derive(Debug, Default)]
pub(crate) struct Subprocess {
    child: Option<Child>,
}

impl Subprocess {
    pub(crate) fn spawn(&mut self, mut command: Command) -> io::Result<ChildStdin> {
        debug!("starting {:?}", command);
        let mut child = command.stdin(Stdio::piped()).spawn()?;

        let input = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "stdin is not piped"));
        self.child = Some(child);
        input
    }

    pub(crate) fn close(mut input: ChildStdin) -> io::Result<()> {
        input.flush()?;
        // dropping the handle closes our end of the pipe, the encoder sees EOF
        drop(input);
        Ok(())
    }

    pub(crate) fn wait(&mut self) -> io::Result<EncoderStatus> {
        let child = self.child.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "process was never started")
        })?;
        let status = child.wait()?;
        self.child = None;
        Ok(status.into())
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use crate::melody::Phrasing;
    use crate::output::EncoderSink;
    use crate::render::{RenderError, Renderer};
    use crate::wave::PcmBuffer;

    use std::cell::Cell;
    use std::rc::Rc;

    /// Stands in for ffmpeg by running a shell script.
    struct ScriptEncoder {
        script: &'static str,
        process: Subprocess,
        /// How the script terminated, once it has been waited for.
        exited: Rc<Cell<Option<EncoderStatus>>>,
    }

    impl ScriptEncoder {
        fn new(script: &'static str) -> Self {
            Self {
                script,
                process: Subprocess::default(),
                exited: Rc::new(Cell::new(None)),
            }
        }
    }

    impl Encoder for ScriptEncoder {
        type Input = ChildStdin;

        fn open(&mut self, _format: SampleFormat) -> io::Result<ChildStdin> {
            let mut command = Command::new("sh");
            command.arg("-c").arg(self.script);
            self.process.spawn(command)
        }

        fn close_input(&mut self, input: ChildStdin) -> io::Result<()> {
            Subprocess::close(input)
        }

        fn wait(&mut self) -> io::Result<EncoderStatus> {
            let status = self.process.wait()?;
            self.exited.set(Some(status));
            Ok(status)
        }
    }

    #[test]
    fn wait_before_open_fails() {
        let mut encoder = FfmpegEncoder::new("out.mp3");
        assert_eq!(
            encoder.wait().unwrap_err().kind(),
            io::ErrorKind::NotConnected
        );
    }

    #[test]
    fn missing_program() {
        let encoder = FfmpegEncoder::new("/dev/null").program("/nonexistent/ffmpeg");
        match EncoderSink::open(encoder, SampleFormat::default()) {
            Err(RenderError::SpawnEncoder { .. }) => {}
            Err(other) => panic!("expected spawn failure, got {:?}", other),
            Ok(_) => panic!("expected spawn failure"),
        }
    }

    #[test]
    fn custom_codec_and_quality() {
        let encoder = FfmpegEncoder::new("song.ogg")
            .codec("libvorbis")
            .quality("5");
        let args = encoder.args(SampleFormat::new(22050));
        assert!(args.windows(2).any(|w| w[0] == "-ar" && w[1] == "22050"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "-codec:a" && w[1] == "libvorbis"));
        assert!(args.windows(2).any(|w| w[0] == "-q:a" && w[1] == "5"));
        assert_eq!(args.last().unwrap(), "song.ogg");
        assert_eq!(encoder.output(), Path::new("song.ogg"));
        assert_eq!(
            encoder.written_message(),
            "Audio written to song.ogg (libvorbis)"
        );
    }

    #[test]
    fn streams_into_process() {
        let encoder = ScriptEncoder::new("cat > /dev/null");
        let mut sink = EncoderSink::open(encoder, SampleFormat::default()).unwrap();
        sink.write_note(&PcmBuffer::silence(44100)).unwrap();
        let report = sink.finish().unwrap();
        assert_eq!(report.notes, 1);
        assert_eq!(report.bytes, (44100 + 1323) * 2);
    }

    #[test]
    fn exit_code_is_surfaced() {
        let encoder = ScriptEncoder::new("cat > /dev/null; exit 3");
        let mut sink = EncoderSink::open(encoder, SampleFormat::default()).unwrap();
        sink.write_note(&PcmBuffer::silence(100)).unwrap();
        match sink.finish() {
            Err(RenderError::EncoderFailed { status }) => assert_eq!(status.code, Some(3)),
            other => panic!("expected encoder failure, got {:?}", other),
        }
    }

    #[test]
    fn early_exit_breaks_the_channel() {
        let encoder = ScriptEncoder::new("exit 0");
        let mut sink = EncoderSink::open(encoder, SampleFormat::default()).unwrap();
        // far more than any pipe buffer holds
        match sink.write_note(&PcmBuffer::silence(4 * 1024 * 1024)) {
            Err(RenderError::ChannelWrite { source }) => {
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe)
            }
            other => panic!("expected write failure, got {:?}", other),
        }
        // the exited script is reaped, not left behind as a zombie
        assert_eq!(sink.abort(), Some(EncoderStatus::exited(0)));
    }

    #[test]
    fn failed_render_reaps_the_encoder() {
        let encoder = ScriptEncoder::new("exit 4");
        let exited = encoder.exited.clone();
        let renderer = Renderer {
            phrasing: Phrasing {
                // a single note lasting a minute, far more than any pipe buffer holds
                legato: 60.0,
                ..Phrasing::default()
            },
            ..Renderer::default()
        };
        match renderer.render("x", 60, encoder) {
            Err(RenderError::ChannelWrite { .. }) => {}
            other => panic!("expected write failure, got {:?}", other),
        }
        assert_eq!(exited.get(), Some(EncoderStatus::exited(4)));
    }
}
