// syn.txt -- a text based synthesizer and audio workstation
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `txt2mp3` - turns a phrase into a little melody and encodes it with ffmpeg.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use log::{error, info};
use structopt::StructOpt;

use txt2mp3::output::ffmpeg::FfmpegEncoder;
use txt2mp3::render::Renderer;

#[derive(Debug, StructOpt)]
#[structopt(name = "txt2mp3", about = "Turning phrases into melodies")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// The phrase to play, one note per non-whitespace character.
    #[structopt(default_value = "hello")]
    phrase: String,

    /// Tempo in beats per minute. Values below 1 are played at 1 bpm.
    #[structopt(default_value = "120")]
    bpm: i64,

    /// Output file.
    #[structopt(default_value = "out.mp3", parse(from_os_str))]
    output: PathBuf,

    /// The ffmpeg executable to encode with.
    #[structopt(long, parse(from_os_str))]
    ffmpeg: Option<PathBuf>,

    /// Audio codec passed to ffmpeg.
    #[structopt(long, default_value = "libmp3lame")]
    codec: String,

    /// Codec specific quality passed to ffmpeg, lower is better for MP3.
    #[structopt(long, default_value = "2")]
    quality: String,

    /// Dump the notes generated from the phrase.
    #[structopt(long)]
    #[allow(clippy::option_option)]
    dump_sequence: Option<Option<PathBuf>>,
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("Failed to set up logging: {}", err);
    }

    let renderer = Renderer::default();

    let dump_out = opt
        .dump_sequence
        .as_ref()
        .map(|path| path.clone().unwrap_or_else(|| "/dev/stdout".into()));
    if let Some(dump_out_path) = dump_out {
        if let Err(err) = dump_sequence(&renderer, &opt, &dump_out_path) {
            error!("Failed to dump the note sequence: {}", err);
            process::exit(1);
        }
    }

    let mut encoder = FfmpegEncoder::new(&opt.output)
        .codec(opt.codec.as_str())
        .quality(opt.quality.as_str());
    if let Some(program) = opt.ffmpeg.as_ref() {
        encoder = encoder.program(program);
    }

    let written = encoder.written_message();
    match renderer.render(&opt.phrase, opt.bpm, encoder) {
        Ok(_) => info!("{}", written),
        Err(err) => {
            error!("{}", err);
            process::exit(err.exit_code());
        }
    }
}

fn dump_sequence(renderer: &Renderer, opt: &Opt, path: &Path) -> io::Result<()> {
    let notes = renderer.phrasing.build_sequence(&opt.phrase, opt.bpm);
    let mut f = std::fs::File::create(path)?;
    for note in notes.iter() {
        writeln!(f, "{:?}", note)?;
    }
    Ok(())
}
