use clap::Parser;
use std::path::PathBuf;

use crate::transport::{TrackPairs, TransportOptions};

fn parse_tracks(arg: &str) -> Result<TrackPairs, String> {
    let tracks: u8 = arg.parse().map_err(|_| format!("not a track count: {arg}"))?;
    TrackPairs::from_tracks("track count", tracks).map_err(|err| err.to_string())
}

/// Filter Korg D8 backup streams (raw 16-bit stereo PCM) from input to output.
///
/// For -x, -c and -t, an additional second of silence is written at the end.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Start output on this frame index, counted from 0 (one frame earlier
    /// than the 1-based count of the D8 tools)
    #[arg(short = 's', value_name = "FRAME")]
    pub start_frame: Option<u64>,

    /// Start output on sync tone
    #[arg(short = 'm')]
    pub start_on_tone: bool,

    /// (Trim) Output from sync tone to end of song
    #[arg(short = 't')]
    pub trim: bool,

    /// Expand output from given number of tracks (2, 4 or 6)
    #[arg(short = 'x', value_name = "TRACKS", value_parser = parse_tracks, conflicts_with = "cut")]
    pub expand: Option<TrackPairs>,

    /// Cut output after given number of tracks (2, 4 or 6)
    #[arg(short = 'c', value_name = "TRACKS", value_parser = parse_tracks)]
    pub cut: Option<TrackPairs>,

    /// Don't break input: read input until eof
    #[arg(short = 'z')]
    pub no_break: bool,

    /// Output name to stdout, then exit
    #[arg(short = 'n')]
    pub name_only: bool,

    /// Write to this file instead of stdout; the file must not exist
    #[arg(short = 'o', value_name = "FILE", conflicts_with = "song_filename")]
    pub output: Option<PathBuf>,

    /// Name the output file after the song
    #[arg(short = 'f')]
    pub song_filename: bool,

    /// Skip songs until song N found (N = 1, 2, ..)
    #[arg(
        short = 'C',
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub song_number: u32,

    /// Start when any input sample != 0
    #[arg(short = 'S')]
    pub start_on_sound: bool,

    /// End when 1s of silence detected
    #[arg(short = 'E')]
    pub stop_on_silence: bool,

    /// Read from this file instead of stdin
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            start_frame: self.start_frame,
            start_on_tone: self.start_on_tone,
            stop_on_song_end: self.trim,
            expand: self.expand,
            cut: self.cut,
            break_on_stop: !self.no_break,
            name_only: self.name_only,
            song_number: self.song_number,
            start_on_sound: self.start_on_sound,
            stop_on_silence: self.stop_on_silence,
        }
    }
}
