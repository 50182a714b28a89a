use std::io::{Read, Write};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{D8Error, Result};
use crate::markers::{
    NAME_LEN, NAME_OFFSET, NAME_SELECTION, NAME_SKIP_FIRST, SYNC_BLIP, SYNC_TONE, SYNC_TONE_FRAMES,
    field::{FieldExtractor, trim_spaces},
    pattern::{MatchResult, PatternMatcher, is_silent},
};
use crate::output::{Output, sample_time};
use crate::states::TransportState;
use crate::stream::{FRAME_SIZE, Frame, ONE_SECOND, SampleSink, SampleSource};

/// Track count for expand and cut, held as pairs of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackPairs(u32);

impl TrackPairs {
    pub fn from_tracks(what: &'static str, tracks: u8) -> Result<Self> {
        match tracks {
            2 | 4 | 6 => Ok(Self(u32::from(tracks) / 2)),
            value => Err(D8Error::TrackCount { what, value }),
        }
    }

    pub fn pairs(self) -> u32 {
        self.0
    }

    pub fn tracks(self) -> u32 {
        self.0 * 2
    }
}

#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Start copying at this frame index.
    pub start_frame: Option<u64>,
    pub start_on_tone: bool,
    pub stop_on_song_end: bool,
    pub expand: Option<TrackPairs>,
    pub cut: Option<TrackPairs>,
    /// Stop reading input once output has stopped.
    pub break_on_stop: bool,
    pub name_only: bool,
    /// 1-based number of the song to process.
    pub song_number: u32,
    pub start_on_sound: bool,
    pub stop_on_silence: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            start_frame: None,
            start_on_tone: false,
            stop_on_song_end: false,
            expand: None,
            cut: None,
            break_on_stop: true,
            name_only: false,
            song_number: 1,
            start_on_sound: false,
            stop_on_silence: false,
        }
    }
}

impl TransportOptions {
    pub fn validate(&self) -> Result<()> {
        if self.expand.is_some() && self.cut.is_some() {
            return Err(D8Error::ExpandAndCut);
        }
        if self.song_number < 1 {
            return Err(D8Error::SongNumber);
        }
        Ok(())
    }

    /// Expand, cut and trim all work on a whole song, so they start on its tone.
    pub fn starts_on_tone(&self) -> bool {
        self.start_on_tone || self.stop_on_song_end || self.expand.is_some() || self.cut.is_some()
    }

    fn pads_end(&self) -> bool {
        self.expand.is_some() || self.cut.is_some() || self.stop_on_song_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    EndOfInput,
    Stopped,
    NameFound,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub end: EndReason,
    pub frames_read: u64,
    pub bytes_read: u64,
    pub frames_written: u64,
    pub bytes_written: u64,
    /// Display form of the name; bytes that are not UTF-8 are replaced.
    pub song_name: Option<String>,
    #[serde(skip)]
    pub song_name_bytes: Option<Vec<u8>>,
    pub sync_blips: u32,
    pub song_length_frames: u64,
}

enum Flow {
    Continue,
    Break(EndReason),
}

/// Drives copying from input to output off the markers found in the input.
pub struct TransportController {
    options: TransportOptions,
    state: TransportState,
    blip: PatternMatcher,
    tone: PatternMatcher,
    quiet: PatternMatcher,
    name: FieldExtractor,
}

impl TransportController {
    pub fn new(options: TransportOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            state: TransportState::new(options.song_number),
            options,
            blip: PatternMatcher::new(SYNC_BLIP),
            tone: PatternMatcher::new(SYNC_TONE),
            quiet: PatternMatcher::silence(ONE_SECOND as usize),
            name: FieldExtractor::new(NAME_LEN, NAME_SELECTION, NAME_SKIP_FIRST),
        })
    }

    pub fn run<R: Read, W: Write>(
        &mut self,
        input: &mut SampleSource<R>,
        output: &mut SampleSink<W>,
        progress: &Output,
    ) -> Result<RunSummary> {
        let end = loop {
            let Some(frame) = input.read_frame()? else {
                info!(
                    "Reached end of input stream at {}",
                    sample_time(input.frames_read())
                );
                break EndReason::EndOfInput;
            };
            progress.inc();

            let index = input.frames_read() - 1;
            if let Flow::Break(reason) = self.process_frame(index, &frame, output)? {
                break reason;
            }
        };

        if !self.options.name_only {
            self.finish(output)?;
        }
        output.flush()?;
        progress.finish();

        Ok(RunSummary {
            end,
            frames_read: input.frames_read(),
            bytes_read: input.bytes_read(),
            frames_written: output.frames_written(),
            bytes_written: output.bytes_written(),
            song_name: self
                .state
                .song_name
                .as_deref()
                .map(|name| String::from_utf8_lossy(name).into_owned()),
            song_name_bytes: self.state.song_name.clone(),
            sync_blips: self.state.syncblips,
            song_length_frames: self.state.song_delta,
        })
    }

    fn process_frame<W: Write>(
        &mut self,
        index: u64,
        frame: &Frame,
        output: &mut SampleSink<W>,
    ) -> Result<Flow> {
        let emit_audio = !self.options.name_only;

        if self.options.start_frame == Some(index) {
            self.state.start_trigger = true;
        }

        if !self.state.copying && self.options.start_on_sound && !is_silent(frame) {
            info!(
                "Found nonzero sample at {}, copying to output",
                sample_time(index)
            );
            self.state.start_trigger = true;
        }

        if !self.state.synctone_found && self.tone.feed(index, frame).is_match() {
            self.state.synctone_found = true;
            if self.state.song_countdown > 1 {
                info!("Found synctone at {} (skipping)", sample_time(index));
            } else {
                info!("Found synctone at {}", sample_time(index));
                if self.options.starts_on_tone() {
                    if emit_audio {
                        output.write_silence(ONE_SECOND)?;
                        // The matcher consumed the lead-in of the tone, which
                        // belongs to the song.
                        output.write_frames(&SYNC_TONE[..(SYNC_TONE_FRAMES - 1) * FRAME_SIZE])?;
                    }
                    self.state.start_trigger = true;
                }
            }
        }

        if !self.state.found_name && self.name.feed(index, frame) {
            let song_name = trim_spaces(self.name.field()).to_vec();
            if self.state.synctone_found {
                info!("Song name: \"{}\"", song_name.escape_ascii());
                self.state.found_name = true;
                self.state.song_name = Some(song_name);
                if self.options.name_only {
                    return Ok(Flow::Break(EndReason::NameFound));
                }
            } else {
                info!("Song name: \"{}\" (skipping)", song_name.escape_ascii());
                self.name.disarm();
            }
        }

        if self.state.synctone_found {
            if let MatchResult::Match(blip_start) = self.blip.feed(index, frame) {
                if self.state.song_countdown > 1 {
                    self.state.song_countdown -= 1;
                    self.state.synctone_found = false;
                    // Name of the skipped song, for the log only.
                    self.name.arm_at(index + NAME_OFFSET);
                    debug!(
                        "Syncblip at {} while skipping, {} song(s) to go",
                        sample_time(blip_start),
                        self.state.song_countdown - 1
                    );
                    return Ok(Flow::Continue);
                }

                self.on_blip(index, blip_start);
            }
        }

        if self.options.stop_on_song_end
            && self.state.copying
            && self.state.syncblips >= 6
            && index == self.state.blip_frame + self.state.song_delta
        {
            info!(
                "Reached end of song at {}, stopping output",
                sample_time(index)
            );
            self.state.stop_trigger = true;
        }

        if self.options.stop_on_silence
            && self.state.copying
            && self.quiet.feed(index, frame).is_match()
        {
            info!(
                "Found 1s of silence at {}, stopping output",
                sample_time(index)
            );
            self.state.stop_trigger = true;
        }

        if self.state.start_trigger && !self.state.copying {
            info!("Copying to output from {}", sample_time(index));
            self.state.copying = true;
            self.state.start_trigger = false;
        }

        if self.state.copying && emit_audio {
            output.write_frame(frame)?;
        }

        if self.state.stop_trigger {
            self.state.copying = false;
            self.state.stop_trigger = false;
            if self.options.break_on_stop {
                info!(
                    "Stopped copying; breaking input at {}",
                    sample_time(index)
                );
                return Ok(Flow::Break(EndReason::Stopped));
            }
        }

        Ok(Flow::Continue)
    }

    fn on_blip(&mut self, index: u64, blip_start: u64) {
        let state = &mut self.state;
        state.syncblips += 1;

        if state.syncblips == 1 {
            self.name.arm_at(index + NAME_OFFSET);
        }

        let delta = index - state.blip_frame;
        info!(
            "Syncblip at {}, segment length is {}",
            sample_time(blip_start),
            sample_time(delta)
        );

        if state.syncblips >= 4 && delta > state.song_delta {
            state.song_delta = delta;
        }

        // Expand and cut fire from the fourth blip on, once song_delta is known.
        let segments = state.syncblips.checked_sub(3);
        if let Some(expand) = self.options.expand {
            if segments == Some(expand.pairs()) {
                info!("Will expand with silence and blips from {}", sample_time(index));
                state.stop_trigger = true;
            }
        }
        if let Some(cut) = self.options.cut {
            if segments == Some(cut.pairs()) {
                info!("Cutting input from {}, stopping output", sample_time(index));
                state.stop_trigger = true;
            }
        }

        state.blip_frame = index;
    }

    fn finish<W: Write>(&mut self, output: &mut SampleSink<W>) -> Result<()> {
        let song_delta = self.state.song_delta;

        if let Some(expand) = self.options.expand {
            let repeats = 4u32.saturating_sub(expand.pairs());
            for remaining in (0..repeats).rev() {
                info!("Outputting {} of silence", sample_time(song_delta));
                output.write_silence(song_delta)?;
                if remaining > 0 {
                    info!("Outputting sync blip");
                    output.write_frames(SYNC_BLIP)?;
                }
            }
        }

        if self.options.pads_end() {
            output.write_silence(ONE_SECOND)?;
        }

        Ok(())
    }
}
