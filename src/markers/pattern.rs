use std::borrow::Cow;

use crate::stream::{FRAME_SIZE, Frame, SILENT_FRAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    /// Index of the first frame of the matched pattern.
    Match(u64),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match(_))
    }
}

/// Tracks progress of a frame-aligned byte pattern against a frame stream.
///
/// On a mismatch part way through the pattern the current frame is retried
/// once against the start of the pattern. This is not a general substring
/// search: occurrences overlapping a failed partial match can be missed when
/// the pattern has a self-overlapping prefix. The marker shapes in use (one
/// repeated motif, or an all-zero lead frame) are unaffected.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: Cow<'static, [u8]>,
    matchpoint: usize,
}

impl PatternMatcher {
    pub fn new(pattern: impl Into<Cow<'static, [u8]>>) -> Self {
        let pattern = pattern.into();
        assert!(
            !pattern.is_empty() && pattern.len() % FRAME_SIZE == 0,
            "pattern length must be a non-zero multiple of the frame size"
        );

        Self {
            pattern,
            matchpoint: 0,
        }
    }

    /// Matches a run of `frames` consecutive zero frames.
    pub fn silence(frames: usize) -> Self {
        Self::new(vec![0u8; frames * FRAME_SIZE])
    }

    pub fn frames(&self) -> u64 {
        (self.pattern.len() / FRAME_SIZE) as u64
    }

    pub fn feed(&mut self, frame_index: u64, frame: &Frame) -> MatchResult {
        // At most two comparisons: at the current offset, then from the start.
        for _ in 0..2 {
            let next = self.matchpoint + FRAME_SIZE;
            if frame[..] == self.pattern[self.matchpoint..next] {
                self.matchpoint = next;
                if self.matchpoint < self.pattern.len() {
                    return MatchResult::NoMatch;
                }

                self.matchpoint = 0;
                let start = (frame_index + 1).saturating_sub(self.frames());
                return MatchResult::Match(start);
            }

            if self.matchpoint == 0 {
                break;
            }
            self.matchpoint = 0;
        }

        MatchResult::NoMatch
    }
}

pub fn is_silent(frame: &Frame) -> bool {
    *frame == SILENT_FRAME
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{SYNC_BLIP, SYNC_TONE};

    fn frames_of(bytes: &[u8]) -> Vec<Frame> {
        bytes
            .chunks_exact(FRAME_SIZE)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect()
    }

    fn feed_all(matcher: &mut PatternMatcher, frames: &[Frame]) -> Vec<u64> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(i, f)| match matcher.feed(i as u64, f) {
                MatchResult::Match(start) => Some(start),
                MatchResult::NoMatch => None,
            })
            .collect()
    }

    #[test]
    fn short_input_never_matches() {
        let mut matcher = PatternMatcher::new(SYNC_BLIP);
        let frames = frames_of(&SYNC_BLIP[..12]);
        assert!(feed_all(&mut matcher, &frames).is_empty());
    }

    #[test]
    fn exact_pattern_reports_first_frame() {
        let mut matcher = PatternMatcher::new(SYNC_TONE);
        let mut frames = vec![[9, 9, 9, 9]; 7];
        frames.extend(frames_of(SYNC_TONE));
        frames.push([1, 1, 1, 1]);

        assert_eq!(feed_all(&mut matcher, &frames), vec![7]);
    }

    #[test]
    fn back_to_back_occurrences_both_match() {
        let mut matcher = PatternMatcher::new(SYNC_BLIP);
        let mut bytes = SYNC_BLIP.to_vec();
        bytes.extend_from_slice(SYNC_BLIP);

        assert_eq!(feed_all(&mut matcher, &frames_of(&bytes)), vec![0, 4]);
    }

    #[test]
    fn mismatch_retries_current_frame_from_start() {
        // A stray zero frame before the tone: the partial match restarts on it.
        let mut matcher = PatternMatcher::new(SYNC_TONE);
        let mut bytes = SYNC_TONE[..8].to_vec();
        bytes.extend_from_slice(SYNC_TONE);

        assert_eq!(feed_all(&mut matcher, &frames_of(&bytes)), vec![2]);
    }

    #[test]
    fn overlapping_prefix_is_missed() {
        let a = [1, 1, 1, 1];
        let b = [2, 2, 2, 2];
        let mut pattern = Vec::new();
        for f in [a, a, b] {
            pattern.extend_from_slice(&f);
        }
        let mut matcher = PatternMatcher::new(pattern);

        // "a a a b" contains "a a b" at frame 1, but the retry only rewinds
        // one frame so progress restarts at frame 2.
        assert!(feed_all(&mut matcher, &[a, a, a, b]).is_empty());
    }

    #[test]
    fn nonzero_frame_resets_silence_run() {
        let mut matcher = PatternMatcher::silence(10);
        let mut frames = vec![SILENT_FRAME; 9];
        frames.push([0, 0, 1, 0]);
        frames.extend(vec![SILENT_FRAME; 10]);

        assert_eq!(feed_all(&mut matcher, &frames), vec![10]);
    }

    #[test]
    fn silent_frame_detection() {
        assert!(is_silent(&[0, 0, 0, 0]));
        assert!(!is_silent(&[0, 0, 0, 1]));
    }
}
