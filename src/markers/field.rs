use crate::stream::Frame;

/// Collects a fixed-length byte field spread over successive frames.
///
/// Nothing is collected until the extractor is armed with a start frame.
/// Each active frame contributes the bytes at the offsets in `selection`,
/// in order; the very first frame of a run skips `skip_first` of them.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    length: usize,
    selection: &'static [usize],
    skip_first: usize,
    start_frame: Option<u64>,
    field: Vec<u8>,
}

impl FieldExtractor {
    pub fn new(length: usize, selection: &'static [usize], skip_first: usize) -> Self {
        Self {
            length,
            selection,
            skip_first,
            start_frame: None,
            field: Vec::with_capacity(length),
        }
    }

    /// Restarts collection at `start_frame`.
    pub fn arm_at(&mut self, start_frame: u64) {
        self.field.clear();
        self.start_frame = Some(start_frame);
    }

    /// Drops any progress and waits to be armed again.
    pub fn disarm(&mut self) {
        self.field.clear();
        self.start_frame = None;
    }

    pub fn field(&self) -> &[u8] {
        &self.field
    }

    /// Returns true once the field is complete.
    pub fn feed(&mut self, frame_index: u64, frame: &Frame) -> bool {
        let Some(start) = self.start_frame else {
            return false;
        };
        if frame_index < start {
            return false;
        }
        if self.field.len() >= self.length {
            return true;
        }

        for (byteno, &offset) in self.selection.iter().enumerate() {
            if self.field.is_empty() && byteno < self.skip_first {
                continue;
            }
            self.field.push(frame[offset]);
            if self.field.len() >= self.length {
                return true;
            }
        }

        false
    }
}

/// Ends the field at its first NUL, then strips leading and trailing spaces,
/// leaving interior ones alone.
pub fn trim_spaces(field: &[u8]) -> &[u8] {
    let field = match field.iter().position(|b| *b == 0) {
        Some(nul) => &field[..nul],
        None => field,
    };
    let start = field.iter().position(|b| *b != b' ').unwrap_or(field.len());
    let end = field.iter().rposition(|b| *b != b' ').map_or(start, |i| i + 1);
    &field[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{NAME_LEN, NAME_SELECTION, NAME_SKIP_FIRST};

    /// Lays out `name` the way the recorder does: the first byte sits in byte 0
    /// of the first frame, then two bytes per frame from the left channel,
    /// byte swapped.
    fn name_frames(name: &[u8]) -> Vec<Frame> {
        let mut frames = vec![[name[0], 0, 0xaa, 0xbb]];
        for pair in name[1..].chunks(2) {
            let hi = pair[0];
            let lo = pair.get(1).copied().unwrap_or(b' ');
            frames.push([lo, hi, 0xcc, 0xdd]);
        }
        frames
    }

    fn name_extractor() -> FieldExtractor {
        FieldExtractor::new(NAME_LEN, NAME_SELECTION, NAME_SKIP_FIRST)
    }

    #[test]
    fn idle_until_armed() {
        let mut extractor = name_extractor();
        for i in 0..100 {
            assert!(!extractor.feed(i, &[1, 2, 3, 4]));
        }
        assert!(extractor.field().is_empty());
    }

    #[test]
    fn extracts_exact_length_from_start_frame() {
        let name = b"  MY SONG  TAKE ";
        let mut frames = vec![[7, 7, 7, 7]; 5];
        frames.extend(name_frames(name));
        frames.push([7, 7, 7, 7]);

        let mut extractor = name_extractor();
        extractor.arm_at(5);

        let done_at = frames
            .iter()
            .enumerate()
            .position(|(i, f)| extractor.feed(i as u64, f));

        // 1 byte from the first frame, 2 from each of the next 7, 1 from the last
        assert_eq!(done_at, Some(5 + 8));
        assert_eq!(extractor.field(), name);
        assert_eq!(trim_spaces(extractor.field()), b"MY SONG  TAKE");
    }

    #[test]
    fn stays_complete_until_rearmed() {
        let mut extractor = FieldExtractor::new(2, NAME_SELECTION, 0);
        extractor.arm_at(0);
        assert!(extractor.feed(0, &[b'b', b'a', 0, 0]));
        assert!(extractor.feed(1, &[b'x', b'y', 0, 0]));
        assert_eq!(extractor.field(), b"ab");

        extractor.arm_at(10);
        assert!(!extractor.feed(2, &[b'd', b'c', 0, 0]));
        assert!(extractor.field().is_empty());
        assert!(extractor.feed(10, &[b'd', b'c', 0, 0]));
        assert_eq!(extractor.field(), b"cd");

        extractor.disarm();
        assert!(!extractor.feed(11, &[b'd', b'c', 0, 0]));
    }

    #[test]
    fn trim_keeps_interior_spaces() {
        assert_eq!(trim_spaces(b"   a b   "), b"a b");
        assert_eq!(trim_spaces(b"abc"), b"abc");
        assert_eq!(trim_spaces(b"    "), b"");
        assert_eq!(trim_spaces(b""), b"");
    }

    #[test]
    fn trim_ends_field_at_first_nul() {
        assert_eq!(trim_spaces(b"MIX\0\0\0\0\0\0\0\0\0\0\0\0\0"), b"MIX");
        assert_eq!(trim_spaces(b" A B \0junk  "), b"A B");
        assert_eq!(trim_spaces(b"\0NAME"), b"");
    }

    #[test]
    fn trim_keeps_high_bytes() {
        assert_eq!(trim_spaces(b" L\xe5t 1 "), b"L\xe5t 1");
    }
}
