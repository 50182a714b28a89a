use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};

use crate::error::{D8Error, Result};

/// 2 bytes per sample * 2 channels
pub const FRAME_SIZE: usize = 4;
pub const SAMPLE_RATE: u64 = 44_100;
pub const ONE_SECOND: u64 = SAMPLE_RATE;
pub const CHUNK_SIZE: usize = 4096;

pub type Frame = [u8; FRAME_SIZE];

pub const SILENT_FRAME: Frame = [0; FRAME_SIZE];

/// Reads a raw byte stream as a sequence of whole stereo frames.
pub struct SampleSource<R: Read> {
    reader: BufReader<R>,
    frames: u64,
    bytes: u64,
    eof: bool,
}

impl<R: Read> SampleSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(CHUNK_SIZE, inner),
            frames: 0,
            bytes: 0,
            eof: false,
        }
    }

    /// Returns the next frame, or `None` once the input is exhausted. A
    /// trailing partial frame is counted in bytes but never returned.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        if self.eof {
            return Ok(None);
        }

        let mut frame = SILENT_FRAME;
        let mut filled = 0;
        while filled < FRAME_SIZE {
            match self.reader.read(&mut frame[filled..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(None);
                }
                Ok(n) => {
                    filled += n;
                    self.bytes += n as u64;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(D8Error::Read(err)),
            }
        }

        self.frames += 1;
        Ok(Some(frame))
    }

    pub fn frames_read(&self) -> u64 {
        self.frames
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }
}

/// Buffered frame writer with frame and byte accounting.
pub struct SampleSink<W: Write> {
    writer: BufWriter<W>,
    frames: u64,
    bytes: u64,
}

impl<W: Write> SampleSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(CHUNK_SIZE, inner),
            frames: 0,
            bytes: 0,
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_frames(frame)
    }

    /// Writes frame-aligned raw bytes, e.g. a marker pattern.
    pub fn write_frames(&mut self, data: &[u8]) -> Result<()> {
        debug_assert_eq!(data.len() % FRAME_SIZE, 0);
        self.writer.write_all(data).map_err(D8Error::Write)?;
        self.frames += (data.len() / FRAME_SIZE) as u64;
        self.bytes += data.len() as u64;
        Ok(())
    }

    pub fn write_silence(&mut self, frames: u64) -> Result<()> {
        const ZEROS: [u8; CHUNK_SIZE] = [0; CHUNK_SIZE];
        const CHUNK_FRAMES: u64 = (CHUNK_SIZE / FRAME_SIZE) as u64;

        let mut remaining = frames;
        while remaining > 0 {
            let n = remaining.min(CHUNK_FRAMES);
            self.write_frames(&ZEROS[..n as usize * FRAME_SIZE])?;
            remaining -= n;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(D8Error::Write)
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|err| D8Error::Write(err.into_error()))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Hands out at most `step` bytes per read and interrupts every other call.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn reads_whole_frames_and_drops_partial_tail() {
        let mut source = SampleSource::new(Cursor::new(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));

        assert_eq!(source.read_frame().unwrap(), Some([1, 2, 3, 4]));
        assert_eq!(source.read_frame().unwrap(), Some([5, 6, 7, 8]));
        assert_eq!(source.read_frame().unwrap(), None);
        assert_eq!(source.frames_read(), 2);
        assert_eq!(source.bytes_read(), 10);
    }

    #[test]
    fn retries_interrupted_and_short_reads() {
        let mut source = SampleSource::new(Trickle {
            data: (0..12).collect(),
            pos: 0,
            step: 3,
            interrupt: false,
        });

        let mut frames = Vec::new();
        while let Some(frame) = source.read_frame().unwrap() {
            frames.push(frame);
        }
        assert_eq!(frames, vec![[0, 1, 2, 3], [4, 5, 6, 7], [8, 9, 10, 11]]);
    }

    #[test]
    fn sink_counts_frames_and_silence() {
        let mut sink = SampleSink::new(Vec::new());
        sink.write_frame(&[1, 2, 3, 4]).unwrap();
        sink.write_silence(2000).unwrap();
        sink.write_frames(&[9; 8]).unwrap();

        assert_eq!(sink.frames_written(), 2003);
        assert_eq!(sink.bytes_written(), 2003 * FRAME_SIZE as u64);

        let out = sink.into_inner().unwrap();
        assert_eq!(out.len(), 2003 * FRAME_SIZE);
        assert_eq!(&out[..4], &[1, 2, 3, 4]);
        assert!(out[4..4 + 2000 * FRAME_SIZE].iter().all(|b| *b == 0));
        assert_eq!(&out[out.len() - 8..], &[9; 8]);
    }
}
