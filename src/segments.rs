//! Append-only storage for decompressed data, read back as one stream.
use std::io::{self, BufRead, Read, Seek, SeekFrom};

/// An ordered list of owned byte segments.
///
/// Decompressed data arrives a window at a time. Keeping each window as its own allocation
/// means growing never copies what is already stored, and [`SegmentedBuf::finalize`] hands the
/// segments over as they are.
#[derive(Debug, Default)]
pub struct SegmentedBuf {
    segments: Vec<Box<[u8]>>,
    len: u64,
}

impl SegmentedBuf {
    pub fn new() -> Self {
        Default::default()
    }

    /// Takes ownership of `segment` and adds it to the end. Empty segments are dropped.
    pub fn append(&mut self, segment: Box<[u8]>) {
        if segment.is_empty() {
            return;
        }
        self.len += segment.len() as u64;
        self.segments.push(segment);
    }

    /// Total number of bytes held.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Closes the buffer for appending and returns a reader over all segments in append order.
    pub fn finalize(self) -> SegmentReader {
        let mut starts = Vec::with_capacity(self.segments.len());
        let mut offset = 0u64;
        for segment in &self.segments {
            starts.push(offset);
            offset += segment.len() as u64;
        }
        SegmentReader {
            segments: self.segments,
            starts,
            len: self.len,
            index: 0,
            offset: 0,
            end_pos: self.len,
        }
    }
}

/// Reads the segments of a finalized [`SegmentedBuf`] as one contiguous stream.
///
/// The reader owns the segments; they are freed when it is dropped. Reads are forward and
/// sequential, but [`Seek`] is also supported since many image decoders sniff the format before
/// decoding.
#[derive(Debug)]
pub struct SegmentReader {
    segments: Vec<Box<[u8]>>,
    // absolute offset of the first byte of each segment.
    starts: Vec<u64>,
    len: u64,
    // current segment and offset within it. `index == segments.len()` at the end.
    index: usize,
    offset: usize,
    // position reported once `index` is past the last segment; beyond `len` after a seek there.
    end_pos: u64,
}

impl SegmentReader {
    /// Total length of the stream.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> u64 {
        match self.starts.get(self.index) {
            Some(start) => start + self.offset as u64,
            None => self.end_pos,
        }
    }

    fn set_position(&mut self, pos: u64) {
        if pos >= self.len {
            self.index = self.segments.len();
            self.offset = 0;
            self.end_pos = pos;
            return;
        }
        self.end_pos = self.len;
        // the last segment starting at or before `pos`.
        let index = match self.starts.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        self.index = index;
        self.offset = (pos - self.starts[index]) as usize;
    }
}

impl Read for SegmentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let available = self.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let n = available.len().min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&available[..n]);
            written += n;
            self.consume(n);
        }
        Ok(written)
    }
}

impl BufRead for SegmentReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self.segments.get(self.index) {
            Some(segment) => Ok(&segment[self.offset..]),
            None => Ok(&[]),
        }
    }

    fn consume(&mut self, amt: usize) {
        let Some(segment) = self.segments.get(self.index) else {
            return;
        };
        assert!(
            amt <= segment.len() - self.offset,
            "attempted to consume past end of segment"
        );
        self.offset += amt;
        if self.offset == segment.len() {
            self.index += 1;
            self.offset = 0;
        }
    }
}

impl Seek for SegmentReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.len.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position().checked_add_signed(delta),
        };
        let Some(target) = target else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            ));
        };
        self.set_position(target);
        // seeking past the end is allowed, reads there return nothing.
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}
