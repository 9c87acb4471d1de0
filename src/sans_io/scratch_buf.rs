use crate::{LoadError, LoadResult};

/// A fixed-size window that the decompressor writes into.
///
/// The same allocation is reused for the whole load: whenever the window fills (or the stream
/// ends) [`ScratchBuf::drain`] copies the written bytes out into an exactly-sized segment and
/// rewinds the cursor.
pub struct ScratchBuf {
    data: Box<[u8]>,
    written: usize,
}

impl ScratchBuf {
    pub fn new(capacity: usize) -> LoadResult<Self> {
        if capacity == 0 {
            return Err(LoadError::Init(
                "scratch buffer size must be non-zero".to_owned(),
            ));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| LoadError::Allocation {
                requested_bytes: capacity,
            })?;
        data.resize(capacity, 0);
        Ok(Self {
            data: data.into_boxed_slice(),
            written: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    // number of bytes written since the window was last attached.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn is_full(&self) -> bool {
        self.written == self.data.len()
    }

    /// Rewinds the cursor, exposing the whole capacity again.
    pub fn attach_fresh_window(&mut self) {
        self.written = 0;
    }

    /// The unwritten part of the window.
    pub fn window_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.written..]
    }

    pub fn mark_written(&mut self, written: usize) {
        assert!(
            written <= self.data.len() - self.written,
            "attempted to write past end of scratch buffer"
        );
        self.written += written;
    }

    /// Copies the written bytes into a new segment of exactly that size and rewinds the cursor.
    /// Returns `None` without allocating if nothing was written.
    pub fn drain(&mut self) -> LoadResult<Option<Box<[u8]>>> {
        if self.written == 0 {
            return Ok(None);
        }
        let mut segment = Vec::new();
        segment
            .try_reserve_exact(self.written)
            .map_err(|_| LoadError::Allocation {
                requested_bytes: self.written,
            })?;
        segment.extend_from_slice(&self.data[..self.written]);
        self.attach_fresh_window();
        Ok(Some(segment.into_boxed_slice()))
    }
}
