//! Decompress xz data from any source of bytes
pub mod decompressor;
pub mod incremental;
pub mod pipeline;
pub mod scratch_buf;
pub mod xz;

pub use incremental::{IncrementalLoader, LoadState};
pub use pipeline::{FeedOutcome, Pipeline};

/// Default scratch window for [`IncrementalLoader`].
pub const DEFAULT_INCREMENTAL_BUFFER_SIZE: usize = 1 << 16;
/// Default scratch window and read chunk size for [`crate::load`].
pub const DEFAULT_ONE_SHOT_BUFFER_SIZE: usize = 1 << 20;

/// Options for initializing [`IncrementalLoader`] and [`crate::load`].
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Size of the scratch window decompressed data is written into, and for [`crate::load`]
    /// also of the chunks read from the source. If None, a default is picked for the kind of
    /// load: [`DEFAULT_INCREMENTAL_BUFFER_SIZE`] or [`DEFAULT_ONE_SHOT_BUFFER_SIZE`].
    pub buffer_size: Option<usize>,
    /// Memory usage limit handed to liblzma. Defaults to unlimited.
    pub memory_limit: u64,
    /// If true, legacy `.lzma` (LZMA_Alone) streams are accepted as well as xz streams.
    pub accept_lzma_alone: bool,
    /// If Some(limit), loading fails once more than `limit` bytes have been decompressed.
    pub decoded_size_limit: Option<u64>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            buffer_size: None,
            memory_limit: u64::MAX,
            accept_lzma_alone: false,
            decoded_size_limit: None,
        }
    }
}

impl LoaderOptions {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }
    pub fn with_memory_limit(mut self, memory_limit: u64) -> Self {
        self.memory_limit = memory_limit;
        self
    }
    pub fn with_accept_lzma_alone(mut self, accept_lzma_alone: bool) -> Self {
        self.accept_lzma_alone = accept_lzma_alone;
        self
    }
    pub fn with_decoded_size_limit(mut self, decoded_size_limit: u64) -> Self {
        self.decoded_size_limit = Some(decoded_size_limit);
        self
    }

    pub(crate) fn buffer_size_or(&self, default: usize) -> usize {
        self.buffer_size.unwrap_or(default)
    }
}
