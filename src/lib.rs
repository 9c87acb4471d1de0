//! A library for loading xz-compressed images.
//!
//! Images wrapped in an [XZ](https://tukaani.org/xz/xz-file-format.txt) container (for example
//! `picture.png.xz`) are decompressed with liblzma and the resulting bytes are handed to an image
//! decoder. Two entry points are provided:
//!
//! - [`load`] reads a whole source in one go and returns the decoded image.
//! - [`IncrementalLoader`] is pushed chunks of compressed data as they arrive, and decodes the
//!   image when [`IncrementalLoader::finish`] is called.
//!
//! Both share the same decompression pipeline: compressed bytes are fed to the decompressor,
//! which writes into one fixed-size scratch window. Whenever that window fills up (or the stream
//! ends) its contents are copied into an exactly-sized segment, and the segments are read back as
//! one stream by the image decoder.
//!
//! ```no_run
//! use std::fs;
//! use std::io::Read;
//!
//! use xzimage::{IncrementalLoader, LoaderOptions, StandardImageDecoder};
//!
//! // One shot...
//! fn load_file() -> xzimage::LoadResult<()> {
//!     let file = fs::File::open("picture.png.xz")?;
//!     let image = xzimage::load(file, &StandardImageDecoder::new(), &LoaderOptions::default())?;
//!     println!("{}x{}", image.width(), image.height());
//!     Ok(())
//! }
//!
//! // ...or incrementally.
//! fn load_chunks() -> xzimage::LoadResult<()> {
//!     let mut file = fs::File::open("picture.png.xz")?;
//!     let mut loader = IncrementalLoader::begin((), StandardImageDecoder::new(), LoaderOptions::default())?;
//!     let mut buf = [0u8; 4096];
//!     loop {
//!         let n = file.read(&mut buf)?;
//!         if n == 0 {
//!             break;
//!         }
//!         loader.push_chunk(&buf[..n])?;
//!     }
//!     let image = loader.finish()?;
//!     println!("{}x{}", image.width(), image.height());
//!     Ok(())
//! }
//! ```

pub mod decoder;
pub mod format;
pub mod module;
pub mod read;
pub mod sans_io;
pub mod segments;

use std::sync::Arc;

use thiserror::Error;

#[cfg(feature = "image")]
pub use crate::decoder::StandardImageDecoder;
pub use crate::decoder::{DecodedImage, ImageDecoder, LoadObserver};
pub use crate::format::{FormatInfo, FormatPattern, XZ_FORMAT};
pub use crate::module::{ImageModule, XzModule};
pub use crate::read::load;
pub use crate::sans_io::{IncrementalLoader, LoadState, LoaderOptions};
pub use crate::segments::{SegmentReader, SegmentedBuf};

/// Magic bytes at the start of every XZ stream.
pub const MAGIC: &[u8] = &[0xFD, b'7', b'z', b'X', b'Z', 0x00];

#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error("could not create decompressor: {0}")]
    Init(String),
    #[error("error decompressing xz data: {0}")]
    Decode(String),
    #[error("could not allocate {requested_bytes} bytes for decompressed data")]
    Allocation { requested_bytes: usize },
    #[error("error reading compressed data: {0}")]
    SourceRead(#[source] Arc<std::io::Error>),
    #[error("could not decode image from decompressed data: {0}")]
    ImageDecode(String),
    #[error("decompressed data is larger than the limit of {limit} bytes")]
    DecodedSizeLimit { limit: u64 },
    #[error("loader was interrupted while finishing and can no longer be used")]
    Interrupted,
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::SourceRead(Arc::new(err))
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
