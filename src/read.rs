//! Load an xz-compressed image from a [`Read`] source in one call
use std::io::{self, Read};

use log::*;

use crate::{
    decoder::ImageDecoder,
    sans_io::{
        decompressor::Action, FeedOutcome, LoaderOptions, Pipeline, DEFAULT_ONE_SHOT_BUFFER_SIZE,
    },
    LoadError, LoadResult,
};

/// Reads from `r` into `buf` until `buf` is completely full or EOF is reached.
/// Returns the number of bytes read and whether EOF was seen.
fn read_chunk<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<(usize, bool)> {
    let mut pos: usize = 0;
    while pos < buf.len() {
        match r.read(&mut buf[pos..]) {
            Ok(0) => return Ok((pos, true)),
            Ok(n) => pos += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok((pos, false))
}

/// Reads all of `source`, decompresses it and decodes the image.
///
/// `source` is read a chunk of [`LoaderOptions::buffer_size`] bytes at a time
/// ([`DEFAULT_ONE_SHOT_BUFFER_SIZE`] if unset). The last chunk, which may be empty, is fed to the
/// decompressor as the end of the input. Read errors are reported as
/// [`LoadError::SourceRead`].
pub fn load<R, D>(mut source: R, decoder: &D, options: &LoaderOptions) -> LoadResult<D::Image>
where
    R: Read,
    D: ImageDecoder,
{
    let buffer_size = options.buffer_size_or(DEFAULT_ONE_SHOT_BUFFER_SIZE);
    let mut pipeline = Pipeline::new(options, buffer_size)?;
    let mut chunk = Vec::new();
    chunk
        .try_reserve_exact(buffer_size)
        .map_err(|_| LoadError::Allocation {
            requested_bytes: buffer_size,
        })?;
    chunk.resize(buffer_size, 0);

    let mut compressed_len: u64 = 0;
    loop {
        let (n, at_eof) = read_chunk(&mut source, &mut chunk)?;
        compressed_len += n as u64;
        let action = if at_eof {
            Action::Finish
        } else {
            Action::Continue
        };
        match pipeline.feed(&chunk[..n], action)? {
            FeedOutcome::NeedMoreInput => {}
            FeedOutcome::StreamEnd => break,
        }
    }
    drop(chunk);

    let output = pipeline.into_output();
    debug!(
        "decompressed {compressed_len} bytes into {}, decoding image",
        output.len()
    );
    decoder.decode(output.finalize())
}
