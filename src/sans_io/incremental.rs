//! Contains a push-driven loader, [`IncrementalLoader`], which is handed compressed data as it
//! arrives and decodes the image once all of it has been seen.
use std::sync::Arc;

use log::*;

use super::decompressor::Action;
use super::pipeline::{FeedOutcome, Pipeline};
use super::{LoaderOptions, DEFAULT_INCREMENTAL_BUFFER_SIZE};
use crate::{
    decoder::{DecodedImage, ImageDecoder, LoadObserver},
    segments::SegmentedBuf,
    LoadError, LoadResult,
};

/// The externally visible state of an [`IncrementalLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Accepting chunks.
    Open,
    /// The compressed stream has ended. The image may or may not have been decoded yet.
    Completed,
    /// A fatal error occurred. Every further call returns it.
    Failed,
}

enum CurrentState<I> {
    Open(Pipeline),
    // The stream ended during `push_chunk`; decoding waits for `finish`.
    Decompressed(SegmentedBuf),
    // Placeholder held only while `finish` runs.
    Finishing,
    Completed(Arc<I>),
    Failed(LoadError),
}
use CurrentState::*;

/// Decodes an xz-compressed image from chunks pushed by the caller.
///
/// This struct does not perform any I/O on its own. Each call to [`Self::push_chunk`]
/// decompresses as much as the chunk allows and returns; [`Self::finish`] flushes the
/// decompressor, decodes the image and reports it to the observer.
///
/// ```no_run
/// use std::io::Read;
///
/// use xzimage::{IncrementalLoader, LoaderOptions, LoadObserver, StandardImageDecoder};
/// use image::DynamicImage;
///
/// struct Viewer;
///
/// impl LoadObserver<DynamicImage> for Viewer {
///     fn updated(&mut self, _image: &DynamicImage, x: u32, y: u32, width: u32, height: u32) {
///         println!("redraw {x},{y} {width}x{height}");
///     }
/// }
///
/// fn read_sync(mut file: std::fs::File) -> xzimage::LoadResult<()> {
///     let mut loader =
///         IncrementalLoader::begin(Viewer, StandardImageDecoder::new(), LoaderOptions::default())?;
///     let mut buf = vec![0; 8192];
///     loop {
///         let n = file.read(&mut buf)?;
///         if n == 0 {
///             break;
///         }
///         loader.push_chunk(&buf[..n])?;
///     }
///     let image = loader.finish()?;
///     Ok(())
/// }
/// ```
pub struct IncrementalLoader<O, D: ImageDecoder> {
    state: CurrentState<D::Image>,
    observer: O,
    decoder: D,
}

impl<O, D: ImageDecoder> std::fmt::Debug for IncrementalLoader<O, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncrementalLoader").finish_non_exhaustive()
    }
}

impl<O, D> IncrementalLoader<O, D>
where
    O: LoadObserver<D::Image>,
    D: ImageDecoder,
{
    /// Starts a load. Fails if the decompressor or the scratch window cannot be created, in
    /// which case nothing is left allocated.
    pub fn begin(observer: O, decoder: D, options: LoaderOptions) -> LoadResult<Self> {
        let buffer_size = options.buffer_size_or(DEFAULT_INCREMENTAL_BUFFER_SIZE);
        let pipeline = Pipeline::new(&options, buffer_size)?;
        debug!("began incremental load with a {buffer_size} byte window");
        Ok(Self::from_pipeline(pipeline, observer, decoder))
    }

    /// Starts a load with an already-built pipeline.
    pub fn from_pipeline(pipeline: Pipeline, observer: O, decoder: D) -> Self {
        Self {
            state: Open(pipeline),
            observer,
            decoder,
        }
    }

    pub fn state(&self) -> LoadState {
        match self.state {
            Open(_) => LoadState::Open,
            Decompressed(_) | Completed(_) => LoadState::Completed,
            Finishing | Failed(_) => LoadState::Failed,
        }
    }

    /// Number of decompressed bytes held by the loader. Drops to zero once the data has been
    /// handed to the image decoder or the load has failed.
    pub fn decompressed_len(&self) -> u64 {
        match &self.state {
            Open(pipeline) => pipeline.accumulated_len(),
            Decompressed(output) => output.len(),
            _ => 0,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Decompresses one chunk of compressed data.
    ///
    /// If the chunk ends the compressed stream the loader moves to [`LoadState::Completed`]
    /// straight away; [`Self::finish`] then only decodes the image. Bytes pushed after that are
    /// ignored. On error the loader releases its buffers and moves to [`LoadState::Failed`].
    pub fn push_chunk(&mut self, buf: &[u8]) -> LoadResult<()> {
        match &mut self.state {
            Open(pipeline) => match pipeline.feed(buf, Action::Continue) {
                Ok(FeedOutcome::NeedMoreInput) => Ok(()),
                Ok(FeedOutcome::StreamEnd) => {
                    if let Open(pipeline) = std::mem::replace(&mut self.state, Finishing) {
                        self.state = Decompressed(pipeline.into_output());
                    }
                    debug!("stream ended before finish was called");
                    Ok(())
                }
                Err(err) => Err(self.fail(err)),
            },
            Decompressed(_) | Completed(_) => {
                if !buf.is_empty() {
                    warn!("ignoring {} bytes pushed after the end of the stream", buf.len());
                }
                Ok(())
            }
            Failed(err) => Err(err.clone()),
            Finishing => Err(LoadError::Interrupted),
        }
    }

    /// Flushes the decompressor, decodes the image and reports it to the observer.
    ///
    /// Calling this again after it has returned is a no-op that returns the same image or the
    /// same error.
    pub fn finish(&mut self) -> LoadResult<Arc<D::Image>> {
        let output = match std::mem::replace(&mut self.state, Finishing) {
            Open(mut pipeline) => match pipeline.feed(&[], Action::Finish) {
                Ok(_) => pipeline.into_output(),
                Err(err) => return Err(self.fail(err)),
            },
            Decompressed(output) => output,
            Completed(image) => {
                self.state = Completed(image.clone());
                return Ok(image);
            }
            Failed(err) => {
                self.state = Failed(err.clone());
                return Err(err);
            }
            Finishing => return Err(LoadError::Interrupted),
        };
        debug!("decoding image from {} decompressed bytes", output.len());
        let image = match self.decoder.decode(output.finalize()) {
            Ok(image) => Arc::new(image),
            Err(err) => return Err(self.fail(err)),
        };
        self.state = Completed(image.clone());
        let (width, height) = (image.width(), image.height());
        self.observer.prepared(&image);
        self.observer.updated(&image, 0, 0, width, height);
        debug!("load completed, {width}x{height} image");
        Ok(image)
    }

    // Moves to the failed state, dropping whatever buffers were still held.
    fn fail(&mut self, err: LoadError) -> LoadError {
        warn!("load failed: {err}");
        self.state = Failed(err.clone());
        err
    }
}
