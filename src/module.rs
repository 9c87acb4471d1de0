//! The interface a host image library uses to drive a loader.
use std::io::Read;

use crate::{
    decoder::{ImageDecoder, LoadObserver},
    format::{FormatInfo, XZ_FORMAT},
    read,
    sans_io::{IncrementalLoader, LoaderOptions},
    LoadResult,
};

/// An image loader as seen by its host: one-shot loading, plus begin / increment / stop for
/// data that arrives in pieces.
pub trait ImageModule {
    type Image;
    /// State of one incremental load.
    type Context;

    fn info(&self) -> FormatInfo;

    fn load(&self, source: &mut dyn Read) -> LoadResult<Self::Image>;

    fn begin_load(
        &self,
        observer: Box<dyn LoadObserver<Self::Image>>,
    ) -> LoadResult<Self::Context>;

    fn load_increment(&self, context: &mut Self::Context, buf: &[u8]) -> LoadResult<()>;

    /// Ends an incremental load. The image itself is delivered to the observer.
    fn stop_load(&self, context: Self::Context) -> LoadResult<()>;
}

/// The xz loader module.
#[derive(Debug, Clone, Default)]
pub struct XzModule<D> {
    decoder: D,
    options: LoaderOptions,
}

impl<D> XzModule<D> {
    pub fn new(decoder: D) -> Self {
        Self::with_options(decoder, LoaderOptions::default())
    }

    pub fn with_options(decoder: D, options: LoaderOptions) -> Self {
        Self { decoder, options }
    }
}

impl<D> ImageModule for XzModule<D>
where
    D: ImageDecoder + Clone,
{
    type Image = D::Image;
    type Context = IncrementalLoader<Box<dyn LoadObserver<D::Image>>, D>;

    fn info(&self) -> FormatInfo {
        XZ_FORMAT
    }

    fn load(&self, source: &mut dyn Read) -> LoadResult<D::Image> {
        read::load(source, &self.decoder, &self.options)
    }

    fn begin_load(
        &self,
        observer: Box<dyn LoadObserver<D::Image>>,
    ) -> LoadResult<Self::Context> {
        IncrementalLoader::begin(observer, self.decoder.clone(), self.options.clone())
    }

    fn load_increment(&self, context: &mut Self::Context, buf: &[u8]) -> LoadResult<()> {
        context.push_chunk(buf)
    }

    fn stop_load(&self, mut context: Self::Context) -> LoadResult<()> {
        context.finish().map(|_| ())
    }
}
