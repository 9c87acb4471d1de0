//! The seam between decompression and image decoding.
use crate::{segments::SegmentReader, LoadResult};

/// An image produced by an [`ImageDecoder`].
pub trait DecodedImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Turns the fully decompressed bytes into an image.
///
/// The reader is handed over by value: once `decode` returns, successfully or not, the
/// decompressed data has been released.
pub trait ImageDecoder {
    type Image: DecodedImage;

    /// Errors should be reported as [`crate::LoadError::ImageDecode`].
    fn decode(&self, stream: SegmentReader) -> LoadResult<Self::Image>;
}

/// Receives progress from an [`crate::IncrementalLoader`]. All methods do nothing by default.
///
/// The observer is the caller's context for the load: it is owned by the loader and
/// can be taken back with [`crate::IncrementalLoader::into_observer`].
pub trait LoadObserver<I> {
    /// The size of the image is known.
    ///
    /// Not called by this crate: the size is only known once the whole image is decoded, at
    /// which point [`LoadObserver::prepared`] is called instead.
    fn size_known(&mut self, _width: u32, _height: u32) {}

    /// The image exists. Called once.
    fn prepared(&mut self, _image: &I) {}

    /// A region of the image has been updated and should be redrawn. Called once, covering the
    /// whole image.
    fn updated(&mut self, _image: &I, _x: u32, _y: u32, _width: u32, _height: u32) {}
}

impl<I> LoadObserver<I> for () {}

impl<I, T: LoadObserver<I> + ?Sized> LoadObserver<I> for Box<T> {
    fn size_known(&mut self, width: u32, height: u32) {
        (**self).size_known(width, height)
    }
    fn prepared(&mut self, image: &I) {
        (**self).prepared(image)
    }
    fn updated(&mut self, image: &I, x: u32, y: u32, width: u32, height: u32) {
        (**self).updated(image, x, y, width, height)
    }
}

#[cfg(feature = "image")]
mod standard {
    use super::{DecodedImage, ImageDecoder};
    use crate::{segments::SegmentReader, LoadError, LoadResult};
    use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Limits};
    use log::*;

    impl DecodedImage for DynamicImage {
        fn width(&self) -> u32 {
            GenericImageView::width(self)
        }
        fn height(&self) -> u32 {
            GenericImageView::height(self)
        }
    }

    /// Decodes the decompressed bytes with the `image` crate.
    ///
    /// Unless a format is set, it is guessed from the content.
    #[derive(Debug, Clone, Default)]
    pub struct StandardImageDecoder {
        format: Option<ImageFormat>,
        limits: Option<Limits>,
    }

    impl StandardImageDecoder {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn with_format(mut self, format: ImageFormat) -> Self {
            self.format = Some(format);
            self
        }

        pub fn with_limits(mut self, limits: Limits) -> Self {
            self.limits = Some(limits);
            self
        }
    }

    impl ImageDecoder for StandardImageDecoder {
        type Image = DynamicImage;

        fn decode(&self, stream: SegmentReader) -> LoadResult<DynamicImage> {
            let len = stream.len();
            let mut reader = match self.format {
                Some(format) => ImageReader::with_format(stream, format),
                None => ImageReader::new(stream)
                    .with_guessed_format()
                    .map_err(|err| LoadError::ImageDecode(err.to_string()))?,
            };
            if let Some(limits) = &self.limits {
                reader.limits(limits.clone());
            }
            debug!("decoding {len} bytes as {:?}", reader.format());
            reader
                .decode()
                .map_err(|err| LoadError::ImageDecode(err.to_string()))
        }
    }
}

#[cfg(feature = "image")]
pub use standard::StandardImageDecoder;

#[cfg(all(test, feature = "image"))]
mod tests {
    use super::*;
    use crate::{segments::SegmentedBuf, LoadError};
    use image::{DynamicImage, ImageFormat, Limits, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn split_reader(data: &[u8], segment_len: usize) -> SegmentReader {
        let mut buf = SegmentedBuf::new();
        for chunk in data.chunks(segment_len) {
            buf.append(chunk.to_vec().into_boxed_slice());
        }
        buf.finalize()
    }

    #[test]
    fn decodes_png_spread_over_segments() {
        let png = png_bytes(5, 3);
        let image = StandardImageDecoder::new()
            .decode(split_reader(&png, 7))
            .unwrap();
        assert_eq!(DecodedImage::width(&image), 5);
        assert_eq!(DecodedImage::height(&image), 3);
    }

    #[test]
    fn rejects_unknown_data() {
        let err = StandardImageDecoder::new()
            .decode(split_reader(b"abc", 2))
            .unwrap_err();
        assert!(matches!(err, LoadError::ImageDecode(_)), "{err}");
    }

    #[test]
    fn forced_format_must_match() {
        let png = png_bytes(2, 2);
        let err = StandardImageDecoder::new()
            .with_format(ImageFormat::Gif)
            .decode(split_reader(&png, 64))
            .unwrap_err();
        assert!(matches!(err, LoadError::ImageDecode(_)));
    }

    #[test]
    fn limits_are_applied() {
        let png = png_bytes(64, 64);
        let mut limits = Limits::default();
        limits.max_image_width = Some(16);
        let err = StandardImageDecoder::new()
            .with_limits(limits)
            .decode(split_reader(&png, 100))
            .unwrap_err();
        assert!(matches!(err, LoadError::ImageDecode(_)));
    }

    #[test]
    fn boxed_observer_forwards() {
        struct Counter(u32);
        impl LoadObserver<u8> for Counter {
            fn prepared(&mut self, _image: &u8) {
                self.0 += 1;
            }
        }
        let mut boxed: Box<Counter> = Box::new(Counter(0));
        boxed.prepared(&0u8);
        LoadObserver::<u8>::updated(&mut boxed, &0u8, 0, 0, 1, 1);
        assert_eq!(boxed.0, 1);
    }
}
