#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use xzimage::{DecodedImage, ImageDecoder, LoadError, LoadObserver, LoadResult, SegmentReader};

pub fn xz(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data)?;
    encoder.finish().context("Couldn't finish xz stream")
}

pub fn lzma_alone(data: &[u8]) -> Result<Vec<u8>> {
    let options = xz2::stream::LzmaOptions::new_preset(6)?;
    let stream = xz2::stream::Stream::new_lzma_encoder(&options)?;
    let mut encoder = xz2::write::XzEncoder::new_stream(Vec::new(), stream);
    encoder.write_all(data)?;
    encoder.finish().context("Couldn't finish lzma stream")
}

/// A gradient so that the compressed data isn't trivially small.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 13) as u8, (x ^ y) as u8, 255])
    }))
}

pub fn png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    image.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Bytes that compress well but span many scratch windows.
pub fn sample_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 31) % 251) as u8 ^ (i / 997) as u8).collect()
}

/// An "image" that is just the decompressed bytes, so tests can check them before any real
/// image decoding happens.
#[derive(Debug, Clone, PartialEq)]
pub struct Raw(pub Vec<u8>);

impl DecodedImage for Raw {
    fn width(&self) -> u32 {
        self.0.len() as u32
    }
    fn height(&self) -> u32 {
        1
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl ImageDecoder for RawDecoder {
    type Image = Raw;
    fn decode(&self, mut stream: SegmentReader) -> LoadResult<Raw> {
        let mut out = Vec::new();
        stream
            .read_to_end(&mut out)
            .map_err(|err| LoadError::ImageDecode(err.to_string()))?;
        Ok(Raw(out))
    }
}

/// Records what a real decoder was given, then fails like it would on non-image data.
#[derive(Debug, Clone, Default)]
pub struct CapturingDecoder {
    pub seen: std::rc::Rc<std::cell::RefCell<Option<Vec<u8>>>>,
}

impl ImageDecoder for CapturingDecoder {
    type Image = Raw;
    fn decode(&self, mut stream: SegmentReader) -> LoadResult<Raw> {
        let mut out = Vec::new();
        stream
            .read_to_end(&mut out)
            .map_err(|err| LoadError::ImageDecode(err.to_string()))?;
        *self.seen.borrow_mut() = Some(out);
        Err(LoadError::ImageDecode("not an image".into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Size(u32, u32),
    Prepared(u32, u32),
    Updated { x: u32, y: u32, width: u32, height: u32 },
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl<I: DecodedImage> LoadObserver<I> for Recorder {
    fn size_known(&mut self, width: u32, height: u32) {
        self.events.push(Event::Size(width, height));
    }
    fn prepared(&mut self, image: &I) {
        self.events.push(Event::Prepared(image.width(), image.height()));
    }
    fn updated(&mut self, _image: &I, x: u32, y: u32, width: u32, height: u32) {
        self.events.push(Event::Updated {
            x,
            y,
            width,
            height,
        });
    }
}
