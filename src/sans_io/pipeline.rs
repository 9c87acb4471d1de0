use log::*;

use super::decompressor::{Action, DecompressStatus, Decompressor};
use super::scratch_buf::ScratchBuf;
use super::xz::XzDecoder;
use super::LoaderOptions;
use crate::{segments::SegmentedBuf, LoadError, LoadResult};

/// What the pipeline needs next after a call to [`Pipeline::feed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// All input was consumed. Feed more, or feed with [`Action::Finish`] if there is none.
    NeedMoreInput,
    /// The compressed stream ended and all of its output has been accumulated.
    StreamEnd,
}

/// Owns the decompressor, its scratch window and the accumulated output.
///
/// Dropping the pipeline releases all three, whatever state it is in.
pub struct Pipeline {
    decompressor: Box<dyn Decompressor>,
    scratch: ScratchBuf,
    output: SegmentedBuf,
    decoded_size_limit: Option<u64>,
}

fn get_decompressor(options: &LoaderOptions) -> LoadResult<Box<dyn Decompressor>> {
    Ok(Box::new(XzDecoder::new(options)?))
}

impl Pipeline {
    pub fn new(options: &LoaderOptions, buffer_size: usize) -> LoadResult<Self> {
        Self::with_decompressor(get_decompressor(options)?, options, buffer_size)
    }

    /// Builds a pipeline around an already constructed decompressor.
    pub fn with_decompressor(
        decompressor: Box<dyn Decompressor>,
        options: &LoaderOptions,
        buffer_size: usize,
    ) -> LoadResult<Self> {
        Ok(Pipeline {
            decompressor,
            scratch: ScratchBuf::new(buffer_size)?,
            output: SegmentedBuf::new(),
            decoded_size_limit: options.decoded_size_limit,
        })
    }

    /// Number of decompressed bytes accumulated so far, not counting the scratch window.
    pub fn accumulated_len(&self) -> u64 {
        self.output.len()
    }

    /// Decompresses all of `input`, moving output into the accumulator every time the scratch
    /// window fills.
    ///
    /// With [`Action::Continue`] an empty `input` does nothing. With [`Action::Finish`] the
    /// stream must end within `input`, otherwise it is reported as truncated.
    pub fn feed(&mut self, input: &[u8], action: Action) -> LoadResult<FeedOutcome> {
        if input.is_empty() && action == Action::Continue {
            return Ok(FeedOutcome::NeedMoreInput);
        }
        let mut pos = 0;
        loop {
            let res = self.decompressor.decompress(
                &input[pos..],
                self.scratch.window_mut(),
                action,
            )?;
            pos += res.consumed;
            self.scratch.mark_written(res.wrote);
            match res.status {
                DecompressStatus::Progress => {
                    if self.scratch.is_full() {
                        self.drain()?;
                    } else if res.consumed == 0 && res.wrote == 0 {
                        return Err(LoadError::Decode(format!(
                            "{} decompressor made no progress",
                            self.decompressor.name()
                        )));
                    }
                }
                DecompressStatus::NeedMoreInput => {
                    if action == Action::Finish {
                        return Err(LoadError::Decode(
                            "compressed data ended before the end of the stream".to_owned(),
                        ));
                    }
                    return Ok(FeedOutcome::NeedMoreInput);
                }
                DecompressStatus::StreamEnd => {
                    self.drain()?;
                    if pos < input.len() {
                        warn!(
                            "ignoring {} bytes after the end of the {} stream",
                            input.len() - pos,
                            self.decompressor.name()
                        );
                    }
                    debug!(
                        "{} stream ended, {} bytes in {} segments",
                        self.decompressor.name(),
                        self.output.len(),
                        self.output.segment_count()
                    );
                    return Ok(FeedOutcome::StreamEnd);
                }
            }
        }
    }

    fn drain(&mut self) -> LoadResult<()> {
        let Some(segment) = self.scratch.drain()? else {
            return Ok(());
        };
        trace!("drained {} byte segment", segment.len());
        if let Some(limit) = self.decoded_size_limit {
            if self.output.len() + segment.len() as u64 > limit {
                return Err(LoadError::DecodedSizeLimit { limit });
            }
        }
        self.output.append(segment);
        Ok(())
    }

    /// Releases the decompressor and scratch window, keeping only the accumulated output.
    pub fn into_output(self) -> SegmentedBuf {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sans_io::decompressor::DecompressResult;
    use std::io::{Read, Write};

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn collect(pipeline: Pipeline) -> Vec<u8> {
        let mut out = Vec::new();
        pipeline.into_output().finalize().read_to_end(&mut out).unwrap();
        out
    }

    fn sample_data() -> Vec<u8> {
        (0..10_000u32).flat_map(|n| (n % 251).to_le_bytes()).collect()
    }

    #[test]
    fn small_window_produces_full_segments() -> LoadResult<()> {
        let data = sample_data();
        let compressed = compress(&data);
        let mut pipeline = Pipeline::new(&LoaderOptions::default(), 1000)?;
        assert_eq!(
            pipeline.feed(&compressed, Action::Continue)?,
            FeedOutcome::NeedMoreInput
        );
        assert_eq!(pipeline.feed(&[], Action::Finish)?, FeedOutcome::StreamEnd);
        assert_eq!(pipeline.output.segment_count(), 40);
        assert_eq!(pipeline.accumulated_len(), data.len() as u64);
        assert_eq!(collect(pipeline), data);
        Ok(())
    }

    #[test]
    fn empty_continue_is_a_no_op() -> LoadResult<()> {
        let mut pipeline = Pipeline::new(&LoaderOptions::default(), 64)?;
        assert_eq!(
            pipeline.feed(&[], Action::Continue)?,
            FeedOutcome::NeedMoreInput
        );
        assert_eq!(pipeline.accumulated_len(), 0);
        Ok(())
    }

    #[test]
    fn finish_on_truncated_input_fails() -> LoadResult<()> {
        let compressed = compress(b"not all of this arrives");
        let mut pipeline = Pipeline::new(&LoaderOptions::default(), 64)?;
        pipeline.feed(&compressed[..compressed.len() / 2], Action::Continue)?;
        let err = pipeline.feed(&[], Action::Finish).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)), "{err}");
        Ok(())
    }

    #[test]
    fn enforces_decoded_size_limit() -> LoadResult<()> {
        let compressed = compress(&[0u8; 4096]);
        let options = LoaderOptions::default().with_decoded_size_limit(1024);
        let mut pipeline = Pipeline::new(&options, 512)?;
        let err = pipeline.feed(&compressed, Action::Finish).unwrap_err();
        assert!(matches!(err, LoadError::DecodedSizeLimit { limit: 1024 }));
        Ok(())
    }

    // Emits a fixed number of bytes per call, then reports the end of the stream.
    struct Counting {
        remaining: usize,
    }

    impl Decompressor for Counting {
        fn decompress(
            &mut self,
            src: &[u8],
            dst: &mut [u8],
            _action: Action,
        ) -> LoadResult<DecompressResult> {
            let wrote = dst.len().min(self.remaining).min(3);
            dst[..wrote].fill(b'x');
            self.remaining -= wrote;
            let status = if self.remaining == 0 {
                DecompressStatus::StreamEnd
            } else {
                DecompressStatus::Progress
            };
            Ok(DecompressResult {
                consumed: src.len(),
                wrote,
                status,
            })
        }
        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn drains_only_when_window_is_full() -> LoadResult<()> {
        let mut pipeline = Pipeline::with_decompressor(
            Box::new(Counting { remaining: 20 }),
            &LoaderOptions::default(),
            8,
        )?;
        assert_eq!(pipeline.feed(b"in", Action::Continue)?, FeedOutcome::StreamEnd);
        // 8 + 8 + the 4 left over when the stream ended
        assert_eq!(pipeline.output.segment_count(), 3);
        let reader = pipeline.into_output().finalize();
        assert_eq!(reader.len(), 20);
        Ok(())
    }

    struct Stalled;

    impl Decompressor for Stalled {
        fn decompress(
            &mut self,
            _src: &[u8],
            _dst: &mut [u8],
            _action: Action,
        ) -> LoadResult<DecompressResult> {
            Ok(DecompressResult {
                consumed: 0,
                wrote: 0,
                status: DecompressStatus::Progress,
            })
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[test]
    fn stalled_decompressor_is_an_error() -> LoadResult<()> {
        let mut pipeline =
            Pipeline::with_decompressor(Box::new(Stalled), &LoaderOptions::default(), 8)?;
        let err = pipeline.feed(b"input", Action::Continue).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
        Ok(())
    }
}
