use crate::{
    sans_io::{
        decompressor::{classify, Action, DecompressResult, DecompressStatus, Decompressor},
        LoaderOptions,
    },
    LoadError, LoadResult,
};
use xz2::stream::{self, Status, Stream};

/// Decodes XZ streams (and optionally legacy `.lzma` streams) with liblzma.
///
/// Concatenated streams are decoded as one: the end of the data is only reported once the
/// decoder is told to [`Action::Finish`]. The liblzma handle is released when this is dropped.
pub struct XzDecoder {
    s: Stream,
}

impl XzDecoder {
    pub fn new(options: &LoaderOptions) -> LoadResult<Self> {
        let s = if options.accept_lzma_alone {
            Stream::new_auto_decoder(options.memory_limit, stream::CONCATENATED)
        } else {
            Stream::new_stream_decoder(options.memory_limit, stream::CONCATENATED)
        }
        .map_err(|err| LoadError::Init(err.to_string()))?;
        Ok(XzDecoder { s })
    }
}

fn handle_error(err: stream::Error) -> LoadError {
    let message = match err {
        stream::Error::Data => "compressed data is corrupt".to_owned(),
        stream::Error::Format => "input is not in the xz format".to_owned(),
        stream::Error::MemLimit => "memory limit reached while decompressing".to_owned(),
        other => other.to_string(),
    };
    LoadError::Decode(message)
}

impl Decompressor for XzDecoder {
    fn decompress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        action: Action,
    ) -> LoadResult<DecompressResult> {
        let before_in = self.s.total_in();
        let before_out = self.s.total_out();
        let lz_action = match action {
            Action::Continue => stream::Action::Run,
            Action::Finish => stream::Action::Finish,
        };
        let res = self.s.process(src, dst, lz_action).map_err(handle_error)?;
        let consumed = (self.s.total_in() - before_in) as usize;
        let wrote = (self.s.total_out() - before_out) as usize;
        let status = match res {
            Status::StreamEnd => DecompressStatus::StreamEnd,
            Status::Ok | Status::GetCheck => classify(src.len(), dst.len(), consumed, wrote),
            // xz2 reports LZMA_BUF_ERROR as MemNeeded: two calls in a row made no progress.
            Status::MemNeeded => {
                return Err(LoadError::Decode(
                    "compressed data ended before the end of the stream".to_owned(),
                ))
            }
        };
        Ok(DecompressResult {
            consumed,
            wrote,
            status,
        })
    }

    fn name(&self) -> &'static str {
        "xz"
    }
}
