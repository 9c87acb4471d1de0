use crate::LoadResult;

/// How the decompressor should treat the end of the input it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// More input may follow in later calls.
    Continue,
    /// No more input will follow; flush everything and finish the stream.
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// The output window is full. Drain it and call again with the remaining input.
    Progress,
    /// All input was consumed and the output window still has room.
    NeedMoreInput,
    /// The end of the compressed stream was reached. Output written by this call must still be
    /// drained.
    StreamEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecompressResult {
    pub consumed: usize,
    pub wrote: usize,
    pub status: DecompressStatus,
}

pub trait Decompressor {
    /// Decompresses from `src` into `dst`, returning how much of each was used.
    ///
    /// Errors are fatal: the decompressor must not be called again after one is returned.
    fn decompress(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        action: Action,
    ) -> LoadResult<DecompressResult>;
    fn name(&self) -> &'static str;
}

/// Classifies a call that did not reach the end of the stream.
pub(crate) fn classify(src_len: usize, dst_len: usize, consumed: usize, wrote: usize) -> DecompressStatus {
    if wrote == dst_len {
        DecompressStatus::Progress
    } else if consumed == src_len {
        DecompressStatus::NeedMoreInput
    } else {
        // Neither side is exhausted. liblzma does not normally return in this case, but the
        // caller can simply call again.
        DecompressStatus::Progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_output_is_progress() {
        assert_eq!(classify(10, 4, 3, 4), DecompressStatus::Progress);
        // a full window wins even if input happens to be exhausted too
        assert_eq!(classify(10, 4, 10, 4), DecompressStatus::Progress);
    }

    #[test]
    fn exhausted_input_needs_more() {
        assert_eq!(classify(10, 4, 10, 2), DecompressStatus::NeedMoreInput);
        assert_eq!(classify(0, 4, 0, 0), DecompressStatus::NeedMoreInput);
    }
}
