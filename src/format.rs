//! Describes the xz image format to whatever registry routes data to this loader.
//!
//! Nothing in the loader itself sniffs data: by the time bytes reach [`crate::load`] or
//! [`crate::IncrementalLoader`] they have already been identified as xz.

/// A byte pattern identifying a format, in the style of GdkPixbuf module signatures.
///
/// Each byte of `mask` says how the byte of `prefix` at the same position is used:
///
/// - `b' '`: the data byte must equal the prefix byte
/// - `b'!'`: the data byte must differ from the prefix byte
/// - `b'z'`: the data byte must be zero
/// - `b'n'`: the data byte must be non-zero
/// - `b'*'`: any data byte matches
///
/// Without a mask every byte must match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPattern {
    pub prefix: &'static [u8],
    pub mask: Option<&'static [u8]>,
    /// How sure a match is, 0 to 100.
    pub relevance: u32,
}

impl FormatPattern {
    pub fn matches(&self, data: &[u8]) -> bool {
        if data.len() < self.prefix.len() {
            return false;
        }
        self.prefix.iter().zip(data).enumerate().all(|(i, (&want, &got))| {
            match self.mask.and_then(|mask| mask.get(i)).copied().unwrap_or(b' ') {
                b'!' => got != want,
                b'z' => got == 0,
                b'n' => got != 0,
                b'*' => true,
                _ => got == want,
            }
        })
    }
}

/// Static description of an image format handled by a loader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: &'static [FormatPattern],
    pub mime_types: &'static [&'static str],
    /// Case sensitive.
    pub extensions: &'static [&'static str],
    /// Separate loads may run on different threads at the same time.
    pub threadsafe: bool,
    pub license: &'static str,
}

impl FormatInfo {
    /// Returns the relevance of the best matching signature pattern, or 0 if none match.
    pub fn sniff(&self, header: &[u8]) -> u32 {
        self.signature
            .iter()
            .filter(|pattern| pattern.matches(header))
            .map(|pattern| pattern.relevance)
            .max()
            .unwrap_or(0)
    }

    pub fn matches_mime_type(&self, mime_type: &str) -> bool {
        self.mime_types.contains(&mime_type)
    }

    pub fn matches_extension(&self, extension: &str) -> bool {
        self.extensions.contains(&extension)
    }
}

/// The xz image format.
///
/// Legacy `.lzma` files have no magic bytes, so only the xz signature is listed even though
/// they can be loaded with [`crate::LoaderOptions::accept_lzma_alone`].
pub const XZ_FORMAT: FormatInfo = FormatInfo {
    name: "xz",
    description: "xz-compressed Image",
    signature: &[FormatPattern {
        prefix: &[0xFD, b'7', b'z', b'X', b'Z', b'x'],
        mask: Some(b"     z"),
        relevance: 100,
    }],
    mime_types: &["application/x-xz", "application/x-lzma"],
    extensions: &["xz", "XZ", "lzma", "LZMA"],
    threadsafe: true,
    license: "MIT",
};
