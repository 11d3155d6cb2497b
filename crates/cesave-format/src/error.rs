//! Error types for save-file decoding and encoding.

use thiserror::Error;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error classes for callers that do not care which structural rule
/// a file broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stream ended before a value could be fully read.
    UnexpectedEof,
    /// A value failed a structural constraint of the format.
    Malformed,
    /// The signature or file version is not one this codec handles.
    Unsupported,
    /// An allocation demanded by the file could not be satisfied.
    OutOfMemory,
    /// A read, write or seek failed at the OS boundary.
    Io,
}

/// Save codec error types.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stream exhausted while a value was still being read
    #[error("save file ended too soon")]
    UnexpectedEof,

    /// Allocation failure
    #[error("cannot allocate {0} bytes")]
    OutOfMemory(usize),

    /// The file does not start with a known game signature
    #[error("file signature does not match any known game")]
    UnknownSignature,

    /// File version above anything this codec knows
    #[error("unsupported save file version {0}")]
    UnsupportedVersion(u32),

    /// Compression tag outside none/zlib/lz4
    #[error("invalid compression method tag {0}")]
    InvalidCompressor(u16),

    /// A variable-size value with width bits `11`
    #[error("variable-size value claims a four-byte encoding")]
    InvalidVsval,

    /// A change form whose length width selector is `11`
    #[error("change form length width bits are invalid")]
    InvalidLengthWidth,

    /// A change form length that cannot be stored at its selected width
    #[error("change form length {0} does not fit its length width")]
    OversizedChangeForm(u32),

    /// More plugins than the count field can express
    #[error("{0} plugins do not fit the plugin count field")]
    TooManyPlugins(usize),

    /// The same global data type twice in one file
    #[error("global data type {0} occurs more than once")]
    DuplicateGlobal(u32),

    /// A global data type outside the enumerated table ranges
    #[error("unexpected global data type {0}")]
    UnknownGlobalType(u32),

    /// A global data entry whose body does not span its declared length
    #[error("global data type {type_tag}: declared {declared} bytes, spans {actual}")]
    GlobalLengthMismatch {
        /// Numeric type tag of the entry.
        type_tag: u32,
        /// Length recorded in the entry header.
        declared: u64,
        /// Bytes the body actually consumed or produced.
        actual: u64,
    },

    /// A body block that does not begin where the offsets table says
    #[error("{block} begins at {actual:#010x} but the offset table says {expected:#010x}")]
    OffsetMismatch {
        /// Name of the block being located.
        block: &'static str,
        /// Offset recorded in the table.
        expected: u64,
        /// Position the parser actually reached.
        actual: u64,
    },

    /// A pixel buffer that does not match the snapshot dimensions
    #[error("snapshot pixel buffer of {actual} bytes does not match {expected}")]
    SnapshotSize {
        /// width * height * bytes per pixel.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// A length-prefixed string with invalid UTF-8 content
    #[error("string is not valid UTF-8")]
    InvalidString,

    /// Compressor failure while encoding
    #[error("compression failed: {0}")]
    Compression(String),

    /// Decompressor rejected the body
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Decompression finished with the wrong output size
    #[error("decompression produced {actual} bytes, expected {expected}")]
    DecompressedSize {
        /// Size the length prefix promised.
        expected: usize,
        /// Size the decompressor produced.
        actual: usize,
    },
}

impl Error {
    /// Fold the specific variants into the five broad classes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::UnexpectedEof => ErrorKind::UnexpectedEof,
            Self::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Self::UnknownSignature | Self::UnsupportedVersion(_) => ErrorKind::Unsupported,
            _ => ErrorKind::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(Error::UnexpectedEof.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(Error::UnknownSignature.kind(), ErrorKind::Unsupported);
        assert_eq!(Error::UnsupportedVersion(16).kind(), ErrorKind::Unsupported);
        assert_eq!(Error::InvalidCompressor(7).kind(), ErrorKind::Malformed);
        assert_eq!(Error::InvalidVsval.kind(), ErrorKind::Malformed);
        assert_eq!(Error::OutOfMemory(1).kind(), ErrorKind::OutOfMemory);
        assert_eq!(
            Error::Io(std::io::Error::other("boom")).kind(),
            ErrorKind::Io
        );
    }
}
