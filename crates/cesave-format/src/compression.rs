//! Body compression for Skyrim Special Edition save files.
//!
//! The body carries its own uncompressed and compressed lengths, so both
//! compressors run over bare data: LZ4 as a raw block without any prefix,
//! zlib as a standard deflate stream. Decompression must produce exactly
//! the number of bytes the file promised.

use std::io::Read;

use flate2::Compression;
use flate2::read::{ZlibDecoder, ZlibEncoder};

use crate::error::{Error, Result};

/// Compression method recorded in a Skyrim Special Edition header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Body bytes are stored verbatim.
    #[default]
    None,
    /// zlib deflate stream.
    Zlib,
    /// Raw LZ4 block data.
    Lz4,
}

impl CompressionMethod {
    /// Decode the 16-bit header tag.
    pub(crate) fn from_tag(tag: u16) -> Result<Self> {
        match tag {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::Lz4),
            other => Err(Error::InvalidCompressor(other)),
        }
    }

    /// The 16-bit header tag.
    pub(crate) fn tag(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Zlib => 1,
            Self::Lz4 => 2,
        }
    }
}

/// Compress `data` with `method`. `None` stores the bytes verbatim.
pub(crate) fn compress(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(data.to_vec()),
        CompressionMethod::Zlib => {
            let mut encoder = ZlibEncoder::new(data, Compression::default());
            let mut compressed = Vec::new();
            encoder
                .read_to_end(&mut compressed)
                .map_err(|e| Error::Compression(format!("zlib: {e}")))?;
            Ok(compressed)
        }
        CompressionMethod::Lz4 => Ok(lz4_flex::block::compress(data)),
    }
}

/// Decompress `data` into exactly `expected_len` bytes.
pub(crate) fn decompress(
    data: &[u8],
    method: CompressionMethod,
    expected_len: usize,
) -> Result<Vec<u8>> {
    let out = match method {
        CompressionMethod::None => data.to_vec(),
        CompressionMethod::Zlib => {
            let mut decoder = ZlibDecoder::new(data);
            let mut out = Vec::new();
            out.try_reserve_exact(expected_len)
                .map_err(|_| Error::OutOfMemory(expected_len))?;
            decoder
                .read_to_end(&mut out)
                .map_err(|e| Error::Decompression(format!("zlib: {e}")))?;
            out
        }
        CompressionMethod::Lz4 => lz4_flex::block::decompress(data, expected_len)
            .map_err(|e| Error::Decompression(format!("lz4: {e}")))?,
    };

    if out.len() != expected_len {
        return Err(Error::DecompressedSize {
            expected: expected_len,
            actual: out.len(),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 256) as u8).collect()
    }

    #[test]
    fn tag_round_trip() {
        for method in [
            CompressionMethod::None,
            CompressionMethod::Zlib,
            CompressionMethod::Lz4,
        ] {
            assert_eq!(CompressionMethod::from_tag(method.tag()).unwrap(), method);
        }
        assert!(matches!(
            CompressionMethod::from_tag(7),
            Err(Error::InvalidCompressor(7))
        ));
    }

    #[test]
    fn lz4_round_trip() {
        for data in [
            Vec::new(),
            vec![0x42],
            patterned(1024 * 1024),
            patterned(15 * 1024 * 1024),
        ] {
            let compressed = compress(&data, CompressionMethod::Lz4).unwrap();
            let restored = decompress(&compressed, CompressionMethod::Lz4, data.len()).unwrap();
            assert_eq!(restored, data, "lz4 round trip of {} bytes", data.len());
        }
    }

    #[test]
    fn zlib_round_trip() {
        for data in [
            Vec::new(),
            vec![0x42],
            patterned(1024 * 1024),
            patterned(15 * 1024 * 1024),
        ] {
            let compressed = compress(&data, CompressionMethod::Zlib).unwrap();
            let restored = decompress(&compressed, CompressionMethod::Zlib, data.len()).unwrap();
            assert_eq!(restored, data, "zlib round trip of {} bytes", data.len());
        }
    }

    #[test]
    fn none_is_a_pass_through() {
        let data = patterned(512);
        assert_eq!(compress(&data, CompressionMethod::None).unwrap(), data);
        assert_eq!(
            decompress(&data, CompressionMethod::None, data.len()).unwrap(),
            data
        );
    }

    #[test]
    fn malformed_lz4_is_rejected() {
        let result = decompress(&[0xff; 16], CompressionMethod::Lz4, 1024);
        assert!(matches!(result, Err(Error::Decompression(_))));
    }

    #[test]
    fn wrong_output_size_is_rejected() {
        let compressed = compress(b"twelve bytes", CompressionMethod::Lz4).unwrap();
        assert!(decompress(&compressed, CompressionMethod::Lz4, 13).is_err());

        let stored = decompress(b"abc", CompressionMethod::None, 4);
        assert!(matches!(
            stored,
            Err(Error::DecompressedSize {
                expected: 4,
                actual: 3
            })
        ));
    }
}
