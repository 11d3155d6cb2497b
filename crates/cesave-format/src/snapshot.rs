//! The screenshot stored between the header and the save body.

use crate::error::{Error, Result};

/// Pixel layout of the embedded screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Three bytes per pixel.
    Rgb,
    /// Four bytes per pixel.
    Rgba,
}

impl PixelFormat {
    /// Layout used by a given file version.
    pub fn for_file_version(file_version: u32) -> Self {
        if file_version >= 11 { Self::Rgba } else { Self::Rgb }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// The screenshot shown in the load menu, stored as raw pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl Snapshot {
    /// Wrap an existing pixel buffer. The buffer length must equal
    /// `width * height * bytes_per_pixel`.
    pub fn new(format: PixelFormat, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = byte_len(format, width, height)?;
        if pixels.len() != expected {
            return Err(Error::SnapshotSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    /// A zeroed snapshot of the given dimensions.
    pub fn allocate(format: PixelFormat, width: u32, height: u32) -> Result<Self> {
        let len = byte_len(format, width, height)?;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory(len))?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

/// `width * height * bytes_per_pixel`, guarded against overflow.
pub(crate) fn byte_len(format: PixelFormat, width: u32, height: u32) -> Result<usize> {
    let len = u64::from(width) * u64::from(height) * format.bytes_per_pixel() as u64;
    usize::try_from(len).map_err(|_| Error::OutOfMemory(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_file_version() {
        assert_eq!(PixelFormat::for_file_version(9), PixelFormat::Rgb);
        assert_eq!(PixelFormat::for_file_version(11), PixelFormat::Rgba);
        assert_eq!(PixelFormat::for_file_version(12), PixelFormat::Rgba);
    }

    #[test]
    fn buffer_length_is_enforced() {
        assert!(Snapshot::new(PixelFormat::Rgb, 2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            Snapshot::new(PixelFormat::Rgba, 2, 2, vec![0; 12]),
            Err(Error::SnapshotSize {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn allocate_zeroes() {
        let shot = Snapshot::allocate(PixelFormat::Rgba, 4, 2).unwrap();
        assert_eq!(shot.pixels().len(), 32);
        assert!(shot.pixels().iter().all(|&b| b == 0));
    }
}
