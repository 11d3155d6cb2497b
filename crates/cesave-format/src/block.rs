//! Back-patched variable-length block framing.
//!
//! Several regions of the format carry a 32-bit length prefix whose value
//! is only known once the content exists. The writer leaves a placeholder,
//! writes the content, then seeks back and patches the real length in.

use std::io::{Seek, SeekFrom, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::Result;

pub(crate) struct Block {
    start: u64,
}

impl Block {
    /// Write the placeholder and remember where the content starts.
    pub fn begin<W: Write + Seek>(w: &mut W) -> Result<Self> {
        w.write_u32::<LittleEndian>(0)?;
        Ok(Self {
            start: w.stream_position()?,
        })
    }

    /// Patch the prefix with the number of bytes written since
    /// [`Block::begin`], restore the stream position and return the length.
    pub fn end<W: Write + Seek>(self, w: &mut W) -> Result<u32> {
        let end = w.stream_position()?;
        let len = (end - self.start) as u32;
        w.seek(SeekFrom::Start(self.start - 4))?;
        w.write_u32::<LittleEndian>(len)?;
        w.seek(SeekFrom::Start(end))?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn records_content_length() {
        for content in [&b""[..], b"\0", b"abcdef", &[0u8; 300]] {
            let mut w = Cursor::new(Vec::new());
            let block = Block::begin(&mut w).unwrap();
            w.write_all(content).unwrap();
            let len = block.end(&mut w).unwrap();

            assert_eq!(len as usize, content.len());
            let buf = w.into_inner();
            assert_eq!(buf.len(), 4 + content.len());
            assert_eq!(buf[..4], (content.len() as u32).to_le_bytes());
            assert_eq!(&buf[4..], content);
        }
    }

    #[test]
    fn writing_continues_after_the_block() {
        let mut w = Cursor::new(Vec::new());
        let block = Block::begin(&mut w).unwrap();
        w.write_all(b"xy").unwrap();
        block.end(&mut w).unwrap();
        w.write_all(b"z").unwrap();

        assert_eq!(w.into_inner(), [0x02, 0x00, 0x00, 0x00, b'x', b'y', b'z']);
    }
}
