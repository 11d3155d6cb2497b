//! Scalar primitives of the save format.
//!
//! Every multi-byte integer and float is little-endian; reference IDs are
//! the lone big-endian quantity. On top of the fixed-width scalars the
//! format uses two composites: a length-prefixed string (16-bit byte count,
//! no terminator) and the 1-to-3-byte variable-size value described on
//! [`ReadSaveExt::get_vsval`].

use std::io::{self, Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::warn;

use crate::error::{Error, Result};
use crate::refid::RefId;

/// Largest value a variable-size value can carry.
pub const VSVAL_MAX: u32 = (1 << 22) - 1;

/// Map stream exhaustion apart from real I/O failures.
fn classify(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof
    } else {
        Error::Io(e)
    }
}

pub(crate) trait ReadSaveExt: Read {
    fn get_u8(&mut self) -> Result<u8> {
        self.read_u8().map_err(classify)
    }

    fn get_u16(&mut self) -> Result<u16> {
        self.read_u16::<LittleEndian>().map_err(classify)
    }

    fn get_u32(&mut self) -> Result<u32> {
        self.read_u32::<LittleEndian>().map_err(classify)
    }

    fn get_u64(&mut self) -> Result<u64> {
        self.read_u64::<LittleEndian>().map_err(classify)
    }

    fn get_i32(&mut self) -> Result<i32> {
        self.read_i32::<LittleEndian>().map_err(classify)
    }

    fn get_f32(&mut self) -> Result<f32> {
        self.read_f32::<LittleEndian>().map_err(classify)
    }

    fn get_ref_id(&mut self) -> Result<RefId> {
        Ok(RefId::from_raw(
            self.read_u24::<BigEndian>().map_err(classify)?,
        ))
    }

    /// Read a variable-size value.
    ///
    /// The low two bits of the first byte hold the byte count minus one;
    /// the remaining bits, assembled little-endian and shifted right by
    /// two, are the value. A byte count of four is malformed.
    fn get_vsval(&mut self) -> Result<u32> {
        let first = self.get_u8()?;
        let extra = first & 0x3;
        if extra == 3 {
            return Err(Error::InvalidVsval);
        }

        let mut value = u32::from(first);
        for i in 1..=u32::from(extra) {
            value |= u32::from(self.get_u8()?) << (i * 8);
        }

        Ok(value >> 2)
    }

    /// Read a 16-bit-length-prefixed string.
    fn get_bstr(&mut self) -> Result<String> {
        let len = usize::from(self.get_u16()?);
        let bytes = self.get_bytes(len)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidString)
    }

    /// Read exactly `len` bytes into a fresh buffer.
    fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| Error::OutOfMemory(len))?;
        bytes.resize(len, 0);
        self.read_exact(&mut bytes).map_err(classify)?;
        Ok(bytes)
    }
}

impl<R: Read> ReadSaveExt for R {}

pub(crate) trait WriteSaveExt: Write {
    fn put_u8(&mut self, value: u8) -> Result<()> {
        Ok(self.write_u8(value)?)
    }

    fn put_u16(&mut self, value: u16) -> Result<()> {
        Ok(self.write_u16::<LittleEndian>(value)?)
    }

    fn put_u32(&mut self, value: u32) -> Result<()> {
        Ok(self.write_u32::<LittleEndian>(value)?)
    }

    fn put_u64(&mut self, value: u64) -> Result<()> {
        Ok(self.write_u64::<LittleEndian>(value)?)
    }

    fn put_i32(&mut self, value: i32) -> Result<()> {
        Ok(self.write_i32::<LittleEndian>(value)?)
    }

    fn put_f32(&mut self, value: f32) -> Result<()> {
        Ok(self.write_f32::<LittleEndian>(value)?)
    }

    fn put_ref_id(&mut self, id: RefId) -> Result<()> {
        Ok(self.write_u24::<BigEndian>(id.raw())?)
    }

    /// Write a variable-size value in as few bytes as it needs.
    ///
    /// Values above [`VSVAL_MAX`] wrap modulo `VSVAL_MAX + 1`.
    fn put_vsval(&mut self, value: u32) -> Result<()> {
        if value > VSVAL_MAX {
            warn!(
                "variable-size value {value} wraps to {}",
                value % (VSVAL_MAX + 1)
            );
        }

        let mut enc = (value << 2) & 0x00ff_ffff;
        let extra = u8::from(enc >= 0x100) << u8::from(enc >= 0x1_0000);
        enc |= u32::from(extra);
        for i in 0..=u32::from(extra) {
            self.put_u8((enc >> (i * 8)) as u8)?;
        }

        Ok(())
    }

    /// Write a 16-bit-length-prefixed string.
    fn put_bstr(&mut self, s: &str) -> Result<()> {
        debug_assert!(s.len() <= usize::from(u16::MAX));
        self.put_u16(s.len() as u16)?;
        Ok(self.write_all(s.as_bytes())?)
    }
}

impl<W: Write> WriteSaveExt for W {}

/// Bounds-checked reader over an in-memory save image.
///
/// `base` is the logical file offset of the buffer's first byte, so
/// [`Reader::offset`] yields positions comparable with the offsets table
/// even when the buffer holds a decompressed body.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8], base: u64) -> Self {
        Self { buf, pos: 0, base }
    }

    /// Logical file offset of the next byte.
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Bytes left in the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Advance past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        self.pos += n;
        Ok(())
    }

    /// Consume `prefix` if the buffer continues with it.
    pub fn take_prefix(&mut self, prefix: &[u8]) -> bool {
        if self.buf[self.pos..].starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Borrow the next `n` bytes without copying.
    pub fn take_slice(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::UnexpectedEof);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}

impl Read for Reader<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
