//! Change forms: the per-form delta records that make up the bulk of a
//! save body.
//!
//! Only the frame is decoded here. The payload stays opaque; when
//! `length2` is non-zero the payload is itself compressed and `length2` is
//! its uncompressed size.

use std::io::{Read, Write};

use tracing::trace;

use crate::error::{Error, Result};
use crate::ioutils::{ReadSaveExt, WriteSaveExt};
use crate::refid::RefId;

/// The top two bits of the type byte select the width of both length
/// fields: 0 = u8, 1 = u16, 2 = u32, 3 = invalid.
const LENGTH_WIDTH_SHIFT: u8 = 6;

/// Mask for the record kind in the low six bits of the type byte.
const KIND_MASK: u8 = 0x3f;

/// A single change form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeForm {
    pub form_id: RefId,
    pub flags: u32,
    /// Raw type byte: record kind in the low six bits, length width
    /// selector in the top two.
    pub type_byte: u8,
    pub version: u8,
    /// Uncompressed payload size when the payload is compressed, zero
    /// otherwise.
    pub length2: u32,
    /// Opaque payload (`length1` bytes on the wire).
    pub data: Vec<u8>,
}

impl ChangeForm {
    pub(crate) fn parse<R: Read>(r: &mut R) -> Result<Self> {
        let form_id = r.get_ref_id()?;
        let flags = r.get_u32()?;
        let type_byte = r.get_u8()?;
        let version = r.get_u8()?;

        let (length1, length2) = match type_byte >> LENGTH_WIDTH_SHIFT {
            0 => (u32::from(r.get_u8()?), u32::from(r.get_u8()?)),
            1 => (u32::from(r.get_u16()?), u32::from(r.get_u16()?)),
            2 => (r.get_u32()?, r.get_u32()?),
            _ => return Err(Error::InvalidLengthWidth),
        };

        trace!(
            "change form: formid={:#08x} flags={flags:#x} type={} version={version} \
             length1={length1} length2={length2}",
            form_id.raw(),
            type_byte & KIND_MASK,
        );

        let data = r.get_bytes(length1 as usize)?;

        Ok(Self {
            form_id,
            flags,
            type_byte,
            version,
            length2,
            data,
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.put_ref_id(self.form_id)?;
        w.put_u32(self.flags)?;
        w.put_u8(self.type_byte)?;
        w.put_u8(self.version)?;

        let length1 = self.data.len() as u32;
        match self.type_byte >> LENGTH_WIDTH_SHIFT {
            0 => {
                w.put_u8(fit_u8(length1)?)?;
                w.put_u8(fit_u8(self.length2)?)?;
            }
            1 => {
                w.put_u16(fit_u16(length1)?)?;
                w.put_u16(fit_u16(self.length2)?)?;
            }
            2 => {
                w.put_u32(length1)?;
                w.put_u32(self.length2)?;
            }
            _ => return Err(Error::InvalidLengthWidth),
        }

        Ok(w.write_all(&self.data)?)
    }

    /// The record kind from the low six bits, if it is one the engine
    /// defines.
    pub fn kind(&self) -> Option<ChangeFormKind> {
        ChangeFormKind::from_raw(self.type_byte & KIND_MASK)
    }
}

fn fit_u8(value: u32) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::OversizedChangeForm(value))
}

fn fit_u16(value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| Error::OversizedChangeForm(value))
}

/// Record kinds a change form can describe. The names mirror the engine's
/// four-letter record tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFormKind {
    Refr,
    Achr,
    Pmis,
    Pgre,
    Pbea,
    Pfla,
    Cell,
    Info,
    Qust,
    Npc,
    Acti,
    Tact,
    Armo,
    Book,
    Cont,
    Door,
    Ingr,
    Ligh,
    Misc,
    Appa,
    Stat,
    Mstt,
    Furn,
    Weap,
    Ammo,
    Keym,
    Alch,
    Idlm,
    Note,
    Eczn,
    Clas,
    Fact,
    Pack,
    Navm,
    Woop,
    Mgef,
    Smqn,
    Scen,
    Lctn,
    Rela,
    Phzd,
    Pbar,
    Pcon,
    Flst,
    Lvln,
    Lvli,
    Lvsp,
    Parw,
    Ench,
}

impl ChangeFormKind {
    /// Decode the low six bits of a change-form type byte.
    pub fn from_raw(raw: u8) -> Option<Self> {
        use ChangeFormKind::*;

        const KINDS: [ChangeFormKind; 49] = [
            Refr, Achr, Pmis, Pgre, Pbea, Pfla, Cell, Info, Qust, Npc, Acti, Tact, Armo, Book,
            Cont, Door, Ingr, Ligh, Misc, Appa, Stat, Mstt, Furn, Weap, Ammo, Keym, Alch, Idlm,
            Note, Eczn, Clas, Fact, Pack, Navm, Woop, Mgef, Smqn, Scen, Lctn, Rela, Phzd, Pbar,
            Pcon, Flst, Lvln, Lvli, Lvsp, Parw, Ench,
        ];

        KINDS.get(usize::from(raw)).copied()
    }
}
