//! The save-file document model and the top-level codec.
//!
//! Layout: signature, framed header, snapshot pixels, then the body. For
//! Skyrim Special Edition the body is stored behind an
//! uncompressed-length/compressed-length pair and is usually LZ4
//! compressed; everywhere else it follows the snapshot directly. The body
//! itself is: form version, (Fallout 4) game version, framed plugin list,
//! offsets table, global data tables 1 and 2, change forms, global data
//! table 3, form ID array, world-space array and a trailing opaque table.
//!
//! Three quirks of the engine's own writer are reproduced so a decoded
//! file re-encodes byte-identically; see the constants below.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::ops::RangeBounds;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use memmap2::Mmap;
use tracing::debug;

use crate::block::Block;
use crate::change_form::ChangeForm;
use crate::compression::{self, CompressionMethod};
use crate::error::{Error, Result};
use crate::globals::{
    self, GlobalData, GlobalVariable, MagicFavourites, MiscStat, PlayerLocation, Weather,
    global_type,
};
use crate::ioutils::{ReadSaveExt, Reader, WriteSaveExt};
use crate::snapshot::{self, PixelFormat, Snapshot};

/// Game that produced a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    /// Skyrim, Legendary or Special Edition.
    Skyrim,
    /// Fallout 4.
    Fallout4,
}

const SKYRIM_SIGNATURE: &[u8] = b"TESV_SAVEGAME";
const FALLOUT4_SIGNATURE: &[u8] = b"FO4_SAVEGAME";

/// Highest file version this codec understands.
const MAX_FILE_VERSION: u32 = 15;

/// Skyrim records one fewer globals-3 entry than it writes. Wrapping
/// arithmetic keeps an empty table round-trippable.
const GLOBALS3_COUNT_BIAS: u32 = 1;

/// Skyrim SE measures body offsets from just before the
/// uncompressed/compressed length pair, leaving every stored offset 8
/// bytes short of the true position in the decompressed stream.
const SE_OFFSET_BIAS: u64 = 8;

/// Skyrim SE and Fallout 4 record the plugin block length 2 bytes larger
/// than its content.
const PLUGIN_BLOCK_LENGTH_BIAS: i64 = 2;

/// Zero padding after the offsets table content.
const OFFSET_TABLE_PADDING: usize = 60;

/// Bytes inspected when peeking at a header without parsing the body.
const HEADER_PEEK_LEN: u64 = 1024;

/// Shortest buffer worth matching a signature against.
const MIN_SIGNATURE_REGION: usize = 32;

fn supports_compression(game: Game, file_version: u32) -> bool {
    game == Game::Skyrim && file_version >= 12
}

/// Skyrim Special Edition, the variant with the offset bias.
fn is_special_edition(game: Game, file_version: u32) -> bool {
    game == Game::Skyrim && file_version == 12
}

fn has_plugin_length_bias(game: Game, file_version: u32) -> bool {
    game == Game::Fallout4 || (game == Game::Skyrim && file_version >= 12)
}

fn has_light_plugins(game: Game, file_version: u32, form_version: u8) -> bool {
    match game {
        Game::Fallout4 => true,
        Game::Skyrim => file_version >= 12 && form_version >= 78,
    }
}

/// The fixed-layout fields at the front of every save, available without
/// decoding the body.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub game: Game,
    pub file_version: u32,
    pub save_number: u32,
    pub player_name: String,
    pub level: u32,
    pub player_location_name: String,
    /// Playtime or in-game date.
    pub game_time: String,
    pub race_id: String,
    pub sex: u16,
    pub current_xp: f32,
    pub target_xp: f32,
    /// Windows FILETIME: 100 ns ticks since 1601-01-01 UTC.
    pub filetime: u64,
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    /// Only carried on the wire when the variant supports body
    /// compression; `None` otherwise.
    pub compressor: CompressionMethod,
}

impl Header {
    fn parse(r: &mut Reader<'_>, game: Game) -> Result<Self> {
        let _block_len = r.get_u32()?;

        let file_version = r.get_u32()?;
        debug!("file version {file_version}");
        if file_version > MAX_FILE_VERSION {
            return Err(Error::UnsupportedVersion(file_version));
        }

        let mut header = Self {
            game,
            file_version,
            save_number: r.get_u32()?,
            player_name: r.get_bstr()?,
            level: r.get_u32()?,
            player_location_name: r.get_bstr()?,
            game_time: r.get_bstr()?,
            race_id: r.get_bstr()?,
            sex: r.get_u16()?,
            current_xp: r.get_f32()?,
            target_xp: r.get_f32()?,
            filetime: r.get_u64()?,
            snapshot_width: r.get_u32()?,
            snapshot_height: r.get_u32()?,
            compressor: CompressionMethod::None,
        };

        if supports_compression(game, file_version) {
            header.compressor = CompressionMethod::from_tag(r.get_u16()?)?;
            debug!("body compression: {:?}", header.compressor);
        }

        Ok(header)
    }
}

/// Offsets table: six file offsets and four table counts, padded with
/// zeros. Holds true values in memory; the two Skyrim biases are applied
/// at the wire boundary.
#[derive(Debug, Default, Clone, Copy)]
struct OffsetTable {
    off_form_ids_count: u32,
    off_unknown_table: u32,
    off_globals1: u32,
    off_globals2: u32,
    off_change_forms: u32,
    off_globals3: u32,
    num_globals1: u32,
    num_globals2: u32,
    num_globals3: u32,
    num_change_forms: u32,
}

impl OffsetTable {
    fn parse(r: &mut Reader<'_>, game: Game, file_version: u32) -> Result<Self> {
        let mut table = Self {
            off_form_ids_count: r.get_u32()?,
            off_unknown_table: r.get_u32()?,
            off_globals1: r.get_u32()?,
            off_globals2: r.get_u32()?,
            off_change_forms: r.get_u32()?,
            off_globals3: r.get_u32()?,
            num_globals1: r.get_u32()?,
            num_globals2: r.get_u32()?,
            num_globals3: r.get_u32()?,
            num_change_forms: r.get_u32()?,
        };
        r.skip(OFFSET_TABLE_PADDING)?;

        if game == Game::Skyrim {
            // The engine under-reports the globals-3 count by one.
            table.num_globals3 = table.num_globals3.wrapping_add(GLOBALS3_COUNT_BIAS);
        }

        if is_special_edition(game, file_version) {
            // Stored offsets are 8 short of the true positions.
            for off in [
                &mut table.off_form_ids_count,
                &mut table.off_unknown_table,
                &mut table.off_globals1,
                &mut table.off_globals2,
                &mut table.off_change_forms,
                &mut table.off_globals3,
            ] {
                *off = off.wrapping_add(SE_OFFSET_BIAS as u32);
            }
        }

        debug!("{:#010x}: globals 1 ({})", table.off_globals1, table.num_globals1);
        debug!("{:#010x}: globals 2 ({})", table.off_globals2, table.num_globals2);
        debug!(
            "{:#010x}: change forms ({})",
            table.off_change_forms, table.num_change_forms
        );
        debug!("{:#010x}: globals 3 ({})", table.off_globals3, table.num_globals3);
        debug!("{:#010x}: form IDs", table.off_form_ids_count);
        debug!("{:#010x}: trailing table", table.off_unknown_table);

        Ok(table)
    }

    fn write<W: Write>(&self, w: &mut W, game: Game) -> Result<()> {
        w.put_u32(self.off_form_ids_count)?;
        w.put_u32(self.off_unknown_table)?;
        w.put_u32(self.off_globals1)?;
        w.put_u32(self.off_globals2)?;
        w.put_u32(self.off_change_forms)?;
        w.put_u32(self.off_globals3)?;
        w.put_u32(self.num_globals1)?;
        w.put_u32(self.num_globals2)?;
        if game == Game::Skyrim {
            w.put_u32(self.num_globals3.wrapping_sub(GLOBALS3_COUNT_BIAS))?;
        } else {
            w.put_u32(self.num_globals3)?;
        }
        w.put_u32(self.num_change_forms)?;
        Ok(w.write_all(&[0; OFFSET_TABLE_PADDING])?)
    }
}

/// A fully decoded save file.
///
/// The struct owns every allocation it refers to; dropping it releases
/// everything. A document produced by [`Savefile::parse`] re-encodes to
/// the same bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Savefile {
    pub game: Game,
    /// Format revision: Skyrim LE 7-9, Skyrim SE 12, Fallout 4 11/15.
    pub file_version: u32,
    pub form_version: u8,
    /// How the body is stored when the variant supports compression.
    pub compressor: CompressionMethod,
    pub save_number: u32,
    pub player_name: String,
    pub level: u32,
    pub player_location_name: String,
    /// Playtime or in-game date.
    pub game_time: String,
    pub race_id: String,
    pub sex: u16,
    pub current_xp: f32,
    pub target_xp: f32,
    /// Windows FILETIME: 100 ns ticks since 1601-01-01 UTC.
    pub filetime: u64,
    pub snapshot: Snapshot,
    /// Patch version of the game that wrote the save, e.g. "1.10.162.0".
    /// Fallout 4 only; Skyrim does not use this.
    pub game_version: Option<String>,
    pub plugins: Vec<String>,
    /// Light plugins; Fallout 4, and Skyrim SE from form version 78.
    pub light_plugins: Vec<String>,
    /// Global data keyed by type tag. Iteration order is ascending, which
    /// is also the order entries occupy on the wire.
    pub globals: BTreeMap<u32, GlobalData>,
    pub change_forms: Vec<ChangeForm>,
    pub form_ids: Vec<u32>,
    pub world_spaces: Vec<u32>,
    /// Opaque length-prefixed table at the end of the body.
    pub trailing: Vec<u8>,
}

/// Seconds between the FILETIME epoch (1601) and the Unix epoch.
const FILETIME_UNIX_DELTA: u64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

impl Savefile {
    /// Read and decode the file at `path`.
    ///
    /// Regular files are memory-mapped; anything else (a pipe, for
    /// instance) is buffered into memory first. Both paths produce the
    /// same document.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("reading save file {}", path.display());

        let file = File::open(path)?;
        if file.metadata()?.is_file() {
            // Safety: the mapping is read-only and never outlives `file`;
            // mutating the file mid-read is outside the codec's contract.
            #[allow(unsafe_code)]
            let mmap = unsafe { Mmap::map(&file)? };
            Self::parse(&mmap)
        } else {
            let mut file = file;
            Self::read_from(&mut file)
        }
    }

    /// Decode a save from a non-seekable stream by buffering it whole.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::parse(&buf)
    }

    /// Decode a save from an in-memory image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data, 0);

        let game = parse_signature(&mut r)?;
        let header = Header::parse(&mut r, game)?;

        let format = PixelFormat::for_file_version(header.file_version);
        let pixel_len =
            snapshot::byte_len(format, header.snapshot_width, header.snapshot_height)?;
        debug!("{:#010x}: {pixel_len} bytes of snapshot data", r.offset());
        let pixels = r.get_bytes(pixel_len)?;
        let snapshot = Snapshot::new(format, header.snapshot_width, header.snapshot_height, pixels)?;

        let mut save = Self {
            game,
            file_version: header.file_version,
            form_version: 0,
            compressor: header.compressor,
            save_number: header.save_number,
            player_name: header.player_name,
            level: header.level,
            player_location_name: header.player_location_name,
            game_time: header.game_time,
            race_id: header.race_id,
            sex: header.sex,
            current_xp: header.current_xp,
            target_xp: header.target_xp,
            filetime: header.filetime,
            snapshot,
            game_version: None,
            plugins: Vec::new(),
            light_plugins: Vec::new(),
            globals: BTreeMap::new(),
            change_forms: Vec::new(),
            form_ids: Vec::new(),
            world_spaces: Vec::new(),
            trailing: Vec::new(),
        };

        if supports_compression(game, save.file_version) {
            let uncompressed_len = r.get_u32()? as usize;
            let compressed_len = r.get_u32()? as usize;
            debug!(
                "{:#010x}: body, {uncompressed_len} bytes uncompressed, {compressed_len} stored",
                r.offset()
            );

            // The body parser's offsets continue from here, past the two
            // length words the engine's own offsets do not account for.
            let body_base = r.offset();
            let compressed = r.take_slice(compressed_len)?;
            let body = compression::decompress(compressed, save.compressor, uncompressed_len)?;

            let mut body_r = Reader::new(&body, body_base);
            save.parse_body(&mut body_r)?;
        } else {
            save.parse_body(&mut r)?;
        }

        Ok(save)
    }

    fn parse_body(&mut self, r: &mut Reader<'_>) -> Result<()> {
        debug!("{:#010x}: save body begins", r.offset());

        self.form_version = r.get_u8()?;
        debug!("form version {}", self.form_version);

        if self.game == Game::Fallout4 {
            self.game_version = Some(r.get_bstr()?);
        }

        // Plugin block length; over-reported by 2 on the biased variants
        // and not needed to parse the block, so only logged.
        let plugin_block_len = r.get_u32()?;
        debug!("{:#010x}: plugin block, recorded length {plugin_block_len}", r.offset());

        let num_plugins = r.get_u8()?;
        for _ in 0..num_plugins {
            self.plugins.push(r.get_bstr()?);
        }

        if has_light_plugins(self.game, self.file_version, self.form_version) {
            let num_light = r.get_u16()?;
            debug!("{:#010x}: {num_light} light plugins", r.offset());
            for _ in 0..num_light {
                self.light_plugins.push(r.get_bstr()?);
            }
        }

        let table = OffsetTable::parse(r, self.game, self.file_version)?;

        check_offset(r, "globals 1", table.off_globals1)?;
        for _ in 0..table.num_globals1 {
            self.insert_global(r)?;
        }

        check_offset(r, "globals 2", table.off_globals2)?;
        for _ in 0..table.num_globals2 {
            self.insert_global(r)?;
        }

        check_offset(r, "change forms", table.off_change_forms)?;
        let num_change_forms = table.num_change_forms as usize;
        self.change_forms
            .try_reserve_exact(num_change_forms)
            .map_err(|_| Error::OutOfMemory(num_change_forms))?;
        for _ in 0..num_change_forms {
            self.change_forms.push(ChangeForm::parse(r)?);
        }

        check_offset(r, "globals 3", table.off_globals3)?;
        for _ in 0..table.num_globals3 {
            self.insert_global(r)?;
        }

        check_offset(r, "form IDs", table.off_form_ids_count)?;
        self.form_ids = parse_u32_array(r)?;
        self.world_spaces = parse_u32_array(r)?;

        check_offset(r, "trailing table", table.off_unknown_table)?;
        let trailing_len = r.get_u32()? as usize;
        self.trailing = r.get_bytes(trailing_len)?;

        Ok(())
    }

    fn insert_global(&mut self, r: &mut Reader<'_>) -> Result<()> {
        let (type_tag, data) = globals::parse_global(r, self.game)?;
        if self.globals.insert(type_tag, data).is_some() {
            return Err(Error::DuplicateGlobal(type_tag));
        }
        Ok(())
    }

    /// Encode the document to its on-disk byte image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut w = Cursor::new(Vec::new());

        match self.game {
            Game::Skyrim => w.write_all(SKYRIM_SIGNATURE)?,
            Game::Fallout4 => w.write_all(FALLOUT4_SIGNATURE)?,
        }

        let header = Block::begin(&mut w)?;
        self.write_header_fields(&mut w)?;
        header.end(&mut w)?;

        debug_assert_eq!(
            self.snapshot.format(),
            PixelFormat::for_file_version(self.file_version)
        );
        w.write_all(self.snapshot.pixels())?;

        if supports_compression(self.game, self.file_version) {
            let after_snapshot = w.stream_position()?;

            // Base the body serialiser where the decoder's offsets will
            // land, minus the SE bias so the stored table comes out 8 low.
            let base = if is_special_edition(self.game, self.file_version) {
                after_snapshot
            } else {
                after_snapshot + SE_OFFSET_BIAS
            };

            let mut body = Cursor::new(Vec::new());
            self.write_body(&mut body, base)?;
            let body = body.into_inner();

            let compressed = compression::compress(&body, self.compressor)?;
            debug!(
                "body compressed: {} bytes -> {} bytes",
                body.len(),
                compressed.len()
            );

            w.put_u32(body.len() as u32)?;
            w.put_u32(compressed.len() as u32)?;
            w.write_all(&compressed)?;
        } else {
            self.write_body(&mut w, 0)?;
        }

        Ok(w.into_inner())
    }

    /// Encode and write to `path`, creating or truncating it. On failure
    /// the file contents are unspecified and removal is the caller's
    /// business.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_bytes()?;
        debug!(
            "writing {} bytes to {}",
            bytes.len(),
            path.as_ref().display()
        );
        Ok(std::fs::write(path, bytes)?)
    }

    fn write_header_fields<W: Write>(&self, w: &mut W) -> Result<()> {
        w.put_u32(self.file_version)?;
        w.put_u32(self.save_number)?;
        w.put_bstr(&self.player_name)?;
        w.put_u32(self.level)?;
        w.put_bstr(&self.player_location_name)?;
        w.put_bstr(&self.game_time)?;
        w.put_bstr(&self.race_id)?;
        w.put_u16(self.sex)?;
        w.put_f32(self.current_xp)?;
        w.put_f32(self.target_xp)?;
        w.put_u64(self.filetime)?;
        w.put_u32(self.snapshot.width())?;
        w.put_u32(self.snapshot.height())?;
        if supports_compression(self.game, self.file_version) {
            w.put_u16(self.compressor.tag())?;
        }
        Ok(())
    }

    /// Serialise the body. `base` is added to every stream position that
    /// lands in the offsets table; passing the position the decoder will
    /// see (or 8 less on SE) reproduces the engine's offsets exactly.
    fn write_body<W: Write + Seek>(&self, w: &mut W, base: u64) -> Result<()> {
        w.put_u8(self.form_version)?;

        if self.game == Game::Fallout4 {
            w.put_bstr(self.game_version.as_deref().unwrap_or(""))?;
        }

        self.write_plugins(w)?;

        let table_pos = w.stream_position()?;
        let mut table = OffsetTable {
            num_change_forms: self.change_forms.len() as u32,
            ..OffsetTable::default()
        };
        table.write(w, self.game)?;

        table.off_globals1 = (base + w.stream_position()?) as u32;
        table.num_globals1 = self.write_globals_range(w, ..100)?;

        table.off_globals2 = (base + w.stream_position()?) as u32;
        table.num_globals2 = self.write_globals_range(w, 100..1000)?;

        table.off_change_forms = (base + w.stream_position()?) as u32;
        for change_form in &self.change_forms {
            change_form.write(w)?;
        }

        table.off_globals3 = (base + w.stream_position()?) as u32;
        table.num_globals3 = self.write_globals_range(w, 1000..)?;

        table.off_form_ids_count = (base + w.stream_position()?) as u32;
        write_u32_array(w, &self.form_ids)?;
        write_u32_array(w, &self.world_spaces)?;

        table.off_unknown_table = (base + w.stream_position()?) as u32;
        w.put_u32(self.trailing.len() as u32)?;
        w.write_all(&self.trailing)?;

        // Fill the placeholder in with the real offsets.
        let end = w.stream_position()?;
        w.seek(SeekFrom::Start(table_pos))?;
        table.write(w, self.game)?;
        w.seek(SeekFrom::Start(end))?;

        Ok(())
    }

    fn write_plugins<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        // The framed block covers the plugin count and strings only;
        // light plugins follow it unframed.
        let block = Block::begin(w)?;

        let count = u8::try_from(self.plugins.len())
            .map_err(|_| Error::TooManyPlugins(self.plugins.len()))?;
        w.put_u8(count)?;
        for plugin in &self.plugins {
            w.put_bstr(plugin)?;
        }

        if has_plugin_length_bias(self.game, self.file_version) {
            // The engine records the block 2 bytes longer than its
            // content; the next write still continues from the true end.
            w.seek(SeekFrom::Current(PLUGIN_BLOCK_LENGTH_BIAS))?;
            block.end(w)?;
            w.seek(SeekFrom::Current(-PLUGIN_BLOCK_LENGTH_BIAS))?;
        } else {
            block.end(w)?;
        }

        if has_light_plugins(self.game, self.file_version, self.form_version) {
            let count = u16::try_from(self.light_plugins.len())
                .map_err(|_| Error::TooManyPlugins(self.light_plugins.len()))?;
            w.put_u16(count)?;
            for plugin in &self.light_plugins {
                w.put_bstr(plugin)?;
            }
        }

        Ok(())
    }

    fn write_globals_range<W, R>(&self, w: &mut W, range: R) -> Result<u32>
    where
        W: Write + Seek,
        R: RangeBounds<u32>,
    {
        let mut count = 0;
        for (&type_tag, data) in self.globals.range(range) {
            globals::write_global(w, type_tag, data, self.game)?;
            count += 1;
        }
        Ok(count)
    }

    /// The save time, clamped to the Unix epoch for degenerate filetimes.
    pub fn time_saved(&self) -> SystemTime {
        let unix_ticks = self
            .filetime
            .saturating_sub(FILETIME_UNIX_DELTA * FILETIME_TICKS_PER_SECOND);
        let secs = unix_ticks / FILETIME_TICKS_PER_SECOND;
        let nanos = (unix_ticks % FILETIME_TICKS_PER_SECOND) * 100;
        UNIX_EPOCH + Duration::new(secs, nanos as u32)
    }

    /// Store `time` as the save time, truncated to FILETIME resolution.
    pub fn set_time_saved(&mut self, time: SystemTime) {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        let ticks = since_epoch.as_secs() * FILETIME_TICKS_PER_SECOND
            + u64::from(since_epoch.subsec_nanos()) / 100;
        self.filetime = FILETIME_UNIX_DELTA * FILETIME_TICKS_PER_SECOND + ticks;
    }

    /// Miscellaneous statistics, when the save carries them.
    pub fn misc_stats(&self) -> Option<&[MiscStat]> {
        match self.globals.get(&global_type::MISC_STATS) {
            Some(GlobalData::MiscStats(stats)) => Some(stats),
            _ => None,
        }
    }

    /// Player location, when the save carries it.
    pub fn player_location(&self) -> Option<&PlayerLocation> {
        match self.globals.get(&global_type::PLAYER_LOCATION) {
            Some(GlobalData::PlayerLocation(loc)) => Some(loc),
            _ => None,
        }
    }

    /// Scripted global variables, when the save carries them.
    pub fn global_variables(&self) -> Option<&[GlobalVariable]> {
        match self.globals.get(&global_type::GLOBAL_VARIABLES) {
            Some(GlobalData::GlobalVariables(vars)) => Some(vars),
            _ => None,
        }
    }

    /// Weather state, when the save carries it.
    pub fn weather(&self) -> Option<&Weather> {
        match self.globals.get(&global_type::WEATHER) {
            Some(GlobalData::Weather(weather)) => Some(weather),
            _ => None,
        }
    }

    /// Magic favourites and hotkeys, when the save carries them.
    pub fn magic_favourites(&self) -> Option<&MagicFavourites> {
        match self.globals.get(&global_type::MAGIC_FAVOURITES) {
            Some(GlobalData::MagicFavourites(favs)) => Some(favs),
            _ => None,
        }
    }
}

/// Decode only the header of the file at `path`.
pub fn read_header(path: impl AsRef<Path>) -> Result<Header> {
    let mut buf = Vec::new();
    File::open(path)?
        .take(HEADER_PEEK_LEN)
        .read_to_end(&mut buf)?;

    let mut r = Reader::new(&buf, 0);
    let game = parse_signature(&mut r)?;
    Header::parse(&mut r, game)
}

fn parse_signature(r: &mut Reader<'_>) -> Result<Game> {
    if r.remaining() < MIN_SIGNATURE_REGION {
        return Err(Error::UnexpectedEof);
    }

    if r.take_prefix(SKYRIM_SIGNATURE) {
        debug!("Skyrim signature");
        Ok(Game::Skyrim)
    } else if r.take_prefix(FALLOUT4_SIGNATURE) {
        debug!("Fallout 4 signature");
        Ok(Game::Fallout4)
    } else {
        Err(Error::UnknownSignature)
    }
}

fn check_offset(r: &Reader<'_>, block: &'static str, expected: u32) -> Result<()> {
    let actual = r.offset();
    if actual != u64::from(expected) {
        return Err(Error::OffsetMismatch {
            block,
            expected: u64::from(expected),
            actual,
        });
    }
    debug!("{actual:#010x}: parsing {block}");
    Ok(())
}

fn parse_u32_array(r: &mut Reader<'_>) -> Result<Vec<u32>> {
    let len = r.get_u32()? as usize;
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| Error::OutOfMemory(len))?;
    for _ in 0..len {
        values.push(r.get_u32()?);
    }
    Ok(values)
}

fn write_u32_array<W: Write>(w: &mut W, values: &[u32]) -> Result<()> {
    w.put_u32(values.len() as u32)?;
    for &value in values {
        w.put_u32(value)?;
    }
    Ok(())
}
