//! Global-data entries: the three enumerated tables in the save body.
//!
//! Every entry is a `(type, length, body)` triple. Five types are decoded
//! into structured form; everything else in the enumerated ranges is
//! carried as verbatim bytes so it survives a rewrite untouched. The
//! declared length is cross-checked against the bytes actually consumed,
//! in both directions.

use std::io::{Seek, Write};

use tracing::debug;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::ioutils::{ReadSaveExt, Reader, WriteSaveExt};
use crate::refid::RefId;
use crate::savefile::Game;

/// Numeric type tags of the global data tables.
pub mod global_type {
    pub const MISC_STATS: u32 = 0;
    pub const PLAYER_LOCATION: u32 = 1;
    pub const GAME: u32 = 2;
    pub const GLOBAL_VARIABLES: u32 = 3;
    pub const CREATED_OBJECTS: u32 = 4;
    pub const EFFECTS: u32 = 5;
    pub const WEATHER: u32 = 6;
    pub const AUDIO: u32 = 7;
    pub const SKY_CELLS: u32 = 8;
    pub const PROCESS_LISTS: u32 = 100;
    pub const COMBAT: u32 = 101;
    pub const INTERFACE: u32 = 102;
    pub const ACTOR_CAUSES: u32 = 103;
    pub const UNKNOWN_104: u32 = 104;
    pub const DETECTION_MANAGER: u32 = 105;
    pub const LOCATION_METADATA: u32 = 106;
    pub const QUEST_STATIC_DATA: u32 = 107;
    pub const STORYTELLER: u32 = 108;
    pub const MAGIC_FAVOURITES: u32 = 109;
    pub const PLAYER_CONTROLS: u32 = 110;
    pub const STORY_EVENT_MANAGER: u32 = 111;
    pub const INGREDIENT_SHARED: u32 = 112;
    pub const MENU_CONTROLS: u32 = 113;
    pub const MENU_TOPIC_MANAGER: u32 = 114;
    pub const TEMP_EFFECTS: u32 = 1000;
    pub const PAPYRUS: u32 = 1001;
    pub const ANIM_OBJECTS: u32 = 1002;
    pub const TIMER: u32 = 1003;
    pub const SYNCHRONISED_ANIMS: u32 = 1004;
    pub const MAIN: u32 = 1005;
}

/// Whether `type_tag` belongs to one of the three enumerated table ranges.
/// Types 9-11, 115-117 and 1006-1007 only occur in Fallout 4 saves.
fn is_enumerated(type_tag: u32) -> bool {
    matches!(type_tag, 0..=11 | 100..=117 | 1000..=1007)
}

/// Category tags used by miscellaneous statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscStatCategory {
    General,
    Quest,
    Combat,
    Magic,
    Crafting,
    Crime,
    Dlc,
}

impl MiscStatCategory {
    /// Decode the raw category byte.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::General),
            1 => Some(Self::Quest),
            2 => Some(Self::Combat),
            3 => Some(Self::Magic),
            4 => Some(Self::Crafting),
            5 => Some(Self::Crime),
            6 => Some(Self::Dlc),
            _ => None,
        }
    }
}

/// One entry of the miscellaneous statistics table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiscStat {
    pub name: String,
    pub category: u8,
    pub value: i32,
}

impl MiscStat {
    /// The category tag, if it is one the engine defines.
    pub fn category_kind(&self) -> Option<MiscStatCategory> {
        MiscStatCategory::from_raw(self.category)
    }
}

/// Where the player is.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLocation {
    /// Number of the next save-specific object ID (`FFxxxxxx`).
    pub next_object_id: u32,
    /// Usually zero or a worldspace; `coord_x`/`coord_y` name a cell in it.
    pub world_space1: RefId,
    pub coord_x: i32,
    pub coord_y: i32,
    /// A worldspace or an interior cell holding the player position.
    pub world_space2: RefId,
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    /// Trailing byte, Skyrim saves only.
    pub unknown: u8,
}

/// A scripted global variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalVariable {
    pub form_id: RefId,
    pub value: f32,
}

/// Weather state.
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub climate: RefId,
    pub weather: RefId,
    pub prev_weather: RefId,
    pub unk_weather1: RefId,
    pub unk_weather2: RefId,
    pub regn_weather: RefId,
    /// Current in-game time in hours.
    pub current_time: f32,
    /// Time the current weather began.
    pub begin_time: f32,
    /// How far the current weather has transitioned, 0.0 to 1.0.
    pub weather_pct: f32,
    pub data1: [u32; 6],
    pub data2: f32,
    /// Affects sky colour; values other than 2 or 3 tint it purple.
    pub data3: u32,
    pub flags: u8,
    /// Trailing bytes, present when flags bit 0 or 1 is set.
    pub data4: Vec<u8>,
}

/// Favourited magic and hotkey assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicFavourites {
    pub favourites: Vec<RefId>,
    pub hotkeys: Vec<RefId>,
}

/// One global-data entry body: structured for the five known types,
/// verbatim bytes for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalData {
    MiscStats(Vec<MiscStat>),
    PlayerLocation(PlayerLocation),
    GlobalVariables(Vec<GlobalVariable>),
    Weather(Weather),
    MagicFavourites(MagicFavourites),
    Raw(Vec<u8>),
}

/// Parse one `(type, length, body)` entry.
pub(crate) fn parse_global(r: &mut Reader<'_>, game: Game) -> Result<(u32, GlobalData)> {
    let type_tag = r.get_u32()?;
    let length = r.get_u32()?;

    if !is_enumerated(type_tag) {
        return Err(Error::UnknownGlobalType(type_tag));
    }

    if (r.remaining() as u64) < u64::from(length) {
        return Err(Error::UnexpectedEof);
    }

    let start = r.offset();
    debug!("{start:#010x}: global data, type={type_tag} length={length}");

    let data = match type_tag {
        global_type::MISC_STATS => GlobalData::MiscStats(parse_misc_stats(r)?),
        global_type::PLAYER_LOCATION => {
            GlobalData::PlayerLocation(parse_player_location(r, game)?)
        }
        global_type::GLOBAL_VARIABLES => GlobalData::GlobalVariables(parse_global_vars(r)?),
        global_type::WEATHER => GlobalData::Weather(parse_weather(r, type_tag, length, start)?),
        global_type::MAGIC_FAVOURITES => GlobalData::MagicFavourites(parse_magic_favourites(r)?),
        _ => GlobalData::Raw(r.get_bytes(length as usize)?),
    };

    let consumed = r.offset() - start;
    if consumed != u64::from(length) {
        return Err(Error::GlobalLengthMismatch {
            type_tag,
            declared: u64::from(length),
            actual: consumed,
        });
    }

    Ok((type_tag, data))
}

/// Write one entry, framing the body with its back-patched length.
pub(crate) fn write_global<W: Write + Seek>(
    w: &mut W,
    type_tag: u32,
    data: &GlobalData,
    game: Game,
) -> Result<()> {
    w.put_u32(type_tag)?;
    let block = Block::begin(w)?;

    match data {
        GlobalData::MiscStats(stats) => write_misc_stats(w, stats)?,
        GlobalData::PlayerLocation(loc) => write_player_location(w, loc, game)?,
        GlobalData::GlobalVariables(vars) => write_global_vars(w, vars)?,
        GlobalData::Weather(weather) => write_weather(w, weather)?,
        GlobalData::MagicFavourites(favs) => write_magic_favourites(w, favs)?,
        GlobalData::Raw(bytes) => w.write_all(bytes)?,
    }

    let length = block.end(w)?;
    debug!("wrote global data, type={type_tag} length={length}");
    Ok(())
}

fn parse_misc_stats(r: &mut Reader<'_>) -> Result<Vec<MiscStat>> {
    let count = r.get_u32()? as usize;
    let mut stats = Vec::new();
    stats
        .try_reserve_exact(count)
        .map_err(|_| Error::OutOfMemory(count))?;

    for _ in 0..count {
        stats.push(MiscStat {
            name: r.get_bstr()?,
            category: r.get_u8()?,
            value: r.get_i32()?,
        });
    }

    Ok(stats)
}

fn write_misc_stats<W: Write>(w: &mut W, stats: &[MiscStat]) -> Result<()> {
    w.put_u32(stats.len() as u32)?;
    for stat in stats {
        w.put_bstr(&stat.name)?;
        w.put_u8(stat.category)?;
        w.put_i32(stat.value)?;
    }
    Ok(())
}

fn parse_player_location(r: &mut Reader<'_>, game: Game) -> Result<PlayerLocation> {
    Ok(PlayerLocation {
        next_object_id: r.get_u32()?,
        world_space1: r.get_ref_id()?,
        coord_x: r.get_i32()?,
        coord_y: r.get_i32()?,
        world_space2: r.get_ref_id()?,
        pos_x: r.get_f32()?,
        pos_y: r.get_f32()?,
        pos_z: r.get_f32()?,
        unknown: if game == Game::Skyrim { r.get_u8()? } else { 0 },
    })
}

fn write_player_location<W: Write>(w: &mut W, loc: &PlayerLocation, game: Game) -> Result<()> {
    w.put_u32(loc.next_object_id)?;
    w.put_ref_id(loc.world_space1)?;
    w.put_i32(loc.coord_x)?;
    w.put_i32(loc.coord_y)?;
    w.put_ref_id(loc.world_space2)?;
    w.put_f32(loc.pos_x)?;
    w.put_f32(loc.pos_y)?;
    w.put_f32(loc.pos_z)?;
    if game == Game::Skyrim {
        w.put_u8(loc.unknown)?;
    }
    Ok(())
}

fn parse_global_vars(r: &mut Reader<'_>) -> Result<Vec<GlobalVariable>> {
    let count = r.get_vsval()? as usize;
    let mut vars = Vec::new();
    vars.try_reserve_exact(count)
        .map_err(|_| Error::OutOfMemory(count))?;

    for _ in 0..count {
        vars.push(GlobalVariable {
            form_id: r.get_ref_id()?,
            value: r.get_f32()?,
        });
    }

    Ok(vars)
}

fn write_global_vars<W: Write>(w: &mut W, vars: &[GlobalVariable]) -> Result<()> {
    w.put_vsval(vars.len() as u32)?;
    for var in vars {
        w.put_ref_id(var.form_id)?;
        w.put_f32(var.value)?;
    }
    Ok(())
}

fn parse_weather(r: &mut Reader<'_>, type_tag: u32, length: u32, start: u64) -> Result<Weather> {
    let mut weather = Weather {
        climate: r.get_ref_id()?,
        weather: r.get_ref_id()?,
        prev_weather: r.get_ref_id()?,
        unk_weather1: r.get_ref_id()?,
        unk_weather2: r.get_ref_id()?,
        regn_weather: r.get_ref_id()?,
        current_time: r.get_f32()?,
        begin_time: r.get_f32()?,
        weather_pct: r.get_f32()?,
        data1: [0; 6],
        data2: 0.0,
        data3: 0,
        flags: 0,
        data4: Vec::new(),
    };

    for slot in &mut weather.data1 {
        *slot = r.get_u32()?;
    }
    weather.data2 = r.get_f32()?;
    weather.data3 = r.get_u32()?;
    weather.flags = r.get_u8()?;

    // Whatever remains of the declared length is opaque.
    let consumed = r.offset() - start;
    let rest = u64::from(length)
        .checked_sub(consumed)
        .ok_or(Error::GlobalLengthMismatch {
            type_tag,
            declared: u64::from(length),
            actual: consumed,
        })?;
    weather.data4 = r.get_bytes(rest as usize)?;

    Ok(weather)
}

fn write_weather<W: Write>(w: &mut W, weather: &Weather) -> Result<()> {
    w.put_ref_id(weather.climate)?;
    w.put_ref_id(weather.weather)?;
    w.put_ref_id(weather.prev_weather)?;
    w.put_ref_id(weather.unk_weather1)?;
    w.put_ref_id(weather.unk_weather2)?;
    w.put_ref_id(weather.regn_weather)?;
    w.put_f32(weather.current_time)?;
    w.put_f32(weather.begin_time)?;
    w.put_f32(weather.weather_pct)?;
    for value in weather.data1 {
        w.put_u32(value)?;
    }
    w.put_f32(weather.data2)?;
    w.put_u32(weather.data3)?;
    w.put_u8(weather.flags)?;
    Ok(w.write_all(&weather.data4)?)
}

fn parse_magic_favourites(r: &mut Reader<'_>) -> Result<MagicFavourites> {
    let num_favourites = r.get_vsval()? as usize;
    let mut favourites = Vec::new();
    favourites
        .try_reserve_exact(num_favourites)
        .map_err(|_| Error::OutOfMemory(num_favourites))?;
    for _ in 0..num_favourites {
        favourites.push(r.get_ref_id()?);
    }

    let num_hotkeys = r.get_vsval()? as usize;
    let mut hotkeys = Vec::new();
    hotkeys
        .try_reserve_exact(num_hotkeys)
        .map_err(|_| Error::OutOfMemory(num_hotkeys))?;
    for _ in 0..num_hotkeys {
        hotkeys.push(r.get_ref_id()?);
    }

    Ok(MagicFavourites {
        favourites,
        hotkeys,
    })
}

fn write_magic_favourites<W: Write>(w: &mut W, favs: &MagicFavourites) -> Result<()> {
    w.put_vsval(favs.favourites.len() as u32)?;
    for id in &favs.favourites {
        w.put_ref_id(*id)?;
    }

    w.put_vsval(favs.hotkeys.len() as u32)?;
    for id in &favs.hotkeys {
        w.put_ref_id(*id)?;
    }

    Ok(())
}
