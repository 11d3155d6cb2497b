//! Fixture builders and byte-poking helpers shared by the integration
//! suites.

#![allow(dead_code)]

use std::collections::BTreeMap;

use cesave_format::{
    ChangeForm, CompressionMethod, Game, GlobalData, GlobalVariable, MagicFavourites, MiscStat,
    PixelFormat, PlayerLocation, RefId, Savefile, Snapshot, Weather, global_type,
};

pub fn le16(bytes: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes(bytes[pos..pos + 2].try_into().unwrap())
}

pub fn set_le16(bytes: &mut [u8], pos: usize, value: u16) {
    bytes[pos..pos + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn le32(bytes: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes(bytes[pos..pos + 4].try_into().unwrap())
}

pub fn set_le32(bytes: &mut [u8], pos: usize, value: u32) {
    bytes[pos..pos + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn signature_len(game: Game) -> usize {
    match game {
        Game::Skyrim => 13,
        Game::Fallout4 => 12,
    }
}

/// File offset of the body: past signature, framed header and snapshot.
pub fn body_start(save: &Savefile, bytes: &[u8]) -> usize {
    let sig = signature_len(save.game);
    let header_len = le32(bytes, sig) as usize;
    sig + 4 + header_len + save.snapshot.pixels().len()
}

/// Content length of the framed plugin block: the count byte and the
/// plugin strings. Light plugins live outside the frame.
pub fn plugin_block_content_len(save: &Savefile) -> usize {
    1 + save.plugins.iter().map(|p| 2 + p.len()).sum::<usize>()
}

/// Bytes of the unframed light-plugin region that follows the plugin
/// block, zero when the variant does not carry one.
pub fn light_plugin_region_len(save: &Savefile) -> usize {
    let present = match save.game {
        Game::Fallout4 => true,
        Game::Skyrim => save.file_version >= 12 && save.form_version >= 78,
    };
    if !present {
        return 0;
    }
    2 + save
        .light_plugins
        .iter()
        .map(|p| 2 + p.len())
        .sum::<usize>()
}

/// A Skyrim document with every list empty: scenario seed and truncation
/// target.
pub fn empty_skyrim(file_version: u32) -> Savefile {
    Savefile {
        game: Game::Skyrim,
        file_version,
        form_version: 74,
        compressor: CompressionMethod::None,
        save_number: 3,
        player_name: "Dovahkiin".into(),
        level: 5,
        player_location_name: "Riverwood".into(),
        game_time: "Day 1".into(),
        race_id: "NordRace".into(),
        sex: 1,
        current_xp: 120.5,
        target_xp: 300.0,
        filetime: 132_539_328_000_000_000,
        snapshot: Snapshot::allocate(PixelFormat::for_file_version(file_version), 16, 16).unwrap(),
        game_version: None,
        plugins: Vec::new(),
        light_plugins: Vec::new(),
        globals: BTreeMap::new(),
        change_forms: Vec::new(),
        form_ids: Vec::new(),
        world_spaces: Vec::new(),
        trailing: vec![0; 16],
    }
}

pub fn sample_weather(flags: u8, data4: Vec<u8>) -> Weather {
    Weather {
        climate: RefId::regular(0x10a23),
        weather: RefId::regular(0x10e1f),
        prev_weather: RefId::default(),
        unk_weather1: RefId::default(),
        unk_weather2: RefId::default(),
        regn_weather: RefId::regular(0x131f5),
        current_time: 13.5,
        begin_time: 12.25,
        weather_pct: 1.0,
        data1: [2, 0, 0, 1, 0, 0],
        data2: 0.0,
        data3: 2,
        flags,
        data4,
    }
}

fn raw(type_tag: u32) -> GlobalData {
    GlobalData::Raw(vec![type_tag as u8; 3 + (type_tag % 5) as usize])
}

fn structured_globals(game: Game) -> BTreeMap<u32, GlobalData> {
    let mut globals = BTreeMap::new();
    globals.insert(
        global_type::MISC_STATS,
        GlobalData::MiscStats(vec![
            MiscStat {
                name: "Days Passed".into(),
                category: 0,
                value: 42,
            },
            MiscStat {
                name: "Locks Picked".into(),
                category: 2,
                value: 11,
            },
        ]),
    );
    globals.insert(
        global_type::PLAYER_LOCATION,
        GlobalData::PlayerLocation(PlayerLocation {
            next_object_id: 0xff00_0100,
            world_space1: RefId::regular(0x3c),
            coord_x: -2,
            coord_y: 4,
            world_space2: RefId::regular(0x3c),
            pos_x: 100.5,
            pos_y: -220.25,
            pos_z: 32.0,
            unknown: u8::from(game == Game::Skyrim),
        }),
    );
    globals.insert(
        global_type::GLOBAL_VARIABLES,
        GlobalData::GlobalVariables(vec![
            GlobalVariable {
                form_id: RefId::regular(0x4f),
                value: 10.0,
            },
            GlobalVariable {
                form_id: RefId::regular(0x50),
                value: -1.5,
            },
        ]),
    );
    globals.insert(
        global_type::WEATHER,
        GlobalData::Weather(sample_weather(0, Vec::new())),
    );
    globals.insert(
        global_type::MAGIC_FAVOURITES,
        GlobalData::MagicFavourites(MagicFavourites {
            favourites: vec![RefId::regular(0x1b), RefId::created(0x002a)],
            hotkeys: vec![RefId::default(); 2],
        }),
    );
    globals
}

/// The full Skyrim table population: 0-8, 100-114 without 104, 1000-1005.
pub fn skyrim_globals() -> BTreeMap<u32, GlobalData> {
    let mut globals = structured_globals(Game::Skyrim);
    for type_tag in [2, 4, 5, 7, 8] {
        globals.insert(type_tag, raw(type_tag));
    }
    for type_tag in [100, 101, 102, 103, 105, 106, 107, 108, 110, 111, 112, 113, 114] {
        globals.insert(type_tag, raw(type_tag));
    }
    for type_tag in 1000..=1005 {
        globals.insert(type_tag, raw(type_tag));
    }
    globals
}

/// The full Fallout 4 table population: 0-11, 100-117 without 104, 107,
/// 108 and 112, 1000-1007.
pub fn fallout4_globals() -> BTreeMap<u32, GlobalData> {
    let mut globals = structured_globals(Game::Fallout4);
    for type_tag in [2, 4, 5, 7, 8, 9, 10, 11] {
        globals.insert(type_tag, raw(type_tag));
    }
    for type_tag in [100, 101, 102, 103, 105, 106, 110, 111, 113, 114, 115, 116, 117] {
        globals.insert(type_tag, raw(type_tag));
    }
    for type_tag in 1000..=1007 {
        globals.insert(type_tag, raw(type_tag));
    }
    globals
}

pub fn sample_change_forms() -> Vec<ChangeForm> {
    vec![
        ChangeForm {
            form_id: RefId::regular(0x1a2b3),
            flags: 0x0000_0002,
            type_byte: 0, // u8 lengths, REFR
            version: 74,
            length2: 0,
            data: vec![0x11; 9],
        },
        ChangeForm {
            form_id: RefId::created(0x0042),
            flags: 0x8000_0001,
            type_byte: (1 << 6) | 9, // u16 lengths, NPC_
            version: 74,
            length2: 600,
            data: vec![0x22; 400],
        },
        ChangeForm {
            form_id: RefId::form_id_index(7),
            flags: 0,
            type_byte: (2 << 6) | 6, // u32 lengths, CELL
            version: 74,
            length2: 0,
            data: vec![0x33; 70000],
        },
    ]
}

/// Skyrim Legendary Edition: uncompressed body, no light plugins.
pub fn skyrim_le_v9() -> Savefile {
    let mut save = empty_skyrim(9);
    save.plugins = vec!["Skyrim.esm".into(), "Update.esm".into()];
    save.globals = skyrim_globals();
    save.change_forms = sample_change_forms();
    save.form_ids = vec![0x14, 0x1a, 0xff00_0001];
    save.world_spaces = vec![0x3c];
    save.trailing = vec![7; 5];
    save
}

/// Skyrim Special Edition: compressed body, offsets stored 8 low.
pub fn skyrim_se_v12(form_version: u8, compressor: CompressionMethod) -> Savefile {
    let mut save = skyrim_le_v9();
    save.file_version = 12;
    save.form_version = form_version;
    save.compressor = compressor;
    save.snapshot = Snapshot::allocate(PixelFormat::Rgba, 16, 16).unwrap();
    if form_version >= 78 {
        save.light_plugins = vec!["ccbgssse001-fish.esm".into(), "unofficial.esl".into()];
    }
    save
}

/// Fallout 4 at the given file version (11 or 15).
pub fn fallout4(file_version: u32) -> Savefile {
    let mut save = empty_skyrim(file_version);
    save.game = Game::Fallout4;
    save.form_version = 64;
    save.player_name = "Sole Survivor".into();
    save.player_location_name = "Sanctuary".into();
    save.race_id = "HumanRace".into();
    save.snapshot = Snapshot::allocate(PixelFormat::Rgba, 2, 2).unwrap();
    save.game_version = Some("1.10.162.0".into());
    save.plugins = vec![
        "Fallout4.esm".into(),
        "DLCRobot.esm".into(),
        "DLCCoast.esm".into(),
    ];
    save.light_plugins = vec!["ccfsvfo4001.esl".into(), "ccfsvfo4002.esl".into()];
    save.globals = fallout4_globals();
    save.change_forms = sample_change_forms();
    save.form_ids = vec![0x0001_e8a0];
    save.world_spaces = vec![0x3c, 0x3d];
    save.trailing = vec![0xaa; 8];
    save
}
