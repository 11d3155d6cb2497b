//! # cesave-format
//!
//! Codec for Creation Engine game-save containers: the format shared, with
//! variants, by Skyrim (Legendary and Special Edition) and Fallout 4.
//!
//! A save is a versioned binary container: signature, framed header,
//! screenshot, then a body that is LZ4 (or zlib) compressed on Skyrim
//! Special Edition. The body is indexed by an offsets table that the
//! engine back-patches after writing — together with a handful of
//! well-known off-by-a-little bugs in the engine's writer that this codec
//! reproduces deliberately, so that decoding a file and re-encoding it
//! yields the original bytes.
//!
//! Change-form payloads and most global-data entries are opaque to the
//! codec: they are carried as raw bytes and survive a rewrite untouched.
//! The handful of structured entries (miscellaneous statistics, player
//! location, global variables, weather, magic favourites) decode into
//! typed values.
//!
//! ## Quick start
//!
//! ```no_run
//! use cesave_format::Savefile;
//!
//! # fn main() -> cesave_format::Result<()> {
//! let save = Savefile::read("quicksave.ess")?;
//! println!("{} (level {})", save.player_name, save.level);
//! save.write("written_savefile")?;
//! # Ok(())
//! # }
//! ```

mod block;
mod change_form;
mod compression;
mod error;
mod globals;
mod ioutils;
mod refid;
mod savefile;
mod snapshot;

pub use change_form::{ChangeForm, ChangeFormKind};
pub use compression::CompressionMethod;
pub use error::{Error, ErrorKind, Result};
pub use globals::{
    GlobalData, GlobalVariable, MagicFavourites, MiscStat, MiscStatCategory, PlayerLocation,
    Weather, global_type,
};
pub use ioutils::VSVAL_MAX;
pub use refid::{RefId, RefIdKind};
pub use savefile::{Game, Header, Savefile, read_header};
pub use snapshot::{PixelFormat, Snapshot};
