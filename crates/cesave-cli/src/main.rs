//! Resave tool: decode a Creation Engine save file and write it back out.
//!
//! A successful run reads the input, re-encodes it to `written_savefile`
//! (or `--output`) and exits 0. Failures print a single line to stderr
//! chosen by the error class. `RUST_LOG=debug` enables the codec's parse
//! narration.

use std::path::PathBuf;
use std::process::ExitCode;

use cesave_format::{Error, ErrorKind, Savefile};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decode a Creation Engine save file and re-encode it.
#[derive(Parser, Debug)]
#[command(name = "cesave", version, about)]
struct Args {
    /// Path to the save file to read.
    input: PathBuf,

    /// Where to write the re-encoded save.
    #[arg(short, long, default_value = "written_savefile")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let save = Savefile::read(&args.input)?;
    debug!(
        "read {:?} save, file version {}, {} change forms",
        save.game,
        save.file_version,
        save.change_forms.len()
    );
    save.write(&args.output)?;
    Ok(())
}

/// One line per error class, never more.
fn describe(e: &Error) -> String {
    match e.kind() {
        ErrorKind::Unsupported => "File cannot be read because its format is unsupported.".into(),
        ErrorKind::UnexpectedEof => "File ended too soon. Is the save corrupt?".into(),
        ErrorKind::OutOfMemory => "Failed to allocate memory.".into(),
        ErrorKind::Malformed => format!("File is malformed: {e}."),
        ErrorKind::Io => e.to_string(),
    }
}
