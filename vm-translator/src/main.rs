//! VM translator - command line entry point
//!
//! Accepts a single `.vm` file or a directory. A directory is treated as
//! one program: every `.vm` file in it (sorted by name) is translated into
//! one `<dir>/<DirName>.asm`, preceded by the bootstrap sequence. A single
//! file translates to a sibling `.asm` without bootstrap.

#![warn(clippy::all, clippy::pedantic)]

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::info;
use structopt::StructOpt;

use vm_translator::{translate_file, CodeWriter};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "vm-translator",
    about = "Translate stack-machine VM code into Hack assembly"
)]
struct Args {
    /// A `.vm` file, or a directory containing the `.vm` files of one program
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output path (defaults to `<input>.asm` / `<dir>/<DirName>.asm`)
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lists the `.vm` files of a program directory, sorted for deterministic
/// output.
fn vm_files(dir: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "vm"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(format!("no .vm files in {}", dir.display()).into());
    }
    Ok(files)
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = Args::from_args();

    let is_dir = args.input.is_dir();
    let output = args.output.unwrap_or_else(|| {
        if is_dir {
            let name = format!("{}.asm", file_stem(&args.input));
            args.input.join(name)
        } else {
            args.input.with_extension("asm")
        }
    });

    let mut writer = CodeWriter::new(BufWriter::new(File::create(&output)?));

    if is_dir {
        // One program spread over several files: bootstrap first, then all
        // files through the same writer so labels stay unique.
        writer.write_bootstrap()?;
        for path in vm_files(&args.input)? {
            let source = fs::read_to_string(&path)?;
            translate_file(&source, &file_stem(&path), &mut writer)?;
        }
    } else {
        let source = fs::read_to_string(&args.input)?;
        translate_file(&source, &file_stem(&args.input), &mut writer)?;
    }

    writer.finish()?;
    info!("wrote {}", output.display());
    Ok(())
}
