//! Jack compiler - command line entry point
//!
//! Accepts a single `.jack` file or a directory; every `.jack` file is
//! compiled to a sibling `.vm` file. The first error in any file aborts
//! with a non-zero exit code.

#![warn(clippy::all, clippy::pedantic)]

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "jack-compiler",
    about = "Compile Jack classes into stack-machine VM code"
)]
struct Args {
    /// A `.jack` file, or a directory of `.jack` files
    #[structopt(parse(from_os_str))]
    input: PathBuf,
}

fn compile_file(path: &Path) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let vm_lines = jack_compiler::compile(&source)
        .map_err(|err| format!("{}: {err}", path.display()))?;

    let output = path.with_extension("vm");
    fs::write(&output, vm_lines.join("\n") + "\n")?;
    info!("{} -> {}", path.display(), output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = Args::from_args();

    if args.input.is_dir() {
        let mut sources: Vec<PathBuf> = fs::read_dir(&args.input)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        sources.sort();
        if sources.is_empty() {
            return Err(format!("no .jack files in {}", args.input.display()).into());
        }
        for path in &sources {
            compile_file(path)?;
        }
    } else {
        compile_file(&args.input)?;
    }

    Ok(())
}
