//! Hack assembler - command line entry point
//!
//! Reads one `.asm` file and writes the assembled `.hack` image next to it
//! (or wherever `--output` points). Exit code is non-zero on the first
//! error; `RUST_LOG=debug` traces label binding.

#![warn(clippy::all, clippy::pedantic)]

use std::error::Error;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use log::info;
use structopt::StructOpt;

use hack_assembler::assemble;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "hack-assembler",
    about = "Translate Hack symbolic assembly into 16-bit machine code"
)]
struct Args {
    /// Input `.asm` file
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Output path (defaults to the input with a `.hack` extension)
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();
    let args = Args::from_args();

    let source = fs::read_to_string(&args.input)?;
    let words = assemble(&source)?;

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("hack"));
    let mut writer = BufWriter::new(File::create(&output)?);
    for word in &words {
        writeln!(writer, "{word}")?;
    }
    writer.flush()?;

    info!(
        "assembled {} instructions into {}",
        words.len(),
        output.display()
    );
    Ok(())
}
