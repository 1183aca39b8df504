//! VM-to-assembly translator for the Hack platform
//!
//! Lowers the stack-based VM language (eight memory segments, arithmetic
//! and logic ops, branching, and the function call/return protocol) into
//! straight-line Hack assembly.
//!
//! # Architecture
//!
//! - [`parser`]: line-oriented decoding into tagged [`parser::VmCommand`]s
//! - [`code_writer`]: deterministic assembly emission per command
//!
//! The only state that crosses input files is held by the
//! [`code_writer::CodeWriter`]: its label counters (kept unique per output
//! file) and the current file stem (which scopes the `static` segment).
//!
//! # Example
//!
//! ```rust
//! use vm_translator::{translate_file, CodeWriter};
//!
//! let mut writer = CodeWriter::new(Vec::new());
//! translate_file("push constant 3\npush constant 5\nadd\n", "Add", &mut writer).unwrap();
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::TranslateError;
pub use parser::{ArithmeticOp, Segment, VmCommand};

use std::io::Write;

use log::info;

/// Translates one `.vm` source into the given writer.
///
/// `file_name` is the stem of the source file; it scopes the `static`
/// segment and must differ between the files of one program.
///
/// # Errors
/// The first parse or write problem aborts the translation.
pub fn translate_file<W: Write>(
    source: &str,
    file_name: &str,
    writer: &mut CodeWriter<W>,
) -> Result<(), TranslateError> {
    let commands = parser::parse_source(source)?;
    info!("{file_name}: {} commands", commands.len());

    writer.set_file_name(file_name);
    for command in &commands {
        writer.write_command(command)?;
    }
    Ok(())
}
