//! Two-pass assembler for the Hack platform
//!
//! Translates symbolic Hack assembly into 16-bit machine words, one binary
//! text line per instruction.
//!
//! # Architecture
//!
//! - [`parser`]: zero-copy classification of A-, C- and L-commands
//! - [`code`]: binary encoding using perfect hash functions (PHF)
//! - [`symbol_table`]: predefined symbols, labels, and variable allocation
//! - [`assemble`]: the two-pass driver tying them together
//!
//! Pass 1 walks the command list counting ROM addresses and binds each
//! label to the address of the instruction that follows it. Pass 2 encodes
//! every A- and C-command, allocating RAM addresses (from 16 upward) for
//! symbols that are neither predefined nor labels.
//!
//! # Example
//!
//! ```rust
//! let words = hack_assembler::assemble("@2\nD=A\n@3\nD=D+A\n@0\nM=D\n").unwrap();
//! assert_eq!(words[0], "0000000000000010"); // @2
//! assert_eq!(words[1], "1110110000010000"); // D=A
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;

// Re-export commonly used types for convenience
pub use error::AsmError;
pub use parser::{CommandType, ParserLines};
pub use symbol_table::SymbolTable;

use log::debug;

/// Checks a symbol against the Hack identifier alphabet:
/// `[A-Za-z_.$:][A-Za-z0-9_.$:]*`.
fn is_valid_symbol(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let extra = |c: char| matches!(c, '_' | '.' | '$' | ':');
    (first.is_ascii_alphabetic() || extra(first))
        && chars.all(|c| c.is_ascii_alphanumeric() || extra(c))
}

/// First pass: bind labels to ROM addresses.
///
/// Only A- and C-commands occupy ROM; an L-command binds its label to the
/// address of the next real instruction and emits nothing itself.
fn bind_labels(parser: &mut ParserLines, table: &mut SymbolTable) -> Result<(), AsmError> {
    let mut rom_address = 0u16;

    while parser.advance() {
        match parser.command_type()? {
            CommandType::LCommand => {
                let symbol = parser.symbol()?;
                if !is_valid_symbol(symbol) {
                    return Err(AsmError::InvalidSymbol {
                        symbol: symbol.to_string(),
                        line: parser.line()?,
                    });
                }
                if !table.add_label(symbol, rom_address) {
                    return Err(AsmError::DuplicateLabel {
                        name: symbol.to_string(),
                        line: parser.line()?,
                    });
                }
                debug!("label {symbol} -> ROM {rom_address}");
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Second pass: encode every instruction, resolving symbols.
fn encode_instructions(
    parser: &mut ParserLines,
    table: &mut SymbolTable,
) -> Result<Vec<String>, AsmError> {
    let mut words = Vec::new();

    while parser.advance() {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;
                let line = parser.line()?;

                let address = if symbol.starts_with(|c: char| c.is_ascii_digit()) {
                    match symbol.parse::<u16>() {
                        Ok(value) if value <= 0x7FFF => value,
                        _ => {
                            return Err(AsmError::AddressOutOfRange {
                                literal: symbol.to_string(),
                                line,
                            })
                        }
                    }
                } else {
                    if !is_valid_symbol(symbol) {
                        return Err(AsmError::InvalidSymbol {
                            symbol: symbol.to_string(),
                            line,
                        });
                    }
                    table.resolve_or_allocate(symbol)
                };

                words.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                let word = code::encode_c_instruction(
                    parser.dest()?,
                    parser.comp()?,
                    parser.jump()?,
                    parser.line()?,
                )?;
                words.push(word);
            }
            CommandType::LCommand => {}
        }
    }

    Ok(words)
}

/// Assembles one Hack source into machine words, one 16-character binary
/// string per instruction, in input order.
///
/// # Errors
/// The first lexical, symbol, or encoding problem aborts the assembly; no
/// partial output is returned.
pub fn assemble(source: &str) -> Result<Vec<String>, AsmError> {
    let mut parser = ParserLines::from_source(source);
    let mut table = SymbolTable::new();

    bind_labels(&mut parser, &mut table)?;
    parser.reset();
    encode_instructions(&mut parser, &mut table)
}
