//! Error type for the assembler
//!
//! Every variant that originates from source text carries the 1-based line
//! number of the offending command. The first error aborts the assembly;
//! nothing is recovered.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: unknown dest mnemonic `{mnemonic}`")]
    UnknownDest { mnemonic: String, line: usize },

    #[error("line {line}: unknown comp mnemonic `{mnemonic}`")]
    UnknownComp { mnemonic: String, line: usize },

    #[error("line {line}: unknown jump mnemonic `{mnemonic}`")]
    UnknownJump { mnemonic: String, line: usize },

    /// A-command literals must fit in the 15-bit address field.
    #[error("line {line}: address `{literal}` exceeds 15 bits")]
    AddressOutOfRange { literal: String, line: usize },

    #[error("line {line}: invalid symbol `{symbol}`")]
    InvalidSymbol { symbol: String, line: usize },

    #[error("line {line}: malformed label `{text}`")]
    MalformedLabel { text: String, line: usize },

    #[error("line {line}: label `{name}` is already defined")]
    DuplicateLabel { name: String, line: usize },

    /// Cursor misuse: a field accessor was called for the wrong command
    /// kind, or before the first `advance`.
    #[error("invalid parser state: {0}")]
    InvalidState(&'static str),
}
