//! Error type for the Jack compiler
//!
//! Every variant carries the 1-based line and column of the offending
//! token or character. The first error aborts the compilation of the file.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("{line}:{col}: unexpected character `{ch}`")]
    UnexpectedCharacter { ch: char, line: usize, col: usize },

    #[error("{line}:{col}: unterminated string constant")]
    UnterminatedString { line: usize, col: usize },

    #[error("{line}:{col}: unterminated comment")]
    UnterminatedComment { line: usize, col: usize },

    #[error("{line}:{col}: integer constant `{literal}` is out of range (0..=32767)")]
    IntOutOfRange {
        literal: String,
        line: usize,
        col: usize,
    },

    #[error("{line}:{col}: expected {want}, got `{got}`")]
    UnexpectedToken {
        want: String,
        got: String,
        line: usize,
        col: usize,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("{line}:{col}: variable `{name}` is not defined")]
    UndefinedVariable {
        name: String,
        line: usize,
        col: usize,
    },

    #[error("{line}:{col}: `{name}` is already defined in this scope")]
    DuplicateDefinition {
        name: String,
        line: usize,
        col: usize,
    },
}
