//! Error type for the VM translator

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("line {line}: unknown command `{text}`")]
    UnknownCommand { text: String, line: usize },

    #[error("line {line}: `{command}` takes {expected} operand(s)")]
    WrongArity {
        command: String,
        expected: usize,
        line: usize,
    },

    #[error("line {line}: unknown segment `{segment}`")]
    UnknownSegment { segment: String, line: usize },

    #[error("line {line}: `{operand}` is not a valid index")]
    InvalidIndex { operand: String, line: usize },

    /// `pointer` addresses two cells and `temp` eight; anything beyond is
    /// not mapped RAM.
    #[error("line {line}: index {index} is out of range for segment `{segment}`")]
    IndexOutOfRange {
        segment: &'static str,
        index: u16,
        line: usize,
    },

    #[error("line {line}: cannot pop to the constant segment")]
    PopConstant { line: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
