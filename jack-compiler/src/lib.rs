//! Jack-to-VM compiler
//!
//! Compiles the Jack object-oriented language into stack-machine VM code,
//! one `.vm` output per class.
//!
//! # Architecture
//!
//! - [`tokenizer`]: scanner with 1-based line/column tracking, plus the
//!   [`tokenizer::TokenStream`] cursor (one-token lookahead, one step back)
//! - [`symbol_table`]: the two live scopes (class, subroutine) mapping
//!   names to (type, kind, index)
//! - [`vm_writer`]: formatted VM emission and the if/while label manager
//! - [`engine`]: single-pass recursive descent - parsing, resolution, and
//!   emission interleaved, no syntax tree
//!
//! # Example
//!
//! ```rust
//! let vm = jack_compiler::compile(
//!     "class Main { function void main() { return; } }",
//! ).unwrap();
//! assert_eq!(vm, ["function Main.main 0", "push constant 0", "return"]);
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

pub mod engine;
pub mod error;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use engine::CompilationEngine;
pub use error::CompileError;
pub use tokenizer::{Token, TokenKind, TokenStream};

/// Compiles one Jack class into VM instructions, in emission order.
///
/// # Errors
/// The first lexical, syntactic, or semantic problem aborts the
/// compilation; nothing is emitted for a failing class.
pub fn compile(source: &str) -> Result<Vec<String>, CompileError> {
    let tokens = tokenizer::tokenize(source)?;
    let engine = CompilationEngine::new(TokenStream::new(tokens));
    engine.compile()
}
