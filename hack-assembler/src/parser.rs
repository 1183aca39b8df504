//! Parser module for Hack assembly
//!
//! Splits source text into commands and classifies them:
//! - Byte-level comment detection for speed
//! - Index-based cursor so both assembler passes walk the same command list
//! - Field accessors slice the stored command text without allocating
//!
//! Whitespace inside a command is insignificant (`D = M` equals `D=M`), so
//! surviving lines are compacted once, up front.

use crate::error::AsmError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandType {
    /// @Xxx where Xxx is either a symbol or a decimal number
    ACommand,
    /// dest=comp;jump
    CCommand,
    /// (Xxx) where Xxx is a symbol
    LCommand,
}

/// One surviving source line, classified.
#[derive(Debug, Clone)]
struct Command {
    /// 1-based source line, for diagnostics
    line: usize,
    text: String,
    kind: CommandType,
}

/// Cursor over the commands of one assembly source
///
/// The cursor starts *before* the first command; `advance` must be called
/// once before any accessor. `reset` rewinds to the initial position so the
/// second pass can re-walk the list.
pub struct ParserLines {
    commands: Vec<Command>,
    /// 0 = before the first command, otherwise `commands[cursor - 1]` is current
    cursor: usize,
}

impl ParserLines {
    /// Scans the whole source once, keeping only real commands.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let mut commands = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            // Fast path: check for empty line before processing
            if raw.is_empty() {
                continue;
            }

            let clean = Self::strip_comment(raw);
            let text: String = clean.chars().filter(|c| !c.is_whitespace()).collect();
            if text.is_empty() {
                continue;
            }

            let kind = Self::classify_command(&text);
            commands.push(Command {
                line: idx + 1,
                text,
                kind,
            });
        }

        Self {
            commands,
            cursor: 0,
        }
    }

    /// Strips a `//` comment using optimized byte scanning
    #[inline]
    fn strip_comment(line: &str) -> &str {
        let bytes = line.as_bytes();
        for i in 0..bytes.len().saturating_sub(1) {
            if bytes[i] == b'/' && bytes[i + 1] == b'/' {
                return &line[..i];
            }
        }
        line
    }

    /// Classifies command type based on first character
    #[inline]
    fn classify_command(text: &str) -> CommandType {
        match text.as_bytes()[0] {
            b'@' => CommandType::ACommand,
            b'(' => CommandType::LCommand,
            _ => CommandType::CCommand,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.cursor < self.commands.len()
    }

    /// Moves to the next command. Returns `false` at end of input.
    #[inline]
    pub fn advance(&mut self) -> bool {
        if self.has_more() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Rewinds to the initial position (before the first command).
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    #[inline]
    fn current(&self) -> Result<&Command, AsmError> {
        if self.cursor == 0 {
            return Err(AsmError::InvalidState("no current command"));
        }
        Ok(&self.commands[self.cursor - 1])
    }

    pub fn command_type(&self) -> Result<CommandType, AsmError> {
        Ok(self.current()?.kind)
    }

    /// 1-based source line of the current command.
    pub fn line(&self) -> Result<usize, AsmError> {
        Ok(self.current()?.line)
    }

    /// Returns the symbol of an A-command or the label of an L-command.
    pub fn symbol(&self) -> Result<&str, AsmError> {
        let command = self.current()?;
        match command.kind {
            CommandType::ACommand => Ok(&command.text[1..]),
            CommandType::LCommand => {
                // `(` is guaranteed by classification; `)` is not.
                if command.text.len() < 3 || !command.text.ends_with(')') {
                    return Err(AsmError::MalformedLabel {
                        text: command.text.clone(),
                        line: command.line,
                    });
                }
                Ok(&command.text[1..command.text.len() - 1])
            }
            CommandType::CCommand => {
                Err(AsmError::InvalidState("symbol() called on a C-command"))
            }
        }
    }

    /// Returns the dest field of a C-command, `""` when absent.
    pub fn dest(&self) -> Result<&str, AsmError> {
        let command = self.c_command()?;
        match command.text.find('=') {
            Some(pos) => Ok(&command.text[..pos]),
            None => Ok(""),
        }
    }

    /// Returns the comp field of a C-command.
    pub fn comp(&self) -> Result<&str, AsmError> {
        let command = self.c_command()?;
        let start = command.text.find('=').map_or(0, |pos| pos + 1);
        let end = command.text.find(';').unwrap_or(command.text.len());
        Ok(&command.text[start..end])
    }

    /// Returns the jump field of a C-command, `""` when absent.
    pub fn jump(&self) -> Result<&str, AsmError> {
        let command = self.c_command()?;
        match command.text.find(';') {
            Some(pos) => Ok(&command.text[pos + 1..]),
            None => Ok(""),
        }
    }

    #[inline]
    fn c_command(&self) -> Result<&Command, AsmError> {
        let command = self.current()?;
        if command.kind != CommandType::CCommand {
            return Err(AsmError::InvalidState(
                "field accessor called on a non-C command",
            ));
        }
        Ok(command)
    }
}
