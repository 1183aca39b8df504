//! Parser module for the VM language
//!
//! Each non-empty, non-comment line is one command: whitespace-separated
//! tokens, the first of which decides the command kind. Parsing produces
//! tagged [`VmCommand`] values; operand arity and segment index ranges are
//! checked here so the code writer only ever sees legal commands.

use crate::error::TranslateError;

/// Arithmetic and logic operations of the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }

    #[must_use]
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        match s {
            "add" => Some(Self::Add),
            "sub" => Some(Self::Sub),
            "neg" => Some(Self::Neg),
            "eq" => Some(Self::Eq),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

/// The eight VM memory segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

impl Segment {
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "constant" => Some(Self::Constant),
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "pointer" => Some(Self::Pointer),
            "temp" => Some(Self::Temp),
            "static" => Some(Self::Static),
            _ => None,
        }
    }

    /// Name of the segment as written in VM source.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Local => "local",
            Self::Argument => "argument",
            Self::This => "this",
            Self::That => "that",
            Self::Pointer => "pointer",
            Self::Temp => "temp",
            Self::Static => "static",
        }
    }

    /// Base pointer symbol for the indirect segments.
    #[must_use]
    pub(crate) fn base_pointer(self) -> Option<&'static str> {
        match self {
            Self::Local => Some("LCL"),
            Self::Argument => Some("ARG"),
            Self::This => Some("THIS"),
            Self::That => Some("THAT"),
            _ => None,
        }
    }
}

/// One VM command, fully decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithmeticOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    If(String),
    Function { name: String, n_locals: u16 },
    Call { name: String, n_args: u16 },
    Return,
}

impl std::fmt::Display for VmCommand {
    /// Canonical VM source text of the command.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arithmetic(op) => write!(f, "{}", op.mnemonic()),
            Self::Push { segment, index } => write!(f, "push {} {index}", segment.name()),
            Self::Pop { segment, index } => write!(f, "pop {} {index}", segment.name()),
            Self::Label(label) => write!(f, "label {label}"),
            Self::Goto(label) => write!(f, "goto {label}"),
            Self::If(label) => write!(f, "if-goto {label}"),
            Self::Function { name, n_locals } => write!(f, "function {name} {n_locals}"),
            Self::Call { name, n_args } => write!(f, "call {name} {n_args}"),
            Self::Return => write!(f, "return"),
        }
    }
}

/// Strips a `//` comment using a byte scan
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

fn parse_index(operand: &str, line: usize) -> Result<u16, TranslateError> {
    operand.parse::<u16>().map_err(|_| TranslateError::InvalidIndex {
        operand: operand.to_string(),
        line,
    })
}

fn check_segment_range(segment: Segment, index: u16, line: usize) -> Result<(), TranslateError> {
    let limit = match segment {
        Segment::Pointer => 2,
        Segment::Temp => 8,
        _ => return Ok(()),
    };
    if index < limit {
        Ok(())
    } else {
        Err(TranslateError::IndexOutOfRange {
            segment: segment.name(),
            index,
            line,
        })
    }
}

fn expect_arity(
    tokens: &[&str],
    expected: usize,
    line: usize,
) -> Result<(), TranslateError> {
    if tokens.len() == expected + 1 {
        Ok(())
    } else {
        Err(TranslateError::WrongArity {
            command: tokens[0].to_string(),
            expected,
            line,
        })
    }
}

/// Parses a single surviving line. `line` is 1-based, for diagnostics.
fn parse_line(text: &str, line: usize) -> Result<VmCommand, TranslateError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    debug_assert!(!tokens.is_empty(), "blank lines are filtered by the caller");

    let command = match tokens[0] {
        "push" | "pop" => {
            expect_arity(&tokens, 2, line)?;
            let segment = Segment::from_name(tokens[1]).ok_or_else(|| {
                TranslateError::UnknownSegment {
                    segment: tokens[1].to_string(),
                    line,
                }
            })?;
            let index = parse_index(tokens[2], line)?;
            check_segment_range(segment, index, line)?;
            if tokens[0] == "push" {
                VmCommand::Push { segment, index }
            } else {
                if segment == Segment::Constant {
                    return Err(TranslateError::PopConstant { line });
                }
                VmCommand::Pop { segment, index }
            }
        }
        "label" => {
            expect_arity(&tokens, 1, line)?;
            VmCommand::Label(tokens[1].to_string())
        }
        "goto" => {
            expect_arity(&tokens, 1, line)?;
            VmCommand::Goto(tokens[1].to_string())
        }
        "if-goto" => {
            expect_arity(&tokens, 1, line)?;
            VmCommand::If(tokens[1].to_string())
        }
        "function" => {
            expect_arity(&tokens, 2, line)?;
            VmCommand::Function {
                name: tokens[1].to_string(),
                n_locals: parse_index(tokens[2], line)?,
            }
        }
        "call" => {
            expect_arity(&tokens, 2, line)?;
            VmCommand::Call {
                name: tokens[1].to_string(),
                n_args: parse_index(tokens[2], line)?,
            }
        }
        "return" => {
            expect_arity(&tokens, 0, line)?;
            VmCommand::Return
        }
        mnemonic => match ArithmeticOp::from_mnemonic(mnemonic) {
            Some(op) => {
                expect_arity(&tokens, 0, line)?;
                VmCommand::Arithmetic(op)
            }
            None => {
                return Err(TranslateError::UnknownCommand {
                    text: text.to_string(),
                    line,
                })
            }
        },
    };

    Ok(command)
}

/// Parses a whole `.vm` source into commands, in order.
pub fn parse_source(source: &str) -> Result<Vec<VmCommand>, TranslateError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let text = strip_comment(raw).trim();
        if text.is_empty() {
            continue;
        }
        commands.push(parse_line(text, idx + 1)?);
    }
    Ok(commands)
}
