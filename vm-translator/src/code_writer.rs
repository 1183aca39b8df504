//! Translation of VM commands into Hack assembly
//!
//! Every command lowers to a fixed, deterministic instruction sequence.
//! The stack convention throughout: `SP` holds the next free slot, push
//! writes `*SP` then increments, pop decrements then reads `*SP`.
//!
//! Scratch registers: R13/R14 hold popped operand addresses, and in the
//! return sequence R13 is the saved frame pointer and R14 the return
//! address. The return address must be saved before the return value is
//! copied to `*ARG` - for a zero-argument callee both occupy the same cell.

use std::io::{self, Write};

use log::trace;

use crate::parser::{ArithmeticOp, Segment, VmCommand};

// Writes a fixed block of assembly, one instruction per source line.
macro_rules! emit {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

/// Stream-oriented emitter for one `.asm` output file
///
/// Label counters are per output file and never reset between input files,
/// so comparison and return labels stay unique across a whole multi-file
/// program. The static segment name follows the current input file; see
/// [`CodeWriter::set_file_name`].
pub struct CodeWriter<W: Write> {
    out: W,
    /// Stem of the `.vm` file currently being translated, for `static`
    file_name: String,
    /// Counter behind `TRUE{k}` / `TFEND{k}` comparison labels
    cmp_label_counter: usize,
    /// Counter behind `RET{k}` return-address labels
    ret_label_counter: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            file_name: String::new(),
            cmp_label_counter: 0,
            ret_label_counter: 0,
        }
    }

    /// Declares the input file whose commands follow. `static i` lowers to
    /// the symbol `<file_name>.<i>`, which is what keeps the static
    /// segments of different files apart in the combined output.
    pub fn set_file_name(&mut self, file_name: &str) {
        self.file_name.clear();
        self.file_name.push_str(file_name);
    }

    /// Emits the startup sequence of a multi-file program:
    /// `SP=256; call Sys.init 0`.
    pub fn write_bootstrap(&mut self) -> io::Result<()> {
        writeln!(self.out, "// bootstrap")?;
        emit!(self.out,
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        self.write_call("Sys.init", 0)
    }

    /// Translates one command.
    pub fn write_command(&mut self, command: &VmCommand) -> io::Result<()> {
        trace!("translating {command}");
        writeln!(self.out, "// {command}")?;
        match command {
            VmCommand::Arithmetic(op) => self.write_arithmetic(*op),
            VmCommand::Push { segment, index } => self.write_push(*segment, *index),
            VmCommand::Pop { segment, index } => self.write_pop(*segment, *index),
            VmCommand::Label(label) => writeln!(self.out, "({label})"),
            VmCommand::Goto(label) => self.write_goto(label),
            VmCommand::If(label) => self.write_if_goto(label),
            VmCommand::Function { name, n_locals } => self.write_function(name, *n_locals),
            VmCommand::Call { name, n_args } => self.write_call(name, *n_args),
            VmCommand::Return => self.write_return(),
        }
    }

    /// Flushes the underlying writer.
    pub fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Consumes the writer, returning the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_arithmetic(&mut self, op: ArithmeticOp) -> io::Result<()> {
        match op {
            // Binary: pop y, pop x, compute x (op) y. The second pop leaves
            // A at x's cell, so the result lands in D without scratch space.
            ArithmeticOp::Add => self.write_binary_op("D=D+M"),
            ArithmeticOp::Sub => self.write_binary_op("D=M-D"),
            ArithmeticOp::And => self.write_binary_op("D=D&M"),
            ArithmeticOp::Or => self.write_binary_op("D=D|M"),
            // Unary: rewrite the top cell in place.
            ArithmeticOp::Neg => self.write_unary_op("M=-M"),
            ArithmeticOp::Not => self.write_unary_op("M=!M"),
            // Comparisons branch, so they need fresh labels per site.
            ArithmeticOp::Eq => self.write_comparison("JEQ"),
            ArithmeticOp::Gt => self.write_comparison("JGT"),
            ArithmeticOp::Lt => self.write_comparison("JLT"),
        }
    }

    fn write_binary_op(&mut self, compute: &str) -> io::Result<()> {
        emit!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
            "@SP"
            "AM=M-1"
        )?;
        writeln!(self.out, "{compute}")?;
        self.write_push_d()
    }

    fn write_unary_op(&mut self, rewrite: &str) -> io::Result<()> {
        emit!(self.out,
            "@SP"
            "AM=M-1"
        )?;
        writeln!(self.out, "{rewrite}")?;
        emit!(self.out,
            "@SP"
            "M=M+1"
        )
    }

    /// eq/gt/lt: compute x - y, conditionally jump to the true branch.
    /// True is -1 (all bits set), false is 0.
    fn write_comparison(&mut self, jump: &str) -> io::Result<()> {
        let k = self.cmp_label_counter;
        self.cmp_label_counter += 1;

        emit!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
            "@SP"
            "AM=M-1"
            "D=M-D"
        )?;
        writeln!(self.out, "@TRUE{k}")?;
        writeln!(self.out, "D;{jump}")?;
        emit!(self.out,
            "@SP"
            "A=M"
            "M=0"
            "@SP"
            "M=M+1"
        )?;
        writeln!(self.out, "@TFEND{k}")?;
        emit!(self.out, "0;JMP")?;
        writeln!(self.out, "(TRUE{k})")?;
        emit!(self.out,
            "@SP"
            "A=M"
            "M=-1"
            "@SP"
            "M=M+1"
        )?;
        writeln!(self.out, "(TFEND{k})")
    }

    fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => {
                writeln!(self.out, "@{index}")?;
                emit!(self.out, "D=A")?;
            }
            Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                let base = segment.base_pointer().expect("indirect segment");
                writeln!(self.out, "@{index}")?;
                emit!(self.out, "D=A")?;
                writeln!(self.out, "@{base}")?;
                emit!(self.out,
                    "A=D+M"
                    "D=M"
                )?;
            }
            Segment::Pointer | Segment::Temp => {
                let base = if segment == Segment::Pointer { 3 } else { 5 };
                writeln!(self.out, "@{index}")?;
                emit!(self.out, "D=A")?;
                writeln!(self.out, "@{base}")?;
                emit!(self.out,
                    "A=D+A"
                    "D=M"
                )?;
            }
            Segment::Static => {
                writeln!(self.out, "@{}.{index}", self.file_name)?;
                emit!(self.out, "D=M")?;
            }
        }
        self.write_push_d()
    }

    fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        match segment {
            Segment::Constant => unreachable!("rejected by the parser"),
            Segment::Static => {
                self.write_pop_to_d()?;
                writeln!(self.out, "@{}.{index}", self.file_name)?;
                emit!(self.out, "M=D")
            }
            _ => {
                // Target address into R13 first; the pop itself needs D.
                writeln!(self.out, "@{index}")?;
                emit!(self.out, "D=A")?;
                match segment {
                    Segment::Local | Segment::Argument | Segment::This | Segment::That => {
                        let base = segment.base_pointer().expect("indirect segment");
                        writeln!(self.out, "@{base}")?;
                        emit!(self.out, "D=D+M")?;
                    }
                    Segment::Pointer | Segment::Temp => {
                        let base = if segment == Segment::Pointer { 3 } else { 5 };
                        writeln!(self.out, "@{base}")?;
                        emit!(self.out, "D=D+A")?;
                    }
                    _ => unreachable!(),
                }
                emit!(self.out,
                    "@R13"
                    "M=D"
                )?;
                self.write_pop_to_d()?;
                emit!(self.out,
                    "@R13"
                    "A=M"
                    "M=D"
                )
            }
        }
    }

    fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "@{label}")?;
        emit!(self.out, "0;JMP")
    }

    /// Pop the top of the stack and branch when it is non-zero.
    fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        self.write_pop_to_d()?;
        writeln!(self.out, "@{label}")?;
        emit!(self.out, "D;JNE")
    }

    /// `function f k`: entry label plus k zero-initialized locals.
    fn write_function(&mut self, name: &str, n_locals: u16) -> io::Result<()> {
        writeln!(self.out, "({name})")?;
        for _ in 0..n_locals {
            emit!(self.out,
                "@0"
                "D=A"
            )?;
            self.write_push_d()?;
        }
        Ok(())
    }

    /// `call f n`: save the caller frame, reposition ARG and LCL, jump.
    ///
    /// Frame layout pushed here, top downward: return address, LCL, ARG,
    /// THIS, THAT - five cells, hence `ARG = SP - n - 5`.
    fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        let k = self.ret_label_counter;
        self.ret_label_counter += 1;

        writeln!(self.out, "@RET{k}")?;
        emit!(self.out, "D=A")?;
        self.write_push_d()?;

        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{saved}")?;
            emit!(self.out, "D=M")?;
            self.write_push_d()?;
        }

        emit!(self.out,
            "@SP"
            "D=M"
        )?;
        writeln!(self.out, "@{}", n_args + 5)?;
        emit!(self.out,
            "D=D-A"
            "@ARG"
            "M=D"
            "@SP"
            "D=M"
            "@LCL"
            "M=D"
        )?;

        self.write_goto(name)?;
        writeln!(self.out, "(RET{k})")
    }

    /// `return`: restore the caller frame and jump to the saved address.
    fn write_return(&mut self) -> io::Result<()> {
        // FRAME = LCL; RET = *(FRAME - 5). RET must be saved before the
        // return value overwrites *ARG - for n_args = 0 they alias.
        emit!(self.out,
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "A=D-A"
            "D=M"
            "@R14"
            "M=D"
        )?;

        // *ARG = pop(); SP = ARG + 1
        self.write_pop_to_d()?;
        emit!(self.out,
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
        )?;

        // Restore THAT, THIS, ARG, LCL from *(FRAME - 1..4)
        for restored in ["THAT", "THIS", "ARG", "LCL"] {
            emit!(self.out,
                "@R13"
                "AM=M-1"
                "D=M"
            )?;
            writeln!(self.out, "@{restored}")?;
            emit!(self.out, "M=D")?;
        }

        emit!(self.out,
            "@R14"
            "A=M"
            "0;JMP"
        )
    }

    #[inline]
    fn write_push_d(&mut self) -> io::Result<()> {
        emit!(self.out,
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> io::Result<()> {
        emit!(self.out,
            "@SP"
            "AM=M-1"
            "D=M"
        )
    }
}
