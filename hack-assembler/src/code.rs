//! Binary encoding of Hack instructions
//!
//! Translates assembly mnemonics to machine code using perfect hash
//! functions (PHF): the hash tables are computed at compile time, so every
//! lookup is O(1) with zero runtime setup cost.
//!
//! Unknown mnemonics are fatal. The Hack ALU has no sensible fallback for a
//! mistyped `comp`, so the encoder reports the offending mnemonic and line
//! instead of guessing.

use phf::phf_map;

use crate::error::AsmError;

/// Destination mnemonic to binary code mapping (3 bits)
///
/// The empty string is the null destination.
static DEST_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "M" => "001",
    "D" => "010",
    "MD" => "011",
    "A" => "100",
    "AM" => "101",
    "AD" => "110",
    "AMD" => "111",
};

/// Computation mnemonic to binary code mapping (7 bits: 1 bit `a` + 6 bits `cccccc`)
///
/// Includes both a=0 (A register) and a=1 (M register) variants.
static COMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    // a=0 (A register operations)
    "0" => "0101010",
    "1" => "0111111",
    "-1" => "0111010",
    "D" => "0001100",
    "A" => "0110000",
    "!D" => "0001101",
    "!A" => "0110001",
    "-D" => "0001111",
    "-A" => "0110011",
    "D+1" => "0011111",
    "A+1" => "0110111",
    "D-1" => "0001110",
    "A-1" => "0110010",
    "D+A" => "0000010",
    "D-A" => "0010011",
    "A-D" => "0000111",
    "D&A" => "0000000",
    "D|A" => "0010101",

    // a=1 (M register operations)
    "M" => "1110000",
    "!M" => "1110001",
    "-M" => "1110011",
    "M+1" => "1110111",
    "M-1" => "1110010",
    "D+M" => "1000010",
    "D-M" => "1010011",
    "M-D" => "1000111",
    "D&M" => "1000000",
    "D|M" => "1010101",
};

/// Jump mnemonic to binary code mapping (3 bits)
///
/// The empty string means no jump.
static JUMP_MAP: phf::Map<&'static str, &'static str> = phf_map! {
    "" => "000",
    "JGT" => "001",
    "JEQ" => "010",
    "JGE" => "011",
    "JLT" => "100",
    "JNE" => "101",
    "JLE" => "110",
    "JMP" => "111",
};

/// Translates a destination mnemonic to its 3-bit code.
#[inline]
#[must_use]
pub fn dest(mnemonic: &str) -> Option<&'static str> {
    DEST_MAP.get(mnemonic).copied()
}

/// Translates a computation mnemonic to its 7-bit code (`a` bit included).
#[inline]
#[must_use]
pub fn comp(mnemonic: &str) -> Option<&'static str> {
    COMP_MAP.get(mnemonic).copied()
}

/// Translates a jump mnemonic to its 3-bit code.
#[inline]
#[must_use]
pub fn jump(mnemonic: &str) -> Option<&'static str> {
    JUMP_MAP.get(mnemonic).copied()
}

/// Encodes a complete C-instruction
///
/// C-instruction format: `111accccccdddjjj` (16 bits)
/// - `111`: C-instruction prefix
/// - `acccccc`: computation
/// - `ddd`: destination
/// - `jjj`: jump
///
/// # Errors
/// Any unrecognized field mnemonic, reported with `line`.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_c_instruction;
/// let word = encode_c_instruction("D", "A-1", "JGT", 1).unwrap();
/// assert_eq!(word, "1110110010010001");
/// ```
#[inline]
pub fn encode_c_instruction(
    dest_mnemonic: &str,
    comp_mnemonic: &str,
    jump_mnemonic: &str,
    line: usize,
) -> Result<String, AsmError> {
    let d = dest(dest_mnemonic).ok_or_else(|| AsmError::UnknownDest {
        mnemonic: dest_mnemonic.to_string(),
        line,
    })?;
    let c = comp(comp_mnemonic).ok_or_else(|| AsmError::UnknownComp {
        mnemonic: comp_mnemonic.to_string(),
        line,
    })?;
    let j = jump(jump_mnemonic).ok_or_else(|| AsmError::UnknownJump {
        mnemonic: jump_mnemonic.to_string(),
        line,
    })?;

    Ok(format!("111{c}{d}{j}"))
}

/// Encodes an A-instruction
///
/// A-instruction format: `0vvvvvvvvvvvvvvv` (16 bits), top bit 0 and a
/// 15-bit value. Callers validate the 15-bit range before handing the
/// address over.
///
/// # Example
/// ```
/// use hack_assembler::code::encode_a_instruction;
/// assert_eq!(encode_a_instruction(5), "0000000000000101");
/// ```
#[inline]
#[must_use]
pub fn encode_a_instruction(address: u16) -> String {
    format!("{address:016b}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_translations() {
        assert_eq!(dest(""), Some("000"));
        assert_eq!(dest("M"), Some("001"));
        assert_eq!(dest("D"), Some("010"));
        assert_eq!(dest("MD"), Some("011"));
        assert_eq!(dest("A"), Some("100"));
        assert_eq!(dest("AM"), Some("101"));
        assert_eq!(dest("AD"), Some("110"));
        assert_eq!(dest("AMD"), Some("111"));
        assert_eq!(dest("INVALID"), None);
    }

    #[test]
    fn test_comp_translations() {
        // a=0 cases
        assert_eq!(comp("0"), Some("0101010"));
        assert_eq!(comp("1"), Some("0111111"));
        assert_eq!(comp("D"), Some("0001100"));
        assert_eq!(comp("A"), Some("0110000"));
        assert_eq!(comp("D+A"), Some("0000010"));
        assert_eq!(comp("D&A"), Some("0000000"));

        // a=1 cases
        assert_eq!(comp("M"), Some("1110000"));
        assert_eq!(comp("D+M"), Some("1000010"));
        assert_eq!(comp("D&M"), Some("1000000"));

        assert_eq!(comp("INVALID"), None);
    }

    #[test]
    fn test_jump_translations() {
        assert_eq!(jump(""), Some("000"));
        assert_eq!(jump("JGT"), Some("001"));
        assert_eq!(jump("JEQ"), Some("010"));
        assert_eq!(jump("JGE"), Some("011"));
        assert_eq!(jump("JLT"), Some("100"));
        assert_eq!(jump("JNE"), Some("101"));
        assert_eq!(jump("JLE"), Some("110"));
        assert_eq!(jump("JMP"), Some("111"));
        assert_eq!(jump("INVALID"), None);
    }

    #[test]
    fn test_encode_c_instruction() {
        // D=D+1
        assert_eq!(
            encode_c_instruction("D", "D+1", "", 1).unwrap(),
            "1110011111010000"
        );
        // MD=M-1;JEQ
        assert_eq!(
            encode_c_instruction("MD", "M-1", "JEQ", 1).unwrap(),
            "1111110010011010"
        );
        // 0;JMP (unconditional jump)
        assert_eq!(
            encode_c_instruction("", "0", "JMP", 1).unwrap(),
            "1110101010000111"
        );
        // D=A-1;JGT
        assert_eq!(
            encode_c_instruction("D", "A-1", "JGT", 1).unwrap(),
            "1110110010010001"
        );
    }

    #[test]
    fn test_unknown_mnemonics_are_fatal() {
        assert_eq!(
            encode_c_instruction("X", "0", "", 7),
            Err(AsmError::UnknownDest {
                mnemonic: "X".into(),
                line: 7
            })
        );
        assert_eq!(
            encode_c_instruction("D", "D**M", "", 8),
            Err(AsmError::UnknownComp {
                mnemonic: "D**M".into(),
                line: 8
            })
        );
        assert_eq!(
            encode_c_instruction("D", "0", "JXX", 9),
            Err(AsmError::UnknownJump {
                mnemonic: "JXX".into(),
                line: 9
            })
        );
    }

    #[test]
    fn test_encode_a_instruction() {
        assert_eq!(encode_a_instruction(0), "0000000000000000");
        assert_eq!(encode_a_instruction(5), "0000000000000101");
        assert_eq!(encode_a_instruction(16384), "0100000000000000");
        assert_eq!(encode_a_instruction(32767), "0111111111111111");
    }

    #[test]
    fn test_omitted_fields_encode_to_zero_bits() {
        let word = encode_c_instruction("", "D", "", 1).unwrap();
        assert_eq!(&word[10..13], "000"); // dest bits 5-3
        assert_eq!(&word[13..], "000"); // jump bits 2-0
    }
}
