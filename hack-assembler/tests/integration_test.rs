//! End-to-end assembly of small programs, checked against hand-assembled
//! machine code.

use hack_assembler::{assemble, AsmError};

#[test]
fn add_program() {
    let source = "\
// Computes R0 = 2 + 3
@2
D=A
@3
D=D+A
@0
M=D
";
    let words = assemble(source).unwrap();
    assert_eq!(
        words,
        vec![
            "0000000000000010",
            "1110110000010000",
            "0000000000000011",
            "1110000010010000",
            "0000000000000000",
            "1110001100001000",
        ]
    );
}

#[test]
fn max_program_with_labels_and_predefined_symbols() {
    let source = "\
// Computes R2 = max(R0, R1)
@R0
D=M
@R1
D=D-M
@OUTPUT_FIRST
D;JGT
@R1
D=M
@OUTPUT_D
0;JMP
(OUTPUT_FIRST)
@R0
D=M
(OUTPUT_D)
@R2
M=D
(INFINITE_LOOP)
@INFINITE_LOOP
0;JMP
";
    let words = assemble(source).unwrap();
    assert_eq!(words.len(), 16);
    // @OUTPUT_FIRST resolves to ROM 10, @OUTPUT_D to ROM 12
    assert_eq!(words[4], "0000000000001010");
    assert_eq!(words[8], "0000000000001100");
    // @INFINITE_LOOP resolves to ROM 14
    assert_eq!(words[14], "0000000000001110");
    // D;JGT
    assert_eq!(words[5], "1110001100000001");
}

#[test]
fn variables_and_labels_share_one_namespace() {
    let source = "\
@counter
M=1
(END)
@counter
M=0
@END
0;JMP
";
    let words = assemble(source).unwrap();
    // `counter` allocated at 16, END bound to ROM 2
    assert_eq!(words[0], "0000000000010000");
    assert_eq!(words[2], "0000000000010000");
    assert_eq!(words[4], "0000000000000010");
}

#[test]
fn screen_and_keyboard_addresses() {
    let words = assemble("@SCREEN\n@KBD\n").unwrap();
    assert_eq!(words[0], "0100000000000000");
    assert_eq!(words[1], "0110000000000000");
}

#[test]
fn unknown_comp_reports_its_line() {
    let err = assemble("@1\nD=Q+1\n").unwrap_err();
    assert_eq!(
        err,
        AsmError::UnknownComp {
            mnemonic: "Q+1".into(),
            line: 2
        }
    );
}

#[test]
fn first_error_aborts_without_partial_output() {
    let result = assemble("@1\nD=A\n@bad symbol!\nD=M\n");
    assert!(result.is_err());
}
