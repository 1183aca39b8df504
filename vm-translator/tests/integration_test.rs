//! End-to-end translation checks over in-memory programs: stack discipline
//! of the emitted sequences, call/return framing, per-file static scoping,
//! and label uniqueness across a multi-file program.

use vm_translator::{translate_file, CodeWriter, TranslateError};

/// Translates the given (file_name, source) pairs as one program, with
/// bootstrap, and returns the emitted instructions (comments stripped).
fn translate_program(files: &[(&str, &str)]) -> Vec<String> {
    let mut writer = CodeWriter::new(Vec::new());
    writer.write_bootstrap().unwrap();
    let mut buffer = writer;
    for (name, source) in files {
        translate_file(source, name, &mut buffer).unwrap();
    }
    instructions(buffer)
}

fn translate_single(name: &str, source: &str) -> Vec<String> {
    let mut writer = CodeWriter::new(Vec::new());
    translate_file(source, name, &mut writer).unwrap();
    instructions(writer)
}

fn instructions(writer: CodeWriter<Vec<u8>>) -> Vec<String> {
    String::from_utf8(writer.into_inner())
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with("//"))
        .map(str::to_string)
        .collect()
}

#[test]
fn simple_add_program() {
    let asm = translate_single("Add", "push constant 3\npush constant 5\nadd\n");
    assert_eq!(
        asm,
        [
            "@3", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1", // push constant 3
            "@5", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1", // push constant 5
            "@SP", "AM=M-1", "D=M", "@SP", "AM=M-1", "D=D+M", // pop y, pop x, x+y
            "@SP", "A=M", "M=D", "@SP", "M=M+1", // push result
        ]
    );
}

#[test]
fn single_file_has_no_bootstrap() {
    let asm = translate_single("Test", "push constant 1\n");
    assert_ne!(asm[0], "@256");
}

#[test]
fn bootstrap_sets_sp_and_calls_sys_init() {
    let asm = translate_program(&[("Main", "function Main.main 0\nreturn\n")]);
    assert_eq!(asm[..4], ["@256", "D=A", "@SP", "M=D"]);
    assert!(asm.contains(&"@Sys.init".to_string()));
    // call Sys.init 0: ARG = SP - 0 - 5
    assert!(asm.contains(&"@5".to_string()));
}

#[test]
fn static_segments_of_different_files_stay_apart() {
    let asm = translate_program(&[
        ("A", "push static 0\npop static 1\n"),
        ("B", "push static 0\n"),
    ]);
    assert!(asm.contains(&"@A.0".to_string()));
    assert!(asm.contains(&"@A.1".to_string()));
    assert!(asm.contains(&"@B.0".to_string()));
}

#[test]
fn comparison_labels_never_collide_across_files() {
    let asm = translate_program(&[("A", "eq\nlt\n"), ("B", "gt\neq\n")]);
    let mut labels: Vec<&String> = asm
        .iter()
        .filter(|line| line.starts_with("(TRUE") || line.starts_with("(TFEND"))
        .collect();
    let before = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(before, labels.len(), "duplicate comparison label emitted");
    assert_eq!(before, 8); // 4 comparisons, 2 labels each
}

#[test]
fn function_call_and_return_frame() {
    let source = "\
function Sys.init 0
push constant 4
call Main.double 1
label HALT
goto HALT
function Main.double 1
push argument 0
push argument 0
add
pop local 0
push local 0
return
";
    let asm = translate_single("Sys", source);

    // Call site: return label pushed first, then LCL/ARG/THIS/THAT
    let ret_push = asm.iter().position(|l| l == "@RET0").unwrap();
    let lcl_save = asm.iter().position(|l| l == "@LCL").unwrap();
    assert!(ret_push < lcl_save);

    // ARG = SP - 1 - 5
    assert!(asm.contains(&"@6".to_string()));

    // The return label is emitted right after the jump to the callee
    let jump = asm.iter().position(|l| l == "@Main.double").unwrap();
    assert_eq!(asm[jump + 1], "0;JMP");
    assert_eq!(asm[jump + 2], "(RET0)");

    // Return: frame scratch then restores in THAT/THIS/ARG/LCL order
    let restores: Vec<usize> = ["@THAT", "@THIS"]
        .iter()
        .map(|s| asm.iter().rposition(|l| l == *s).unwrap())
        .collect();
    assert!(restores[0] < restores[1]);
}

#[test]
fn goto_and_if_goto() {
    let asm = translate_single("Test", "label LOOP\npush constant 1\nif-goto LOOP\ngoto LOOP\n");
    assert_eq!(asm[0], "(LOOP)");
    // if-goto pops before branching on non-zero
    let jne = asm.iter().position(|l| l == "D;JNE").unwrap();
    assert_eq!(asm[jne - 1], "@LOOP");
    assert_eq!(asm[jne - 2], "D=M");
    assert_eq!(asm[asm.len() - 2..], ["@LOOP", "0;JMP"]);
}

#[test]
fn errors_carry_line_numbers() {
    let mut writer = CodeWriter::new(Vec::new());
    let err = translate_file("push constant 1\nbogus\n", "Test", &mut writer).unwrap_err();
    assert!(matches!(
        err,
        TranslateError::UnknownCommand { line: 2, .. }
    ));
}
