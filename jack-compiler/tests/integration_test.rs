//! Whole-class compilations checked against hand-written VM code.

use jack_compiler::compile;

fn vm(source: &str) -> Vec<String> {
    compile(source).unwrap()
}

#[test]
fn if_else_lowering() {
    let source = "\
class Main {
    function void test(int x) {
        var int y;
        if (x > 0) { let y = 1; } else { let y = 2; }
        return;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.test 1",
            "push argument 0",
            "push constant 0",
            "gt",
            "if-goto IF_TRUE0",
            "goto IF_FALSE0",
            "label IF_TRUE0",
            "push constant 1",
            "pop local 0",
            "goto IF_END0",
            "label IF_FALSE0",
            "push constant 2",
            "pop local 0",
            "label IF_END0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn if_without_else_needs_no_end_label() {
    let source = "\
class Main {
    function int f(int x) {
        if (x > 0) {
            if (x > 1) { return 2; }
            return 1;
        }
        return 0;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.f 0",
            "push argument 0",
            "push constant 0",
            "gt",
            "if-goto IF_TRUE0",
            "goto IF_FALSE0",
            "label IF_TRUE0",
            "push argument 0",
            "push constant 1",
            "gt",
            "if-goto IF_TRUE1",
            "goto IF_FALSE1",
            "label IF_TRUE1",
            "push constant 2",
            "return",
            "label IF_FALSE1",
            "push constant 1",
            "return",
            "label IF_FALSE0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn while_lowering() {
    let source = "\
class Main {
    function int count(int n) {
        var int i;
        let i = 0;
        while (i < n) { let i = i + 1; }
        return i;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.count 1",
            "push constant 0",
            "pop local 0",
            "label WHILE_EXP0",
            "push local 0",
            "push argument 0",
            "lt",
            "not",
            "if-goto WHILE_END0",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "goto WHILE_EXP0",
            "label WHILE_END0",
            "push local 0",
            "return",
        ]
    );
}

#[test]
fn constructor_allocates_one_cell_per_field() {
    let source = "\
class Point {
    field int x, y;
    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        return this;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Point.new 0",
            "push constant 2",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn method_call_on_variable_pushes_receiver_first() {
    let source = "\
class Main {
    function int use(Point p) {
        return p.dist(1, 2);
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.use 0",
            "push argument 0",
            "push constant 1",
            "push constant 2",
            "call Point.dist 3",
            "return",
        ]
    );
}

#[test]
fn bare_call_is_a_method_call_on_this() {
    let source = "\
class Foo {
    method void bar(int n) { return; }
    method void run() { do bar(1); return; }
}
";
    let lines = vm(source);
    let start = lines
        .iter()
        .position(|l| l == "function Foo.run 0")
        .unwrap();
    assert_eq!(
        lines[start..],
        [
            "function Foo.run 0",
            "push argument 0",
            "pop pointer 0",
            "push pointer 0",
            "push constant 1",
            "call Foo.bar 2",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn method_parameters_follow_the_receiver() {
    // Inside a method, user parameters start at argument 1.
    let source = "\
class Foo {
    method int add(int n) { return n; }
}
";
    assert_eq!(
        vm(source),
        [
            "function Foo.add 0",
            "push argument 0",
            "pop pointer 0",
            "push argument 1",
            "return",
        ]
    );
}

#[test]
fn fields_and_statics_in_methods() {
    let source = "\
class Counter {
    static int total;
    field int mine;
    method void bump() {
        let mine = mine + 1;
        let total = total + 1;
        return;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Counter.bump 0",
            "push argument 0",
            "pop pointer 0",
            "push this 0",
            "push constant 1",
            "add",
            "pop this 0",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn array_read_and_write() {
    let source = "\
class Main {
    function void fill(Array a, int i) {
        let a[i] = a[i + 1];
        return;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.fill 0",
            "push argument 1",
            "push argument 0",
            "add",
            "push argument 1",
            "push constant 1",
            "add",
            "push argument 0",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn string_constant_builds_via_os_calls() {
    let source = "\
class Main {
    function String greet() {
        return \"Hi\";
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.greet 0",
            "push constant 2",
            "call String.new 1",
            "push constant 72",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "return",
        ]
    );
}

#[test]
fn multiplication_becomes_an_os_call() {
    let source = "\
class Main {
    function int f(int a, int b) {
        return (a * b) / 2;
    }
}
";
    assert_eq!(
        vm(source),
        [
            "function Main.f 0",
            "push argument 0",
            "push argument 1",
            "call Math.multiply 2",
            "push constant 2",
            "call Math.divide 2",
            "return",
        ]
    );
}

#[test]
fn label_counters_reset_per_subroutine() {
    let source = "\
class Main {
    function void a(int x) {
        if (x = 0) { return; }
        return;
    }
    function void b(int x) {
        if (x = 0) { return; }
        return;
    }
}
";
    let lines = vm(source);
    assert_eq!(
        lines
            .iter()
            .filter(|l| l.as_str() == "label IF_TRUE0")
            .count(),
        2
    );
}
