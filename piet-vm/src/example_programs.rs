use lazy_static::lazy_static;

use crate::program::Program;

lazy_static! {
    pub static ref SINGLE_CODEL: Program = single_codel();
    pub static ref TWO_BLOCKS: Program = two_blocks();
    pub static ref PUSH_THEN_PRINT: Program = push_then_print();
    pub static ref ECHO_CHAR: Program = echo_char();
    pub static ref ECHO_NUMBER: Program = echo_number();
    pub static ref PUSH_POP_FOREVER: Program = push_pop_forever();
}

fn program(code: &str) -> Program {
    Program::from_code(code).unwrap()
}

fn single_codel() -> Program {
    program("FF0000")
}

/// Red, then dark red: a single `push 2`.
fn two_blocks() -> Program {
    program("FF0000 FF0000 C00000 C00000")
}

/// Pushes 3 and prints it as a number. Then slides down across the white
/// column into a dark blue block from which there is no escape.
fn push_then_print() -> Program {
    program(
        "
        // push 3        out_number
        FF0000 FF0000 FF0000 C00000 FFC0FF 000000
        000000 000000 000000 000000 FFFFFF 000000
        000000 000000 000000 0000C0 FFFFFF 000000
        000000 000000 000000 0000C0 0000C0 000000
        ",
    )
}

/// Reads a character and prints it.
fn echo_char() -> Program {
    program(
        "
        // in_char out_char
        FF0000 FF00FF C0C0FF 000000
        000000 000000 FFFFFF 000000
        000000 00FF00 FFFFFF 000000
        000000 00FF00 00FF00 000000
        ",
    )
}

/// Reads a number and prints it.
fn echo_number() -> Program {
    program(
        "
        // in_number out_number
        FF0000 C0C0FF 00FFFF 000000
        000000 000000 FFFFFF 000000
        000000 00FF00 FFFFFF 000000
        000000 00FF00 00FF00 000000
        ",
    )
}

/// Alternates between `push 1` and `pop`, never terminating.
fn push_pop_forever() -> Program {
    program("FF0000 C00000")
}
