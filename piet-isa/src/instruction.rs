use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::result;

use arbitrary::Arbitrary;
use serde::Deserialize;
use serde::Serialize;
use strum::EnumCount;
use strum::EnumIter;
use thiserror::Error;

type Result<T> = result::Result<T, InstructionError>;

/// All instructions, ordered by their [index](Instruction::index). The position
/// of an instruction in this table _is_ its index, which makes the mapping from
/// color transitions to instructions a plain lookup.
pub const ALL_INSTRUCTIONS: [Instruction; Instruction::COUNT] = [
    Instruction::Empty,
    Instruction::Push,
    Instruction::Pop,
    Instruction::Add,
    Instruction::Subtract,
    Instruction::Multiply,
    Instruction::Divide,
    Instruction::Modulo,
    Instruction::Not,
    Instruction::Greater,
    Instruction::Pointer,
    Instruction::Switch,
    Instruction::Duplicate,
    Instruction::Roll,
    Instruction::InputNumber,
    Instruction::InputChar,
    Instruction::OutputNumber,
    Instruction::OutputChar,
    Instruction::Terminate,
];

pub const ALL_INSTRUCTION_NAMES: [&str; Instruction::COUNT] = {
    let mut names = [""; Instruction::COUNT];
    let mut i = 0;
    while i < Instruction::COUNT {
        names[i] = ALL_INSTRUCTIONS[i].name();
        i += 1;
    }
    names
};

/// A Piet instruction.
///
/// Instructions are never stored in a program. They are derived afresh in
/// every step from the colors of the block the instruction pointer leaves and
/// the block it enters. [`Empty`](Instruction::Empty) results from sliding
/// across a white block, [`Terminate`](Instruction::Terminate) from the
/// instruction pointer being unable to leave its block at all.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    EnumCount,
    EnumIter,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum Instruction {
    // Special
    Empty,

    // Stack manipulation
    Push,
    Pop,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Logic
    Not,
    Greater,

    // Runtime, i.e., orientation of the instruction pointer
    Pointer,
    Switch,

    // Stack manipulation
    Duplicate,
    Roll,

    // Input / Output
    InputNumber,
    InputChar,
    OutputNumber,
    OutputChar,

    // Special
    Terminate,
}

#[non_exhaustive]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum InstructionError {
    #[error("instruction index {0} is out of range (0..={max})", max = Instruction::COUNT - 1)]
    IndexOutOfRange(u8),
}

impl Instruction {
    /// Look up the instruction with the given index in the fixed instruction
    /// table.
    pub fn from_index(index: u8) -> Result<Self> {
        ALL_INSTRUCTIONS
            .get(usize::from(index))
            .copied()
            .ok_or(InstructionError::IndexOutOfRange(index))
    }

    /// The position of the instruction in the fixed instruction table.
    /// Inverse of [`from_index`](Self::from_index).
    pub const fn index(self) -> u8 {
        match self {
            Instruction::Empty => 0,
            Instruction::Push => 1,
            Instruction::Pop => 2,
            Instruction::Add => 3,
            Instruction::Subtract => 4,
            Instruction::Multiply => 5,
            Instruction::Divide => 6,
            Instruction::Modulo => 7,
            Instruction::Not => 8,
            Instruction::Greater => 9,
            Instruction::Pointer => 10,
            Instruction::Switch => 11,
            Instruction::Duplicate => 12,
            Instruction::Roll => 13,
            Instruction::InputNumber => 14,
            Instruction::InputChar => 15,
            Instruction::OutputNumber => 16,
            Instruction::OutputChar => 17,
            Instruction::Terminate => 18,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Instruction::Empty => "empty",
            Instruction::Push => "push",
            Instruction::Pop => "pop",
            Instruction::Add => "add",
            Instruction::Subtract => "subtract",
            Instruction::Multiply => "multiply",
            Instruction::Divide => "divide",
            Instruction::Modulo => "mod",
            Instruction::Not => "not",
            Instruction::Greater => "greater",
            Instruction::Pointer => "pointer",
            Instruction::Switch => "switch",
            Instruction::Duplicate => "duplicate",
            Instruction::Roll => "roll",
            Instruction::InputNumber => "in_number",
            Instruction::InputChar => "in_char",
            Instruction::OutputNumber => "out_number",
            Instruction::OutputChar => "out_char",
            Instruction::Terminate => "terminate",
        }
    }

    /// The number of stack elements that must be present for the instruction
    /// to be carried out. If the stack is shallower, the instruction is
    /// skipped.
    pub const fn min_stack_depth(self) -> usize {
        match self {
            Instruction::Empty => 0,
            Instruction::Push => 0,
            Instruction::Pop => 1,
            Instruction::Add => 2,
            Instruction::Subtract => 2,
            Instruction::Multiply => 2,
            Instruction::Divide => 2,
            Instruction::Modulo => 2,
            Instruction::Not => 1,
            Instruction::Greater => 2,
            Instruction::Pointer => 1,
            Instruction::Switch => 1,
            Instruction::Duplicate => 1,
            Instruction::Roll => 2,
            Instruction::InputNumber => 0,
            Instruction::InputChar => 0,
            Instruction::OutputNumber => 1,
            Instruction::OutputChar => 1,
            Instruction::Terminate => 0,
        }
    }

    /// The change in stack height if the instruction is carried out
    /// successfully.
    pub const fn op_stack_size_influence(self) -> i32 {
        match self {
            Instruction::Empty => 0,
            Instruction::Push => 1,
            Instruction::Pop => -1,
            Instruction::Add => -1,
            Instruction::Subtract => -1,
            Instruction::Multiply => -1,
            Instruction::Divide => -1,
            Instruction::Modulo => -1,
            Instruction::Not => 0,
            Instruction::Greater => -1,
            Instruction::Pointer => -1,
            Instruction::Switch => -1,
            Instruction::Duplicate => 1,
            Instruction::Roll => -2,
            Instruction::InputNumber => 1,
            Instruction::InputChar => 1,
            Instruction::OutputNumber => -1,
            Instruction::OutputChar => -1,
            Instruction::Terminate => 0,
        }
    }

    /// Indicates whether the instruction talks to the console.
    pub fn is_io_instruction(self) -> bool {
        matches!(
            self,
            Instruction::InputNumber
                | Instruction::InputChar
                | Instruction::OutputNumber
                | Instruction::OutputChar
        )
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for Instruction {
    type Error = InstructionError;

    fn try_from(index: u8) -> Result<Self> {
        Instruction::from_index(index)
    }
}

impl From<Instruction> for u8 {
    fn from(instruction: Instruction) -> Self {
        instruction.index()
    }
}
