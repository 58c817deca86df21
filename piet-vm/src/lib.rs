// Allows the use of `#[coverage(off)]` on nightly toolchains, which excludes
// items from the coverage report. Stable toolchains ignore it.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! An interpreter for Piet, a stack-based programming language whose programs
//! are images.
//!
//! A program is a grid of codels, each with a color. Adjacent codels of the
//! same color form a block. The instruction pointer moves from block to block,
//! and the difference in hue and lightness between the block it leaves and the
//! block it enters determines the [`Instruction`] that is executed. The size of
//! the block that is left is the argument of `push`. Black codels and the
//! image's border stop the pointer, white codels let it slide through.
//!
//! # Example
//!
//! Programs can be written down as text, one row of codels per line, with
//! colors given in hexadecimal.
//!
//! ```
//! # use piet_vm::prelude::*;
//! let program = Program::from_code(
//!     "
//!     // push 3        out_number
//!     FF0000 FF0000 FF0000 C00000 FFC0FF 000000
//!     000000 000000 000000 000000 FFFFFF 000000
//!     000000 000000 000000 0000C0 FFFFFF 000000
//!     000000 000000 000000 0000C0 0000C0 000000
//!     ",
//! )
//! .unwrap();
//!
//! let mut vm = VirtualMachine::new(program, BufferedConsole::new());
//! vm.start();
//! vm.run_to_completion().unwrap();
//! assert_eq!("3", vm.console().output());
//! assert_eq!(4, vm.step_count());
//! ```
//!
//! # Customization
//!
//! The [`VirtualMachine`] is generic over
//! - the [`Console`](console::Console) it talks to,
//! - the [`PixelSource`](image::PixelSource) holding the image,
//! - the [`ColorClassifier`] deciding which raw color means what, and
//! - the [`BlockAnalyzer`](block::BlockAnalyzer) finding blocks and their exits.
//!
//! [`Instruction`]: isa::instruction::Instruction
//! [`ColorClassifier`]: isa::color::ColorClassifier

pub use isa;

pub mod block;
pub mod config;
pub mod console;
pub mod error;
pub mod image;
pub mod pointer;
pub mod program;
pub mod vm;

mod parser;

#[cfg(test)]
mod example_programs;

pub mod prelude {
    pub use isa::prelude::*;

    pub use crate::block::Block;
    pub use crate::block::BlockAnalyzer;
    pub use crate::block::FloodFill;
    pub use crate::console::BufferedConsole;
    pub use crate::console::Console;
    pub use crate::console::TerminalConsole;
    pub use crate::error::ExecutionError;
    pub use crate::error::VmError;
    pub use crate::image::Bitmap;
    pub use crate::image::CodelImage;
    pub use crate::image::PixelSource;
    pub use crate::pointer::Codel;
    pub use crate::pointer::Pointer;
    pub use crate::program::Program;
    pub use crate::program::ProgramId;
    pub use crate::vm::MachineSnapshot;
    pub use crate::vm::Resolution;
    pub use crate::vm::RunState;
    pub use crate::vm::VirtualMachine;
}
