// See the corresponding attribute in piet_vm/lib.rs
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The instruction set of Piet, a stack-based language whose programs are
//! images. Control flow moves across blocks of same-colored codels, and the
//! hue and lightness change between two adjacent blocks selects the
//! [`Instruction`](instruction::Instruction) that is executed.
//!
//! This crate holds everything that is defined by the language itself and
//! independent of how an image is stored or how a machine is driven:
//!
//! - the [colors](color) and their classification,
//! - the [instructions](instruction) and the fixed index table,
//! - the [orientation](orientation) of the instruction pointer, and
//! - the [operational stack](op_stack) with its arithmetic primitives.

pub mod color;
pub mod error;
pub mod instruction;
pub mod op_stack;
pub mod orientation;

pub mod prelude {
    pub use crate::color::Color;
    pub use crate::color::ColorClassifier;
    pub use crate::color::Hue;
    pub use crate::color::Lightness;
    pub use crate::color::Rgb;
    pub use crate::color::StandardPalette;
    pub use crate::color::UnknownColorPolicy;
    pub use crate::instruction::Instruction;
    pub use crate::op_stack::OpStack;
    pub use crate::orientation::CodelChooser;
    pub use crate::orientation::Direction;
}
