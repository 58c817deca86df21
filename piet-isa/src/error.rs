pub use crate::color::ParseRgbError;
pub use crate::instruction::InstructionError;
pub use crate::op_stack::OpStackError;
