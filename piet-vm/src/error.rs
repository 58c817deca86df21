use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

use thiserror::Error;

pub use isa::error::InstructionError;
pub use isa::error::OpStackError;
pub use isa::error::ParseRgbError;

pub use crate::console::ConsoleError;
pub use crate::image::ImageError;
pub use crate::parser::ParseError;
use crate::vm::MachineSnapshot;
use crate::vm::RunState;

/// Indicates a fatal error that ended the execution of a program. The machine
/// is [finished](RunState::Finished) and only a
/// [reset](crate::vm::VirtualMachine::reset) makes it usable again.
#[derive(Debug, Error)]
pub struct VmError {
    /// The reason execution stopped.
    pub source: ExecutionError,

    /// The state of the machine at the time of the error.
    pub snapshot: Box<MachineSnapshot>,
}

impl VmError {
    pub fn new(source: ExecutionError, snapshot: MachineSnapshot) -> Self {
        let snapshot = Box::new(snapshot);
        Self { source, snapshot }
    }
}

impl Display for VmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "VM error: {}", self.source)?;
        writeln!(f, "VM state:")?;
        write!(f, "{}", self.snapshot)
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("impossible instruction: {0}")]
    InstructionIndex(#[from] InstructionError),

    #[error("cannot terminate a machine that is {0}")]
    TerminateWhileNotRunning(RunState),

    #[error(transparent)]
    Console(#[from] ConsoleError),
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;

    use crate::example_programs::SINGLE_CODEL;
    use crate::prelude::*;

    use super::*;

    #[test]
    fn vm_error_display_contains_reason_and_state() {
        let vm = VirtualMachine::new(SINGLE_CODEL.clone(), BufferedConsole::new());
        let source = ExecutionError::TerminateWhileNotRunning(RunState::Ready);
        let err = VmError::new(source, vm.snapshot());

        let display = err.to_string();
        assert!(display.contains("cannot terminate a machine that is ready"));
        assert!(display.contains("step count: 0"));
    }

    #[test]
    fn vm_error_exposes_its_source() {
        use std::error::Error;

        let source = ExecutionError::InstructionIndex(InstructionError::IndexOutOfRange(19));
        let vm = VirtualMachine::new(SINGLE_CODEL.clone(), BufferedConsole::new());
        let err = VmError::new(source, vm.snapshot());
        let_assert!(Some(source) = err.source());
        assert!(source.to_string().contains("19"));
    }
}
