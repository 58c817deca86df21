use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use arbitrary::Arbitrary;
use isa::color::ColorClassifier;
use isa::color::StandardPalette;
use isa::instruction::Instruction;
use isa::op_stack::OpStack;
use isa::op_stack::OpStackError;
use isa::orientation::CodelChooser;
use isa::orientation::Direction;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::block::BlockAnalyzer;
use crate::block::FloodFill;
use crate::config;
use crate::console::Console;
use crate::console::ConsoleError;
use crate::error::ExecutionError;
use crate::error::VmError;
use crate::image::CodelImage;
use crate::image::PixelSource;
use crate::pointer::Codel;
use crate::pointer::Pointer;
use crate::program::Program;

type Result<T> = std::result::Result<T, VmError>;

/// The number of orientations the instruction pointer can have: 4 directions
/// times 2 codel choices. If the pointer cannot leave its block in any of
/// them, the program ends.
pub const MAX_ATTEMPTS: usize = 8;

/// The life cycle of a [`VirtualMachine`].
///
/// ```text
/// Ready ──start──▶ Running ──stop / terminate──▶ Finished
///   ▲                                               │
///   └────────────────────reset──────────────────────┘
/// ```
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Arbitrary,
)]
pub enum RunState {
    #[default]
    Ready,
    Running,
    Finished,
}

/// The outcome of trying to move the instruction pointer out of its block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Resolution {
    /// All [`MAX_ATTEMPTS`] orientations are blocked.
    Terminate,

    /// The pointer slid across a white block. No instruction is executed.
    Slid,

    /// The pointer moved into an adjacent block, decoding the instruction.
    Moved(Instruction),
}

/// The state of a [`VirtualMachine`] at one point in time. Used for
/// diagnostics.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub state: RunState,
    pub step_count: u64,
    pub pointer: Pointer,

    /// The operational stack, bottom element first.
    pub stack: Vec<i64>,

    pub last_instruction: Option<Instruction>,
}

/// The Piet interpreter.
///
/// A machine executes one [`Program`], talking to the outside world through a
/// [`Console`]. Blocks are analyzed by a [`BlockAnalyzer`], which is a
/// [`FloodFill`] unless specified otherwise.
///
/// Execution has to be [started](Self::start) explicitly. Afterwards, the
/// program can be run [step by step](Self::execute_single_step),
/// [for a bounded number of steps](Self::run_for), or
/// [to completion](Self::run_to_completion).
///
/// ```
/// # use piet_vm::prelude::*;
/// let program = Program::from_code(
///     "FF0000 FF0000 FF0000 C00000 FFC0FF 000000
///      000000 000000 000000 000000 FFFFFF 000000
///      000000 000000 000000 0000C0 FFFFFF 000000
///      000000 000000 000000 0000C0 0000C0 000000",
/// )
/// .unwrap();
/// let mut vm = VirtualMachine::new(program, BufferedConsole::new());
/// vm.start();
/// vm.run_to_completion().unwrap();
/// assert!(vm.is_finished());
/// assert_eq!("3", vm.console().output());
/// ```
#[derive(Debug, Clone)]
pub struct VirtualMachine<C, S = CodelImage, K = StandardPalette, B = FloodFill> {
    program: Program<S, K>,
    console: C,
    analyzer: B,

    pointer: Pointer,
    stack: OpStack,
    state: RunState,

    /// The number of steps executed since the last reset.
    step_count: u64,

    /// The instruction resolved in the most recent step.
    last_instruction: Option<Instruction>,

    verbose: bool,
}

impl Resolution {
    /// The instruction to execute for this outcome.
    pub fn instruction(self) -> Instruction {
        match self {
            Resolution::Terminate => Instruction::Terminate,
            Resolution::Slid => Instruction::Empty,
            Resolution::Moved(instruction) => instruction,
        }
    }
}

impl<C, S, K> VirtualMachine<C, S, K, FloodFill>
where
    C: Console,
    S: PixelSource,
    K: ColorClassifier,
{
    pub fn new(program: Program<S, K>, console: C) -> Self {
        Self::with_analyzer(program, console, FloodFill::new())
    }
}

impl<C, S, K, B> VirtualMachine<C, S, K, B>
where
    C: Console,
    S: PixelSource,
    K: ColorClassifier,
    B: BlockAnalyzer,
{
    pub fn with_analyzer(program: Program<S, K>, console: C, analyzer: B) -> Self {
        Self {
            program,
            console,
            analyzer,
            pointer: Pointer::new(),
            stack: OpStack::new(),
            state: RunState::Ready,
            step_count: 0,
            last_instruction: None,
            verbose: config::verbose(),
        }
    }

    /// Start execution. Only possible if the machine is ready.
    pub fn start(&mut self) -> bool {
        if !self.is_ready() {
            debug!("refusing to start: machine is {}", self.state);
            return false;
        }
        self.state = RunState::Running;
        true
    }

    /// Stop execution. Only possible if the machine is running.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            debug!("refusing to stop: machine is {}", self.state);
            return false;
        }
        self.state = RunState::Finished;
        true
    }

    /// Return to the initial state: empty stack, initial pointer, no steps
    /// taken, ready to be started. Always succeeds.
    pub fn reset(&mut self) -> bool {
        self.stack.clear();
        self.pointer.clear();
        self.state = RunState::Ready;
        self.step_count = 0;
        self.last_instruction = None;
        true
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RunState::Ready
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// In verbose mode, every step is reported at `info` level. Otherwise,
    /// the same reports are emitted at `trace` level.
    pub fn set_verbosity(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn toggle_verbosity(&mut self) {
        self.verbose = !self.verbose;
    }

    pub fn program(&self) -> &Program<S, K> {
        &self.program
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_console(self) -> C {
        self.console
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn codel(&self) -> Codel {
        self.pointer.codel
    }

    pub fn dp(&self) -> Direction {
        self.pointer.dp
    }

    pub fn cc(&self) -> CodelChooser {
        self.pointer.cc
    }

    pub fn stack(&self) -> &OpStack {
        &self.stack
    }

    /// The operational stack, bottom element first.
    pub fn stack_snapshot(&self) -> Vec<i64> {
        self.stack.snapshot()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instruction
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            state: self.state,
            step_count: self.step_count,
            pointer: self.pointer,
            stack: self.stack.snapshot(),
            last_instruction: self.last_instruction,
        }
    }

    /// Execute steps until the machine is no longer running.
    ///
    /// Does not return if the program never terminates. Use
    /// [`run_for`](Self::run_for) to keep control over such programs.
    pub fn run_to_completion(&mut self) -> Result<()> {
        while self.is_running() {
            self.execute_single_step()?;
        }
        Ok(())
    }

    /// Execute at most `max_steps` steps, stopping early if the machine is no
    /// longer running. Returns the number of steps executed.
    pub fn run_for(&mut self, max_steps: u64) -> Result<u64> {
        let mut num_steps = 0;
        while self.is_running() && num_steps < max_steps {
            self.execute_single_step()?;
            num_steps += 1;
        }
        Ok(num_steps)
    }

    /// Move the instruction pointer to the next block and execute the
    /// instruction encoded by the move.
    ///
    /// Returns whether an instruction was actually carried out. This is not
    /// the case if the machine is not running, if the pointer slid across a
    /// white block, or if the instruction was skipped, for example, because
    /// the stack is too shallow.
    ///
    /// A returned error is fatal: the machine is finished afterwards.
    pub fn execute_single_step(&mut self) -> Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }

        self.report_state();
        let outcome = self.step();
        self.step_count += 1;

        outcome.map_err(|source| {
            self.state = RunState::Finished;
            VmError::new(source, self.snapshot())
        })
    }

    fn step(&mut self) -> std::result::Result<bool, ExecutionError> {
        let block_size = self
            .analyzer
            .block_size(&self.program, self.pointer.codel);
        let resolution = self.resolve_next_instruction()?;
        let instruction = resolution.instruction();
        self.last_instruction = Some(instruction);
        self.report_instruction(instruction);

        self.dispatch(instruction, block_size)
    }

    /// Move the instruction pointer out of its current block.
    ///
    /// The candidate codel provided by the [`BlockAnalyzer`] is blocked if it
    /// lies outside the image or is black. A white candidate is followed in
    /// the direction of the direction pointer until a non-white codel is
    /// reached, which is then checked for being blocked. If the candidate is
    /// blocked, the codel chooser is toggled on odd attempts, the direction
    /// pointer is rotated on even attempts, and a new candidate is determined.
    /// Changes to the orientation persist, even if the pointer cannot leave
    /// its block at all.
    fn resolve_next_instruction(&mut self) -> std::result::Result<Resolution, ExecutionError> {
        let origin = self.pointer.codel;
        for attempt in 1..=MAX_ATTEMPTS {
            let Pointer { dp, cc, .. } = self.pointer;
            let candidate = self.analyzer.candidate_exit(&self.program, origin, dp, cc);
            let (destination, slid) = self.slide_across_white(candidate);

            if !self.program.is_blocked(destination) {
                self.pointer.move_to(destination);
                if slid {
                    return Ok(Resolution::Slid);
                }
                let instruction = self.decode(origin, destination)?;
                return Ok(Resolution::Moved(instruction));
            }

            trace!("attempt {attempt}: {destination} is blocked for DP {dp}, CC {cc}");
            if attempt % 2 == 1 {
                self.pointer.toggle_cc();
            } else {
                self.pointer.rotate_dp();
            }
        }

        Ok(Resolution::Terminate)
    }

    /// If `candidate` is white, follow the direction pointer until the first
    /// codel that is not white. Returns the reached codel and whether any
    /// sliding happened.
    fn slide_across_white(&self, candidate: Codel) -> (Codel, bool) {
        if !self.program.is_white(candidate) {
            return (candidate, false);
        }

        let mut codel = candidate;
        while self.program.is_white(codel) {
            codel = codel.step(self.pointer.dp);
        }
        (codel, true)
    }

    /// The instruction encoded by the color change from codel `from` to codel
    /// `to`. Moving from or to a codel that is black or white encodes no
    /// instruction.
    fn decode(&self, from: Codel, to: Codel) -> std::result::Result<Instruction, ExecutionError> {
        let Some(index) = self.program.instruction_index(from, to) else {
            return Ok(Instruction::Empty);
        };
        Ok(Instruction::from_index(index)?)
    }

    fn dispatch(
        &mut self,
        instruction: Instruction,
        block_size: usize,
    ) -> std::result::Result<bool, ExecutionError> {
        if !self.stack.has_at_least(instruction.min_stack_depth()) {
            debug!("skipping `{instruction}`: stack is too shallow");
            return Ok(false);
        }

        let carried_out = match instruction {
            Instruction::Empty => false,
            Instruction::Push => {
                // image dimensions fit into i32, so their product fits into i64
                let block_size = i64::try_from(block_size).unwrap_or(i64::MAX);
                self.stack.push(block_size);
                true
            }
            Instruction::Pop => self.stack_operation(instruction, |stack| stack.pop().map(drop)),
            Instruction::Add => self.stack_operation(instruction, OpStack::add),
            Instruction::Subtract => self.stack_operation(instruction, OpStack::subtract),
            Instruction::Multiply => self.stack_operation(instruction, OpStack::multiply),
            Instruction::Divide => self.stack_operation(instruction, OpStack::divide),
            Instruction::Modulo => self.stack_operation(instruction, OpStack::modulo),
            Instruction::Not => self.stack_operation(instruction, OpStack::not),
            Instruction::Greater => self.stack_operation(instruction, OpStack::greater),
            Instruction::Pointer => self.pointer_instruction(),
            Instruction::Switch => self.switch(),
            Instruction::Duplicate => self.stack_operation(instruction, OpStack::duplicate),
            Instruction::Roll => self.stack_operation(instruction, OpStack::roll),
            Instruction::InputNumber => {
                let maybe_number = self.console.request_number()?;
                self.push_input(instruction, maybe_number)
            }
            Instruction::InputChar => {
                let maybe_char = self.console.request_char()?;
                self.push_input(instruction, maybe_char)
            }
            Instruction::OutputNumber => self.output_number()?,
            Instruction::OutputChar => self.output_char()?,
            Instruction::Terminate => self.terminate()?,
        };

        Ok(carried_out)
    }

    fn stack_operation<F>(&mut self, instruction: Instruction, operation: F) -> bool
    where
        F: FnOnce(&mut OpStack) -> std::result::Result<(), OpStackError>,
    {
        match operation(&mut self.stack) {
            Ok(()) => true,
            Err(err) => {
                debug!("skipping `{instruction}`: {err}");
                false
            }
        }
    }

    fn pointer_instruction(&mut self) -> bool {
        let Ok(num_rotations) = self.stack.pop() else {
            return false;
        };
        self.pointer.rotate_dp_by(num_rotations);
        true
    }

    fn switch(&mut self) -> bool {
        let Ok(num_toggles) = self.stack.pop() else {
            return false;
        };
        if num_toggles % 2 != 0 {
            self.pointer.toggle_cc();
        }
        true
    }

    fn push_input(&mut self, instruction: Instruction, maybe_input: Option<i64>) -> bool {
        let Some(input) = maybe_input else {
            debug!("skipping `{instruction}`: no more input");
            return false;
        };
        self.stack.push(input);
        true
    }

    fn output_number(&mut self) -> std::result::Result<bool, ExecutionError> {
        let Ok(number) = self.stack.pop() else {
            return Ok(false);
        };
        self.console.emit_number(number)?;
        Ok(true)
    }

    fn output_char(&mut self) -> std::result::Result<bool, ExecutionError> {
        let Ok(code_point) = self.stack.pop() else {
            return Ok(false);
        };
        match self.console.emit_char(code_point) {
            Ok(()) => Ok(true),
            Err(ConsoleError::InvalidCodePoint(_)) => {
                warn!("skipping `out_char`: {code_point} is not a Unicode scalar value");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn terminate(&mut self) -> std::result::Result<bool, ExecutionError> {
        if !self.stop() {
            return Err(ExecutionError::TerminateWhileNotRunning(self.state));
        }
        debug!("program terminated after {} steps", self.step_count + 1);
        Ok(true)
    }

    fn report_state(&self) {
        let step = self.step_count;
        let pointer = &self.pointer;
        let stack = &self.stack;
        if self.verbose {
            info!(step, %pointer, %stack);
        } else {
            trace!(step, %pointer, %stack);
        }
    }

    fn report_instruction(&self, instruction: Instruction) {
        let step = self.step_count;
        let codel = self.pointer.codel;
        if self.verbose {
            info!(step, %codel, "instruction: {instruction}");
        } else {
            trace!(step, %codel, "instruction: {instruction}");
        }
    }
}

impl Display for RunState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let state = match self {
            RunState::Ready => "ready",
            RunState::Running => "running",
            RunState::Finished => "finished",
        };
        write!(f, "{state}")
    }
}

impl Display for MachineSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let stack = OpStack::from(self.stack.clone());
        let last_instruction = self
            .last_instruction
            .map_or_else(|| "-".to_string(), |instruction| instruction.to_string());

        writeln!(f, "state: {}", self.state)?;
        writeln!(f, "step count: {}", self.step_count)?;
        writeln!(f, "pointer: {}", self.pointer)?;
        writeln!(f, "stack: {stack}")?;
        writeln!(f, "last instruction: {last_instruction}")
    }
}
