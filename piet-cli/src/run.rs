use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;
use color_eyre::eyre::eyre;
use isa::color::StandardPalette;
use isa::color::UnknownColorPolicy;
use tracing::info;
use tracing::warn;
use vm::console::Console;
use vm::prelude::*;

use crate::args::Args;

/// Read and parse the program named on the command line.
pub(crate) fn load_program(args: &Args) -> Result<Program> {
    let code = fs_err::read_to_string(&args.program)?;
    program_from_code(&code, args.codel_size, args.unknown_colors.into())
        .wrap_err_with(|| format!("invalid program `{}`", args.program.display()))
}

pub(crate) fn program_from_code(
    code: &str,
    codel_size: u32,
    unknown_colors: UnknownColorPolicy,
) -> Result<Program> {
    let bitmap = Bitmap::from_code(code).map_err(|err| eyre!("{err}"))?;
    let codel_size = usize::try_from(codel_size)?;
    let image = CodelImage::new(bitmap, codel_size)?;
    let palette = StandardPalette::new(unknown_colors);

    Ok(Program::new(image, palette))
}

/// Run the program until it terminates, or until the step limit is reached.
/// Returns the machine for inspection.
pub(crate) fn run<C: Console>(
    program: Program,
    console: C,
    max_steps: Option<u64>,
) -> (VirtualMachine<C>, Result<()>) {
    let mut vm = VirtualMachine::new(program, console);
    vm.start();

    let result = match max_steps {
        Some(max_steps) => vm.run_for(max_steps).map(drop),
        None => vm.run_to_completion(),
    };
    let result = result.map_err(Into::into);

    if vm.is_running() {
        warn!("step limit reached after {} steps", vm.step_count());
    } else {
        info!("finished after {} steps", vm.step_count());
    }

    (vm, result)
}

#[cfg(test)]
mod tests {
    use assert2::assert;
    use assert2::let_assert;
    use vm::console::BufferedConsole;

    use super::*;

    const PUSH_THEN_PRINT: &str = "
        FF0000 FF0000 FF0000 C00000 FFC0FF 000000
        000000 000000 000000 000000 FFFFFF 000000
        000000 000000 000000 0000C0 FFFFFF 000000
        000000 000000 000000 0000C0 0000C0 000000
    ";

    #[test]
    fn program_runs_to_completion() {
        let program = program_from_code(PUSH_THEN_PRINT, 1, UnknownColorPolicy::White).unwrap();
        let (vm, result) = run(program, BufferedConsole::new(), None);
        let_assert!(Ok(()) = result);
        assert!(vm.is_finished());
        assert!("3" == vm.console().output());
    }

    #[test]
    fn step_limit_keeps_machine_running() {
        let program = program_from_code(PUSH_THEN_PRINT, 1, UnknownColorPolicy::White).unwrap();
        let (vm, result) = run(program, BufferedConsole::new(), Some(2));
        let_assert!(Ok(()) = result);
        assert!(vm.is_running());
        assert!(2 == vm.step_count());
    }

    #[test]
    fn codels_can_span_multiple_pixels() {
        let code = "
            FF0000 FF0000 C00000 C00000
            FF0000 FF0000 C00000 C00000
        ";
        let program = program_from_code(code, 2, UnknownColorPolicy::White).unwrap();
        assert!(2 == program.width());
        assert!(1 == program.height());
    }

    #[test]
    fn codel_size_must_divide_image_dimensions() {
        let_assert!(Err(_) = program_from_code("FF0000 FF0000 FF0000", 2, UnknownColorPolicy::White));
    }

    #[test]
    fn unknown_colors_follow_the_policy() {
        let code = "123456";
        let program = program_from_code(code, 1, UnknownColorPolicy::Black).unwrap();
        assert!(program.is_blocked(Codel::new(0, 0)));

        let program = program_from_code(code, 1, UnknownColorPolicy::White).unwrap();
        assert!(program.is_white(Codel::new(0, 0)));
    }

    #[test]
    fn malformed_program_is_reported() {
        let_assert!(Err(err) = program_from_code("FF0000 nope", 1, UnknownColorPolicy::White));
        assert!(err.to_string().contains("RRGGBB"));
    }
}
