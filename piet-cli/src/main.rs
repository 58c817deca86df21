//! Run Piet programs from the command line.
//!
//! The program reads from standard input and writes to standard output. Logs,
//! errors, and the optional final machine state go to standard error.

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vm::config;
use vm::console::TerminalConsole;

use args::Args;
use args::LOG_ENV;

pub(crate) mod args;
#[cfg(test)]
pub(crate) mod args_tests;
pub(crate) mod run;

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.verbose)?;
    initialize_panic_handler()?;

    config::overwrite_verbosity(args.verbose);
    let program = run::load_program(&args)?;
    let (vm, execution_result) = run::run(program, TerminalConsole::stdio(), args.max_steps);

    if args.print_state {
        eprintln!("{}", vm.snapshot());
    }
    execution_result
}

/// Log to standard error. The filter is taken from `RUST_LOG`, or else from
/// `PIET_LOGLEVEL`. Without either, only warnings are shown, or step reports
/// if running verbosely.
fn initialize_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "piet=info" } else { "piet=warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV.as_str()))
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);
    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .try_init()?;
    Ok(())
}

fn initialize_panic_handler() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .install()
}
