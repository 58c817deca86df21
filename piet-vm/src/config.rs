use std::cell::RefCell;

use arbitrary::Arbitrary;

/// The environment variable that makes newly created machines verbose if set
/// to `1` or `true`.
pub const VERBOSE_ENV: &str = "PIET_VERBOSE";

thread_local! {
    pub(crate) static CONFIG: RefCell<Config> = RefCell::new(Config::default());
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Arbitrary)]
struct Config {
    /// Whether newly created [virtual machines](crate::vm::VirtualMachine)
    /// report every step at `info` level. Taken from the environment variable
    /// [`PIET_VERBOSE`](VERBOSE_ENV) unless overwritten.
    pub verbose: bool,
}

impl Config {
    pub fn new() -> Self {
        let maybe_verbose = std::env::var(VERBOSE_ENV).map(|s| s.to_ascii_lowercase());
        let verbose = matches!(maybe_verbose.as_deref(), Ok("1" | "true"));

        Self { verbose }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Overwrite the initial verbosity of [virtual machines](crate::vm::VirtualMachine)
/// created on this thread from now on. Takes precedence over the environment
/// variable [`PIET_VERBOSE`](VERBOSE_ENV).
///
/// The verbosity of an existing machine can be changed with
/// [`set_verbosity`](crate::vm::VirtualMachine::set_verbosity).
pub fn overwrite_verbosity(verbose: bool) {
    CONFIG.with_borrow_mut(|config| config.verbose = verbose);
}

/// The verbosity newly created virtual machines start with.
pub(crate) fn verbose() -> bool {
    CONFIG.with_borrow(|config| config.verbose)
}
