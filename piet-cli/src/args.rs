use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use clap::value_parser;
use isa::color::UnknownColorPolicy;
use lazy_static::lazy_static;

lazy_static! {
    pub(crate) static ref PROJECT_NAME: String = String::from("PIET");
    pub(crate) static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
}

pub(crate) const DEFAULT_CODEL_SIZE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(author, version, about)]
pub(crate) struct Args {
    /// File containing the program image as text: one row of codels per line,
    /// each codel a color of the form `RRGGBB` or `#RRGGBB`
    pub program: PathBuf,

    /// The edge length of a codel, in pixels
    #[arg(
        long,
        value_name = "u32",
        default_value_t = DEFAULT_CODEL_SIZE,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub codel_size: u32,

    /// Stop after this many steps, even if the program has not terminated
    #[arg(long, value_name = "u64")]
    pub max_steps: Option<u64>,

    /// How to treat colors that are not part of the palette
    #[arg(long, value_enum, default_value_t = UnknownColors::White)]
    pub unknown_colors: UnknownColors,

    /// Report every step
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the state of the machine to standard error once execution stops
    #[arg(long)]
    pub print_state: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub(crate) enum UnknownColors {
    White,
    Black,
}

impl From<UnknownColors> for UnknownColorPolicy {
    fn from(unknown_colors: UnknownColors) -> Self {
        match unknown_colors {
            UnknownColors::White => UnknownColorPolicy::White,
            UnknownColors::Black => UnknownColorPolicy::Black,
        }
    }
}
