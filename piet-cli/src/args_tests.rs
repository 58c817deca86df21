//! Tests for the command line arguments.

use std::path::PathBuf;

use assert2::assert;
use assert2::let_assert;
use clap::Parser;

use crate::args::*;

fn binary_name() -> Vec<String> {
    vec!["piet".into()]
}

fn cli_arg_help() -> Vec<String> {
    vec!["--help".into()]
}

fn cli_arg_program() -> Vec<String> {
    vec!["hello_world.txt".into()]
}

fn cli_arg_codel_size(size: &str) -> Vec<String> {
    vec!["--codel-size".into(), size.into()]
}

fn cli_arg_max_steps() -> Vec<String> {
    vec!["--max-steps".into(), "1000".into()]
}

fn cli_arg_unknown_colors(policy: &str) -> Vec<String> {
    vec!["--unknown-colors".into(), policy.into()]
}

#[test]
fn cli_requires_some_arguments() {
    let args = binary_name();
    let_assert!(Err(_) = Args::try_parse_from(args));
}

#[test]
fn argument_help_is_valid() {
    let args = [binary_name(), cli_arg_help()].concat();
    let_assert!(Err(err) = Args::try_parse_from(args));
    assert!(clap::error::ErrorKind::DisplayHelp == err.kind());
}

#[test]
fn argument_just_program_is_valid() {
    let args = [binary_name(), cli_arg_program()].concat();
    let args = Args::parse_from(args);

    assert!(PathBuf::from("hello_world.txt") == args.program);
    assert!(DEFAULT_CODEL_SIZE == args.codel_size);
    assert!(None == args.max_steps);
    assert!(UnknownColors::White == args.unknown_colors);
    assert!(!args.verbose);
    assert!(!args.print_state);
}

#[test]
fn all_arguments_are_valid_together() {
    let args = [
        binary_name(),
        cli_arg_program(),
        cli_arg_codel_size("4"),
        cli_arg_max_steps(),
        cli_arg_unknown_colors("black"),
        vec!["-v".into(), "--print-state".into()],
    ]
    .concat();
    let args = Args::parse_from(args);

    assert!(4 == args.codel_size);
    assert!(Some(1000) == args.max_steps);
    assert!(UnknownColors::Black == args.unknown_colors);
    assert!(args.verbose);
    assert!(args.print_state);
}

#[test]
fn codel_size_must_be_positive() {
    let args = [binary_name(), cli_arg_program(), cli_arg_codel_size("0")].concat();
    let_assert!(Err(_) = Args::try_parse_from(args));
}

#[test]
fn unknown_color_policy_must_be_white_or_black() {
    let args = [binary_name(), cli_arg_program(), cli_arg_unknown_colors("gray")].concat();
    let_assert!(Err(_) = Args::try_parse_from(args));
}
