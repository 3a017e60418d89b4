//! CLI module containing argument parsing and help output

pub mod args;

pub use args::{parse_args, parse_from_args, validate_args, Args};
