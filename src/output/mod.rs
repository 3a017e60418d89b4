//! Output formatting helpers

pub mod reports;

pub use reports::{format_file_line, format_settings_table, format_thousands};
