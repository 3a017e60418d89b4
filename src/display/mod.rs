//! Display module for colour management and operator output
//!
//! Colours follow the usual conventions (`NO_COLOR`, TTY detection, explicit
//! `--force-color`/`--no-color`); all operator-facing text goes through a `Console`.

pub mod colours;
pub mod config;
pub mod console;

pub use colours::*;
pub use config::*;
pub use console::*;
