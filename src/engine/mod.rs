//! External scanning engine integration
//!
//! Everything that talks to the engine's command-line interface lives here:
//! the availability probe, device discovery, argument construction, the
//! streaming subprocess runner and the filesystem checks that decide whether
//! a run actually produced pages.

pub mod command;
pub mod devices;
pub mod error;
pub mod probe;
pub mod report;
pub mod runner;
pub mod verify;

use std::process::Stdio;

pub use command::EngineCommand;
pub use error::{EngineError, EngineResult};
pub use verify::{ScanOutcome, ScanResultFile};

/// Executable name used when nothing else is configured
pub const DEFAULT_EXECUTABLE: &str = "NAPS2.Console";

/// How to reach the engine and how strictly to judge its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Executable name (resolved through PATH) or explicit path
    pub executable: String,
    /// Only count output files written after the scan started
    pub fresh_only: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            fresh_only: false,
        }
    }
}

impl EngineConfig {
    pub fn new<S: Into<String>>(executable: S) -> Self {
        Self {
            executable: executable.into(),
            ..Self::default()
        }
    }

    pub fn with_fresh_only(mut self, fresh_only: bool) -> Self {
        self.fresh_only = fresh_only;
        self
    }

    /// Base process builder; the child never reads from our stdin and is
    /// killed if its future is dropped.
    pub(crate) fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.executable);
        command.stdin(Stdio::null()).kill_on_drop(true);
        command
    }
}
