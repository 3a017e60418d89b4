//! Engine error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failures that end a scan run
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be located or did not answer a version query
    #[error("{executable} not found in system PATH")]
    NotFound { executable: String },

    /// Neither an explicit device nor a discovered one is available
    #[error("No scanner found (driver: {driver})")]
    NoDevice { driver: String },

    /// The engine process could not be started
    #[error("Failed to launch {executable}: {source}")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// The destination folder could not be created
    #[error("Failed to create output folder {}: {source}", path.display())]
    FolderCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while talking to the engine
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a not-found error
    pub fn not_found<S: Into<String>>(executable: S) -> Self {
        Self::NotFound { executable: executable.into() }
    }

    /// Create a no-device error
    pub fn no_device<S: ToString>(driver: S) -> Self {
        Self::NoDevice { driver: driver.to_string() }
    }

    /// Whether the operator should be pointed at installation instructions
    pub fn is_environment_error(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::not_found("NAPS2.Console");
        assert_eq!(err.to_string(), "NAPS2.Console not found in system PATH");
        assert!(err.is_environment_error());

        let err = EngineError::no_device("twain");
        assert_eq!(err.to_string(), "No scanner found (driver: twain)");
        assert!(!err.is_environment_error());
    }

    #[test]
    fn test_spawn_error_keeps_source() {
        use std::error::Error as _;

        let err = EngineError::Spawn {
            executable: "NAPS2.Console".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("Failed to launch NAPS2.Console"));
        assert!(err.source().is_some());
    }
}
