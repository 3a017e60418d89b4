//! Output verification
//!
//! The engine's exit code is not trusted on its own: some failures still leave
//! usable pages behind. A run counts as successful when the engine exited
//! cleanly or when files matching the request's output pattern exist.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use log::{debug, warn};

use crate::scan::OutputPattern;

/// Slack for filesystems that store modification times coarsely
pub const MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// A matching file found in the destination folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResultFile {
    pub name: String,
    pub size: u64,
}

impl ScanResultFile {
    /// Size in whole kilobytes, rounded down
    pub fn size_kb(&self) -> u64 {
        self.size / 1024
    }
}

/// What one engine run amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub exit_code: i32,
    pub files_found: bool,
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        scan_succeeded(self.exit_code, self.files_found)
    }

    /// Engine reported failure but left output behind
    pub fn is_partial(&self) -> bool {
        self.exit_code != 0 && self.files_found
    }
}

/// Success rule: clean exit, or output on disk regardless of exit code
pub fn scan_succeeded(exit_code: i32, files_found: bool) -> bool {
    exit_code == 0 || files_found
}

/// Earliest modification time that still counts as written by this run
pub fn freshness_cutoff(started_at: SystemTime) -> SystemTime {
    started_at.checked_sub(MTIME_TOLERANCE).unwrap_or(started_at)
}

/// List files in `dir` matching `pattern`, sorted by name
///
/// With `since` set, files last modified before it are skipped. A folder that
/// cannot be read yields an empty list. An empty path is the current directory,
/// and symlinks are judged by what they point at.
pub fn scan_output(dir: &Path, pattern: &OutputPattern, since: Option<SystemTime>) -> Vec<ScanResultFile> {
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<ScanResultFile> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !pattern.matches(&name) {
                return None;
            }
            let metadata = fs::metadata(entry.path()).ok()?;
            if !metadata.is_file() {
                return None;
            }
            if let Some(cutoff) = since {
                let modified = metadata.modified().ok()?;
                if modified < cutoff {
                    debug!("Skipping {} (older than this run)", name);
                    return None;
                }
            }
            Some(ScanResultFile {
                name,
                size: metadata.len(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// Whether at least one matching file exists
pub fn has_scanned_files(dir: &Path, pattern: &OutputPattern, since: Option<SystemTime>) -> bool {
    let found = !scan_output(dir, pattern, since).is_empty();
    debug!("Output check for {} in {}: {}", pattern, dir.display(), found);
    found
}
