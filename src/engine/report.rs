//! Results summary

use std::path::Path;
use std::time::SystemTime;

use super::verify::{scan_output, ScanResultFile};
use crate::display::Console;
use crate::output::format_file_line;
use crate::scan::OutputPattern;

/// Print every matching file with its size, then where they were saved
///
/// Re-reads the folder instead of reusing the verifier's listing; the result
/// has no bearing on success.
pub fn report_results(
    dir: &Path,
    pattern: &OutputPattern,
    since: Option<SystemTime>,
    console: &dyn Console,
) -> Vec<ScanResultFile> {
    let files = scan_output(dir, pattern, since);

    console.blank();
    console.highlight(&format!("Files created ({}):", files.len()));
    for file in &files {
        console.plain(&format_file_line(file));
    }

    if !files.is_empty() {
        let location = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        console.blank();
        console.plain(&format!("All files saved to: {}", location.display()));
    }

    files
}
