//! Scan workflow
//!
//! Prepare the folder, probe the engine, resolve a device, build and run the
//! command, then judge the run by what landed on disk. Every stage runs
//! strictly after the previous one; any failure ends the run as `Failed`.

use std::fs;
use std::future::{self, Future};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use log::{debug, error, info, warn};

use crate::display::Console;
use crate::engine::{
    devices, probe, report, runner, verify, EngineCommand, EngineConfig, EngineError,
    EngineResult, ScanOutcome,
};
use crate::output::format_settings_table;
use crate::scan::{PaperSource, ScanRequest};

/// Where NAPS2 can be obtained
pub const INSTALL_URL: &str = "https://www.naps2.com/download";

/// Scan lifecycle, logged as it advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStage {
    Preparing,
    ProbingAvailability,
    ResolvingDevice,
    BuildingCommand,
    Running,
    Verifying,
    Succeeded,
    Failed,
}

fn enter(stage: ScanStage) {
    debug!("Scan stage: {:?}", stage);
}

/// Create the destination folder if needed; returns whether it was created
pub fn prepare_output_dir(path: &Path) -> EngineResult<bool> {
    if path.as_os_str().is_empty() || path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|source| EngineError::FolderCreation {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created output folder: {}", path.display());
    Ok(true)
}

/// Resolve once the operator interrupts; never resolves if the listener fails
pub async fn wait_for_interrupt<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Cannot listen for Ctrl-C, scan cannot be interrupted: {}", e);
        future::pending::<()>().await;
    }
}

/// Print the effective settings before anything is launched
pub fn print_settings(request: &ScanRequest, console: &dyn Console) {
    console.highlight("=== SCANWRAP ===");
    let rows = [
        ("Output", request.output_dir.display().to_string()),
        ("Prefix", request.prefix.clone()),
        ("Format", request.format.to_string()),
        ("DPI", request.dpi.to_string()),
        ("Color", request.color.to_string()),
        ("Source", request.source.to_string()),
        ("Device", request.device.to_string()),
        ("Driver", request.driver.to_string()),
    ];
    for line in format_settings_table(&rows).lines() {
        console.plain(line);
    }
    console.blank();
}

/// Run one scan end to end; never fails, only reports
pub async fn run_scan(request: &ScanRequest, engine: &EngineConfig, console: &dyn Console) -> bool {
    match execute_scan(request, engine, console).await {
        Ok(true) => {
            enter(ScanStage::Succeeded);
            true
        }
        Ok(false) => {
            enter(ScanStage::Failed);
            false
        }
        Err(e) => {
            enter(ScanStage::Failed);
            error!("Scan aborted: {}", e);
            report_failure(&e, engine, console);
            false
        }
    }
}

fn report_failure(e: &EngineError, engine: &EngineConfig, console: &dyn Console) {
    match e {
        EngineError::NotFound { .. } | EngineError::NoDevice { .. } => {
            console.error(&format!("ERROR: {}.", e))
        }
        _ => console.error(&format!("Error during scan: {}", e)),
    }

    if e.is_environment_error() {
        console.plain(&format!("Install NAPS2 from: {}", INSTALL_URL));
        console.plain(&format!(
            "Or add the folder containing {} to the PATH environment variable.",
            engine.executable
        ));
    }
}

async fn execute_scan(
    request: &ScanRequest,
    engine: &EngineConfig,
    console: &dyn Console,
) -> EngineResult<bool> {
    enter(ScanStage::Preparing);
    if prepare_output_dir(&request.output_dir)? {
        console.plain(&format!("Created folder: {}", request.output_dir.display()));
    }

    enter(ScanStage::ProbingAvailability);
    if !probe::is_available(engine).await {
        return Err(EngineError::not_found(&engine.executable));
    }

    enter(ScanStage::ResolvingDevice);
    let device = devices::resolve_device(engine, &request.device, request.driver).await?;
    console.plain(&format!("Scanner: {}", device));

    enter(ScanStage::BuildingCommand);
    let command = EngineCommand::build(request, &device);
    console.blank();
    console.highlight("NAPS2 Command:");
    console.plain(&command.display_line(&engine.executable));
    console.blank();
    console.plain("Starting scan...");
    if request.source == PaperSource::Feeder {
        console.warning("MAKE SURE PAPER IS IN THE ADF TRAY!");
    }
    console.blank();

    enter(ScanStage::Running);
    let started_at = SystemTime::now();
    let exit_code = runner::run_engine(engine, &command, console).await?;
    console.blank();
    console.plain(&format!("NAPS2 finished with exit code: {}", exit_code));

    enter(ScanStage::Verifying);
    let since = engine.fresh_only.then(|| verify::freshness_cutoff(started_at));
    let pattern = request.output_pattern();
    let outcome = ScanOutcome {
        exit_code,
        files_found: verify::has_scanned_files(&request.output_dir, &pattern, since),
    };
    debug!("Scan outcome: {:?}", outcome);

    if !outcome.is_success() {
        console.error("No files were created.");
        return Ok(false);
    }

    if outcome.is_partial() {
        warn!("Engine exited with {} but left output files", exit_code);
        console.warning(&format!(
            "Warning: NAPS2 reported exit code {}, but output files were found; keeping them.",
            exit_code
        ));
    }

    report::report_results(&request.output_dir, &pattern, since, console);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{MemoryConsole, MessageKind};
    use crate::scan::{ColorMode, DeviceSelection, OutputFormat};

    #[test]
    fn test_prepare_output_dir_creates_once() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("scans").join("2026");

        assert!(prepare_output_dir(&target).unwrap());
        assert!(target.is_dir());
        assert!(!prepare_output_dir(&target).unwrap());
    }

    #[test]
    fn test_prepare_output_dir_current_directory() {
        assert!(!prepare_output_dir(Path::new("")).unwrap());
        assert!(!prepare_output_dir(Path::new(".")).unwrap());
    }

    #[test]
    fn test_prepare_output_dir_rejects_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let result = prepare_output_dir(&blocker);
        assert!(matches!(result, Err(EngineError::FolderCreation { .. })));
    }

    #[test]
    fn test_print_settings() {
        let console = MemoryConsole::new();
        let request = ScanRequest {
            format: OutputFormat::Pdf,
            color: ColorMode::Bw,
            device: DeviceSelection::Explicit("Canon LiDE 300".to_string()),
            ..ScanRequest::default()
        };
        print_settings(&request, &console);

        assert!(console.contains("=== SCANWRAP ==="));
        assert!(console.lines().iter().any(|l| l.contains("Format:") && l.contains("pdf")));
        assert!(console.lines().iter().any(|l| l.contains("Device:") && l.contains("Canon LiDE 300")));
    }

    #[tokio::test]
    async fn test_interrupt_only_on_delivered_signal() {
        use std::time::Duration;
        use tokio::time::timeout;

        let failed = wait_for_interrupt(async {
            Err(io::Error::new(io::ErrorKind::Other, "signal handler unavailable"))
        });
        assert!(timeout(Duration::from_millis(50), failed).await.is_err());

        let pressed = wait_for_interrupt(async { Ok(()) });
        assert!(timeout(Duration::from_millis(50), pressed).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_engine_fails_before_device_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let request = ScanRequest {
            output_dir: dir.path().join("scanned_pages"),
            ..ScanRequest::default()
        };
        let engine = EngineConfig::new("scanwrap-no-such-engine-binary");
        let console = MemoryConsole::new();

        assert!(!run_scan(&request, &engine, &console).await);

        // The folder is prepared before the probe
        assert!(request.output_dir.is_dir());
        assert!(console.contains("not found in system PATH"));
        assert!(console.contains(INSTALL_URL));
        assert!(!console.contains("Scanner:"));
        assert!(!console.contains("Starting scan..."));
    }

    #[cfg(unix)]
    mod with_fake_engine {
        use super::*;
        use crate::engine::test_support::write_script;
        use std::path::PathBuf;

        /// Fake engine: answers --version and --listdevices, and on a scan runs `scan_body`
        /// with the value of --output in $OUT
        fn fake_engine(dir: &Path, devices: &str, scan_body: &str) -> EngineConfig {
            let script = format!(
                r#"case "$1" in
  --version) echo "NAPS2 7.4.2"; exit 0 ;;
esac
if [ "$3" = "--listdevices" ]; then
  printf '{devices}'
  exit 0
fi
OUT=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output" ]; then OUT="$2"; fi
  shift
done
{scan_body}"#
            );
            let path = write_script(dir, "engine", &script);
            EngineConfig::new(path.to_string_lossy())
        }

        fn request_in(dir: &Path, format: OutputFormat, prefix: &str) -> ScanRequest {
            ScanRequest {
                output_dir: dir.join("scanned_pages"),
                prefix: prefix.to_string(),
                format,
                ..ScanRequest::default()
            }
        }

        #[tokio::test]
        async fn test_pdf_scan_succeeds_and_reports() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_engine(
                dir.path(),
                "Xerox WIA - ETE84DEC0F2B58\\n",
                r#"echo "Scanning"
head -c 512000 /dev/zero > "$OUT"
exit 0"#,
            );
            let request = ScanRequest {
                color: ColorMode::Bw,
                ..request_in(dir.path(), OutputFormat::Pdf, "contract")
            };
            let console = MemoryConsole::new();

            assert!(run_scan(&request, &engine, &console).await);

            assert!(console.contains("Created folder:"));
            assert!(console.contains("Scanner: Xerox WIA - ETE84DEC0F2B58"));
            assert!(console.contains("--device \"Xerox WIA - ETE84DEC0F2B58\""));
            assert!(console.contains("--bitdepth bw"));
            assert_eq!(console.lines_of(MessageKind::EngineOutput), vec!["NAPS2: Scanning"]);
            assert!(console.contains("NAPS2 finished with exit code: 0"));
            assert!(console.contains("Files created (1):"));
            assert!(console.contains("  contract.pdf (500 KB)"));
        }

        #[tokio::test]
        async fn test_nonzero_exit_with_files_is_success() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_engine(
                dir.path(),
                "Scanner\\n",
                r#"DIR=$(dirname "$OUT")
echo data > "$DIR/page_0001.png"
echo "Feeder empty" >&2
exit 1"#,
            );
            let request = request_in(dir.path(), OutputFormat::Png, "page");
            let console = MemoryConsole::new();

            assert!(run_scan(&request, &engine, &console).await);
            assert_eq!(console.lines_of(MessageKind::EngineError), vec!["ERROR: Feeder empty"]);
            assert!(!console.lines_of(MessageKind::Warning).is_empty());
            assert!(console.contains("page_0001.png (0 KB)"));
        }

        #[tokio::test]
        async fn test_zero_exit_without_files_is_success() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_engine(dir.path(), "Scanner\\n", "exit 0");
            let request = request_in(dir.path(), OutputFormat::Png, "page");
            let console = MemoryConsole::new();

            assert!(run_scan(&request, &engine, &console).await);
            assert!(console.contains("Files created (0):"));
        }

        #[tokio::test]
        async fn test_nonzero_exit_without_files_is_failure() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_engine(dir.path(), "Scanner\\n", "exit 2");
            let request = request_in(dir.path(), OutputFormat::Png, "page");
            let console = MemoryConsole::new();

            assert!(!run_scan(&request, &engine, &console).await);
            assert!(console.contains("No files were created."));
            assert!(!console.contains("Files created"));
        }

        #[tokio::test]
        async fn test_no_device_is_failure_without_scan() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("scan-ran");
            let engine = fake_engine(
                dir.path(),
                "",
                &format!("touch '{}'", marker.display()),
            );
            let request = request_in(dir.path(), OutputFormat::Png, "page");
            let console = MemoryConsole::new();

            assert!(!run_scan(&request, &engine, &console).await);
            assert!(console.contains("ERROR: No scanner found (driver: wia)."));
            assert!(!marker.exists());
        }

        #[tokio::test]
        async fn test_explicit_device_and_glass_source() {
            let dir = tempfile::tempdir().unwrap();
            let engine = fake_engine(dir.path(), "", "exit 0");
            let request = ScanRequest {
                device: DeviceSelection::Explicit("Canon LiDE 300".to_string()),
                source: PaperSource::Glass,
                ..request_in(dir.path(), OutputFormat::Jpg, "photo")
            };
            let console = MemoryConsole::new();

            assert!(run_scan(&request, &engine, &console).await);
            assert!(console.contains("Scanner: Canon LiDE 300"));
            assert!(!console.contains("ADF TRAY"));
        }

        #[tokio::test]
        async fn test_fresh_only_ignores_stale_files() {
            use std::fs::File;
            use std::time::Duration;

            let dir = tempfile::tempdir().unwrap();
            let request = request_in(dir.path(), OutputFormat::Png, "page");
            fs::create_dir_all(&request.output_dir).unwrap();
            let stale: PathBuf = request.output_dir.join("page_0001.png");
            fs::write(&stale, b"old").unwrap();
            File::options()
                .write(true)
                .open(&stale)
                .unwrap()
                .set_modified(SystemTime::now() - Duration::from_secs(3600))
                .unwrap();

            let engine = fake_engine(dir.path(), "Scanner\\n", "exit 5");

            let console = MemoryConsole::new();
            assert!(run_scan(&request, &engine, &console).await, "stale file counts by default");

            let console = MemoryConsole::new();
            let strict = engine.clone().with_fresh_only(true);
            assert!(!run_scan(&request, &strict, &console).await);
            assert!(console.contains("No files were created."));
        }
    }
}
