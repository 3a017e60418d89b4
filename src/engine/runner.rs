//! Streaming engine subprocess runner

use std::process::Stdio;

use log::{debug, info};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::{EngineCommand, EngineConfig, EngineError, EngineResult};
use crate::display::{Console, MessageKind};

/// Marker for relayed standard output lines
pub const STDOUT_PREFIX: &str = "NAPS2";
/// Marker for relayed standard error lines
pub const STDERR_PREFIX: &str = "ERROR";

/// Exit code reported when the engine was terminated by a signal
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Run one scan and relay its output line by line until it exits
///
/// Both pipes are drained concurrently so neither can fill up and stall the
/// engine. There is no timeout: an engine waiting on hardware keeps the
/// caller suspended.
pub async fn run_engine(
    config: &EngineConfig,
    command: &EngineCommand,
    console: &dyn Console,
) -> EngineResult<i32> {
    info!("Launching {} with {} arguments", config.executable, command.args().len());

    let mut child = config
        .command()
        .args(command.args())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| EngineError::Spawn {
            executable: config.executable.clone(),
            source,
        })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout_result, stderr_result) = tokio::join!(
        relay_lines(stdout, console, MessageKind::EngineOutput, STDOUT_PREFIX),
        relay_lines(stderr, console, MessageKind::EngineError, STDERR_PREFIX),
    );
    let stdout_lines = stdout_result?;
    let stderr_lines = stderr_result?;

    let status = child.wait().await?;
    let exit_code = status.code().unwrap_or(SIGNAL_EXIT_CODE);
    debug!(
        "Engine exited with {} after {} stdout / {} stderr lines",
        exit_code, stdout_lines, stderr_lines
    );
    Ok(exit_code)
}

/// Forward every line of `stream` to the console; returns the line count
async fn relay_lines<R>(
    stream: Option<R>,
    console: &dyn Console,
    kind: MessageKind,
    prefix: &str,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let Some(stream) = stream else {
        return Ok(0);
    };

    let mut reader = BufReader::new(stream);
    let mut buffer = Vec::new();
    let mut count = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }
        // The engine's console encoding is not guaranteed to be UTF-8
        let line = String::from_utf8_lossy(&buffer);
        console.emit(kind, &format!("{}: {}", prefix, line.trim()));
        count += 1;
    }

    Ok(count)
}
