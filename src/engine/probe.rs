//! Engine availability probe

use std::process::Stdio;

use log::debug;

use super::EngineConfig;

/// Check whether the engine answers a version query
///
/// A missing executable, a launch failure and a non-zero exit all read as
/// "unavailable"; nothing is propagated to the caller.
pub async fn is_available(config: &EngineConfig) -> bool {
    debug!("Probing engine availability: {} --version", config.executable);

    let status = config
        .command()
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => true,
        Ok(status) => {
            debug!("Version query exited with {:?}", status.code());
            false
        }
        Err(e) => {
            debug!("Version query could not be launched: {}", e);
            false
        }
    }
}
