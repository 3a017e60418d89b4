//! Scanner device discovery

use log::{debug, info, warn};

use super::{EngineConfig, EngineError, EngineResult};
use crate::scan::{DeviceSelection, Driver};

/// Pick the device named on the first non-blank line of a listing
///
/// The engine orders its devices; no further ranking is applied.
pub fn first_device(listing: &str) -> Option<String> {
    listing
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Ask the engine to list devices for `driver` and return the first one
///
/// Launch failures and non-zero exits are logged and surface as `None`.
pub async fn discover_device(config: &EngineConfig, driver: Driver) -> Option<String> {
    debug!("Listing devices: {} --driver {} --listdevices", config.executable, driver);

    let output = match config
        .command()
        .arg("--driver")
        .arg(driver.to_string())
        .arg("--listdevices")
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Error finding scanner: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        warn!(
            "Device listing exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }

    let device = first_device(&String::from_utf8_lossy(&output.stdout));
    match &device {
        Some(name) => info!("Discovered scanner: {}", name),
        None => debug!("Device listing was empty"),
    }
    device
}

/// Resolve the device name a scan will use
pub async fn resolve_device(
    config: &EngineConfig,
    selection: &DeviceSelection,
    driver: Driver,
) -> EngineResult<String> {
    match selection {
        DeviceSelection::Explicit(name) => Ok(name.clone()),
        DeviceSelection::AutoDetect => discover_device(config, driver)
            .await
            .ok_or_else(|| EngineError::no_device(driver)),
    }
}
