//! Application initialization and configuration

use anyhow::{Context, Result};
use log::{debug, error};
use crate::{cli, config, display, logging};
use crate::engine::EngineConfig;
use crate::scan::{output_dir_from, DeviceSelection, ScanRequest};

pub fn load_configuration(args: &cli::Args) -> Result<config::ConfigManager> {
    let mut manager = if let Some(config_file) = &args.config_file {
        debug!("Loading configuration from explicit file: {}", config_file.display());
        config::ConfigManager::load_from_file(config_file.clone())?
    } else {
        config::ConfigManager::load()?
    };

    if let Some(section_name) = &args.config_name {
        debug!("Selecting configuration section: {}", section_name);
        manager.select_section(section_name.clone());
    }

    Ok(manager)
}

pub fn configure_logging(args: &cli::Args, config: &config::ConfigManager) -> Result<logging::LogConfig> {
    use log::LevelFilter;
    use std::str::FromStr;

    let console_level = if args.debug {
        LevelFilter::Trace
    } else if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Error
    } else {
        match config.get_log_level("base", "console-level") {
            Ok(Some(level)) => {
                debug!("Using console log level from config: {:?}", level);
                level
            }
            Ok(None) => LevelFilter::Warn,
            Err(e) => {
                debug!("Invalid console-level in config, using default: {}", e);
                LevelFilter::Warn
            }
        }
    };

    debug!("Console log level set to: {:?}", console_level);

    let format = match &args.log_format {
        Some(format_str) => logging::LogFormat::from_str(format_str)
            .map_err(|e| anyhow::anyhow!(e))?,
        None => match config.get_value("base", "log-format") {
            Some(format_str) => {
                debug!("Using log format from config: {}", format_str);
                logging::LogFormat::from_str(format_str)
                    .unwrap_or(logging::LogFormat::Text)
            }
            None => logging::LogFormat::Text,
        },
    };

    debug!("Log format set to: {:?}", format);

    let log_file_path = args.log_file.clone()
        .or_else(|| config.get_path("base", "log-file"));

    let file_log_level = match &args.log_file_level {
        Some(level_str) => Some(logging::parse_log_level(level_str)?),
        None => config
            .get_log_level("base", "file-log-level")
            .context("Invalid file-log-level in configuration")?,
    };

    let (destination, file_level) = match (log_file_path, file_log_level) {
        (Some(file_path), Some(level)) => {
            debug!("File logging enabled: {} (level: {:?})", file_path.display(), level);
            (logging::LogDestination::Both(file_path), Some(level))
        }
        (Some(file_path), None) => {
            debug!("File logging enabled: {} (level: {:?} - same as console)", file_path.display(), console_level);
            (logging::LogDestination::Both(file_path), Some(console_level))
        }
        (None, None) => {
            debug!("Console-only logging enabled");
            (logging::LogDestination::Console, None)
        }
        (None, Some(_)) => {
            error!("Log file level specified without log file - this should have been caught during validation");
            return Err(anyhow::anyhow!("Log file level specified without log file"));
        }
    };

    Ok(logging::LogConfig {
        console_level,
        file_level,
        format,
        destination,
    })
}

/// Create a ColourManager from CLI arguments and configuration file
pub fn create_colour_manager(args: &cli::Args, config: &config::ConfigManager) -> Result<display::ColourManager> {
    let colour_config = config.get_colour_config()
        .context("Invalid [colours] configuration")?;
    Ok(display::ColourManager::from_color_args(args.no_color, args.force_color, Some(colour_config)))
}

/// Layer command-line scan settings over the configured defaults
pub fn build_scan_request(args: &cli::Args, config: &config::ConfigManager) -> Result<ScanRequest> {
    let defaults = config.get_scan_request()
        .context("Invalid [scan] configuration")?;

    let request = ScanRequest {
        output_dir: args.output.as_ref().map(output_dir_from).unwrap_or(defaults.output_dir),
        prefix: args.prefix.clone().unwrap_or(defaults.prefix),
        format: args.format.unwrap_or(defaults.format),
        dpi: args.dpi.unwrap_or(defaults.dpi),
        color: args.color.unwrap_or(defaults.color),
        source: args.source.unwrap_or(defaults.source),
        device: match &args.device {
            Some(name) if !name.trim().is_empty() => DeviceSelection::Explicit(name.clone()),
            _ => defaults.device,
        },
        driver: args.driver.unwrap_or(defaults.driver),
    };

    debug!("Effective scan request: {:?}", request);
    Ok(request)
}

/// Engine settings from configuration, overridden by `--engine` / `--fresh-only`
pub fn build_engine_config(args: &cli::Args, config: &config::ConfigManager) -> Result<EngineConfig> {
    let mut engine = config.get_engine_config()
        .context("Invalid [engine] configuration")?;

    if let Some(executable) = &args.engine {
        engine.executable = executable.clone();
    }
    if args.fresh_only {
        engine.fresh_only = true;
    }

    debug!("Engine configuration: {:?}", engine);
    Ok(engine)
}

/// Whether to wait for Enter before exiting
pub fn pause_requested(args: &cli::Args, config: &config::ConfigManager) -> bool {
    args.pause || matches!(config.get_bool("base", "pause"), Ok(Some(true)))
}
