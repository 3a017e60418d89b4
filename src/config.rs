use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::display::{ColourConfig, ColourTheme};
use crate::engine::EngineConfig;
use crate::scan::{output_dir_from, DeviceSelection, ScanRequest};

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using discovery hierarchy
    pub fn load() -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files() {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using built-in defaults");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Successfully loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// File the configuration came from, if any
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get("base").and_then(|s| s.get(key))
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get boolean value with type conversion
    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        match self.get_value(section, key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(anyhow::anyhow!("Invalid boolean value for {}.{}: {}", section, key, value)),
            },
            None => Ok(None),
        }
    }

    /// Get log level value with type conversion
    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        match self.get_value(section, key) {
            Some(value) => Ok(Some(crate::logging::parse_log_level(value)?)),
            None => Ok(None),
        }
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Get any value whose type parses from a string
    pub fn get_parsed<T>(&self, section: &str, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_value(section, key) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("Invalid value for {}.{}: {} ({})", section, key, value, e)),
            None => Ok(None),
        }
    }

    /// Scan settings from the `[scan]` section layered over built-in defaults
    pub fn get_scan_request(&self) -> Result<ScanRequest> {
        let mut request = ScanRequest::default();

        if let Some(output) = self.get_path("scan", "output") {
            request.output_dir = output_dir_from(output);
        }
        if let Some(prefix) = self.get_value("scan", "prefix") {
            request.prefix = prefix.clone();
        }
        if let Some(format) = self.get_parsed("scan", "format")? {
            request.format = format;
        }
        if let Some(dpi) = self.get_parsed::<u32>("scan", "dpi")? {
            if dpi == 0 {
                return Err(anyhow::anyhow!("Invalid value for scan.dpi: must be a positive integer"));
            }
            request.dpi = dpi;
        }
        if let Some(color) = self.get_parsed("scan", "color")? {
            request.color = color;
        }
        if let Some(source) = self.get_parsed("scan", "source")? {
            request.source = source;
        }
        if let Some(device) = self.get_value("scan", "device") {
            if !device.trim().is_empty() {
                request.device = DeviceSelection::Explicit(device.clone());
            }
        }
        if let Some(driver) = self.get_parsed("scan", "driver")? {
            request.driver = driver;
        }

        debug!("Scan defaults from configuration: {:?}", request);
        Ok(request)
    }

    /// Engine settings from the `[engine]` section
    pub fn get_engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();

        if let Some(executable) = self.get_value("engine", "executable") {
            config.executable = executable.clone();
        }
        if let Some(fresh_only) = self.get_bool("engine", "fresh-only")? {
            config.fresh_only = fresh_only;
        }

        Ok(config)
    }

    /// Colour settings from the `[colours]` section
    pub fn get_colour_config(&self) -> Result<ColourConfig> {
        let mut config = ColourConfig::default();

        if let Some(enabled) = self.get_bool("colours", "enabled")? {
            config.set_enabled(enabled);
        }
        if let Some(theme) = self.get_parsed::<ColourTheme>("colours", "theme")? {
            config.set_theme(theme);
        }
        if let Some(respect) = self.get_bool("colours", "respect-no-color")? {
            config.set_respect_no_color(respect);
        }

        Ok(config)
    }
}

/// Discover configuration files in order of precedence
fn discover_config_files() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $SCANWRAP_CONFIG
    if let Ok(env_path) = env::var("SCANWRAP_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    // 2. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("scanwrap").join("config.toml"));
    }

    // 3. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".scanwrap.toml"));
    }

    // 4. Project local
    paths.push(PathBuf::from("./.scanwrap.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Table(subtable) => {
                // Scalar entries belong to this section; nested tables become their own
                let section_map = config.entry(section_name.clone()).or_default();
                for (subkey, subvalue) in subtable {
                    if !matches!(subvalue, Value::Table(_)) {
                        section_map.insert(subkey.clone(), toml_value_to_string(subvalue));
                    }
                }
                let nested: toml::Table = subtable
                    .iter()
                    .filter(|(_, v)| matches!(v, Value::Table(_)))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                if !nested.is_empty() {
                    flatten_toml_table(&nested, section_name, config);
                }
            }
            _ => {
                // Top-level keys without a table header live in [base]
                config
                    .entry("base".to_string())
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
