//! Colour configuration and palettes
//!
//! Decides whether operator output is coloured (config file, `--force-color`,
//! `--no-color`, `NO_COLOR`, TTY detection) and which colours are used.

use colored::Color;
use serde::{Deserialize, Serialize};

/// Colour configuration for the display system
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ColourConfig {
    /// Whether colours are enabled globally
    pub enabled: bool,
    /// The colour theme to use
    pub theme: ColourTheme,
    /// Whether to respect NO_COLOR environment variable
    pub respect_no_color: bool,
    /// Force colours even when not in a TTY (--force-color flag)
    #[serde(skip, default)]
    pub color_forced: bool,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: ColourTheme::Dark,
            respect_no_color: true,
            color_forced: false,
        }
    }
}

/// Available colour themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourTheme {
    /// Optimised for light backgrounds
    Light,
    /// Optimised for dark backgrounds
    Dark,
}

impl std::str::FromStr for ColourTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(ColourTheme::Light),
            "dark" | "auto" => Ok(ColourTheme::Dark),
            _ => Err(format!("Invalid colour theme: {}. Valid options: light, dark", s)),
        }
    }
}

/// Colours used for each message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourPalette {
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub highlight: Color,
}

impl ColourPalette {
    /// Palette for light backgrounds
    pub fn light() -> Self {
        Self {
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
            highlight: Color::Magenta,
        }
    }

    /// Palette for dark backgrounds
    pub fn dark() -> Self {
        Self {
            error: Color::BrightRed,
            warning: Color::BrightYellow,
            success: Color::BrightGreen,
            highlight: Color::BrightCyan,
        }
    }
}

impl ColourTheme {
    pub fn palette(&self) -> ColourPalette {
        match self {
            ColourTheme::Light => ColourPalette::light(),
            ColourTheme::Dark => ColourPalette::dark(),
        }
    }
}

impl ColourConfig {
    /// Create a colour configuration with colours disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_theme(&mut self, theme: ColourTheme) {
        self.theme = theme;
    }

    pub fn set_respect_no_color(&mut self, respect: bool) {
        self.respect_no_color = respect;
    }

    /// Force colours to be enabled (--force-color flag)
    pub fn set_color_forced(&mut self, forced: bool) {
        self.color_forced = forced;
    }

    /// Check if colours should be enabled based on configuration and environment
    pub fn should_use_colours(&self) -> bool {
        if !self.enabled {
            return false;
        }

        // --force-color ignores both the TTY check and NO_COLOR
        if self.color_forced {
            return true;
        }

        if self.respect_no_color && std::env::var_os("NO_COLOR").is_some() {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_colour_config() {
        let config = ColourConfig::default();
        assert!(config.enabled);
        assert_eq!(config.theme, ColourTheme::Dark);
        assert!(config.respect_no_color);
        assert!(!config.color_forced);
    }

    #[test]
    fn test_disabled_config_never_colours() {
        let mut config = ColourConfig::disabled();
        assert!(!config.should_use_colours());

        // Forcing does not override an explicit disable
        config.set_color_forced(true);
        assert!(!config.should_use_colours());
    }

    #[test]
    fn test_forced_colours() {
        let mut config = ColourConfig::default();
        config.set_color_forced(true);
        assert!(config.should_use_colours());
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!("light".parse::<ColourTheme>().unwrap(), ColourTheme::Light);
        assert_eq!("DARK".parse::<ColourTheme>().unwrap(), ColourTheme::Dark);
        assert_eq!("auto".parse::<ColourTheme>().unwrap(), ColourTheme::Dark);
        assert!("neon".parse::<ColourTheme>().is_err());
        assert_eq!(ColourTheme::Light.palette().error, Color::Red);
    }
}
