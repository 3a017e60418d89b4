//! Colour management for operator output

use colored::{ColoredString, Colorize};

use super::config::{ColourConfig, ColourPalette};

/// Applies the configured palette, or nothing when colours are off
#[derive(Debug, Clone)]
pub struct ColourManager {
    enabled: bool,
    palette: ColourPalette,
}

impl ColourManager {
    /// Create a ColourManager from a configuration, resolving the environment once
    pub fn with_config(config: &ColourConfig) -> Self {
        let enabled = config.should_use_colours();
        if enabled && config.color_forced {
            // colored consults CLICOLOR and friends on its own; --force-color wins
            colored::control::set_override(true);
        }
        Self {
            enabled,
            palette: config.theme.palette(),
        }
    }

    /// Create a ColourManager with explicit colour control
    pub fn with_colours(enabled: bool) -> Self {
        Self {
            enabled,
            palette: ColourConfig::default().theme.palette(),
        }
    }

    /// Create a ColourManager from the colour flags and optional configuration
    ///
    /// Precedence: --no-color > --force-color > config file > environment.
    pub fn from_color_args(no_color: bool, force_color: bool, config: Option<ColourConfig>) -> Self {
        let mut config = config.unwrap_or_default();
        if no_color {
            config.set_enabled(false);
        } else if force_color {
            config.set_color_forced(true);
        }
        Self::with_config(&config)
    }

    pub fn colours_enabled(&self) -> bool {
        self.enabled
    }

    pub fn error(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.error)
    }

    pub fn warning(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.warning)
    }

    pub fn success(&self, text: &str) -> ColoredString {
        self.paint(text, self.palette.success)
    }

    pub fn highlight(&self, text: &str) -> ColoredString {
        if self.enabled {
            text.color(self.palette.highlight).bold()
        } else {
            text.normal()
        }
    }

    fn paint(&self, text: &str, colour: colored::Color) -> ColoredString {
        if self.enabled {
            text.color(colour)
        } else {
            text.normal()
        }
    }
}

impl Default for ColourManager {
    fn default() -> Self {
        Self::with_config(&ColourConfig::default())
    }
}
