//! Scan request value types
//!
//! A `ScanRequest` is built once from configuration and command-line input and
//! never mutated afterwards. The enumerations render the exact tokens the
//! external engine expects.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Literal per-page counter token expanded by the engine, never by us.
pub const SEQUENCE_PLACEHOLDER: &str = "$(nnnn)";

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpg,
    Jpeg,
    Tiff,
    Bmp,
    Pdf,
}

impl OutputFormat {
    /// File extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Whether every page accumulates into a single output file
    pub fn is_single_file(&self) -> bool {
        matches!(self, OutputFormat::Pdf)
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Png
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" => Ok(OutputFormat::Jpg),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "tiff" => Ok(OutputFormat::Tiff),
            "bmp" => Ok(OutputFormat::Bmp),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(format!(
                "Invalid format: {}. Valid options: png, jpg, jpeg, tiff, bmp, pdf",
                s
            )),
        }
    }
}

/// Colour / bit-depth mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Color,
    Gray,
    Bw,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Color
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Color => "color",
            ColorMode::Gray => "gray",
            ColorMode::Bw => "bw",
        })
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "color" => Ok(ColorMode::Color),
            "gray" => Ok(ColorMode::Gray),
            "bw" => Ok(ColorMode::Bw),
            _ => Err(format!("Invalid color mode: {}. Valid options: color, gray, bw", s)),
        }
    }
}

/// Paper source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSource {
    /// Automatic document feeder
    Feeder,
    /// Flatbed glass
    Glass,
}

impl Default for PaperSource {
    fn default() -> Self {
        PaperSource::Feeder
    }
}

impl fmt::Display for PaperSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaperSource::Feeder => "feeder",
            PaperSource::Glass => "glass",
        })
    }
}

impl FromStr for PaperSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feeder" => Ok(PaperSource::Feeder),
            "glass" => Ok(PaperSource::Glass),
            _ => Err(format!("Invalid source: {}. Valid options: feeder, glass", s)),
        }
    }
}

/// Device-access protocol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    Wia,
    Twain,
}

impl Default for Driver {
    fn default() -> Self {
        Driver::Wia
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Driver::Wia => "wia",
            Driver::Twain => "twain",
        })
    }
}

impl FromStr for Driver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wia" => Ok(Driver::Wia),
            "twain" => Ok(Driver::Twain),
            _ => Err(format!("Invalid driver: {}. Valid options: wia, twain", s)),
        }
    }
}

/// Which scanner to talk to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelection {
    /// Device name pinned by the operator
    Explicit(String),
    /// Ask the engine for its first listed device
    AutoDetect,
}

impl Default for DeviceSelection {
    fn default() -> Self {
        DeviceSelection::AutoDetect
    }
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceSelection::Explicit(name) => f.write_str(name),
            DeviceSelection::AutoDetect => f.write_str("auto-detect"),
        }
    }
}

/// Destination folder for a configured path; blank means the current directory
pub fn output_dir_from<P: AsRef<Path>>(raw: P) -> PathBuf {
    let raw = raw.as_ref();
    if raw.as_os_str().to_string_lossy().trim().is_empty() {
        PathBuf::from(".")
    } else {
        raw.to_path_buf()
    }
}

/// Everything needed to drive one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub format: OutputFormat,
    pub dpi: u32,
    pub color: ColorMode,
    pub source: PaperSource,
    pub device: DeviceSelection,
    pub driver: Driver,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("scanned_pages"),
            prefix: "page".to_string(),
            format: OutputFormat::default(),
            dpi: 300,
            color: ColorMode::default(),
            source: PaperSource::default(),
            device: DeviceSelection::default(),
            driver: Driver::default(),
        }
    }
}

impl ScanRequest {
    /// Path handed to the engine's `--output` option
    ///
    /// PDF output accumulates into `{prefix}.pdf`; every other format gets one
    /// file per page named `{prefix}_$(nnnn).{ext}`.
    pub fn output_path(&self) -> PathBuf {
        let file_name = if self.format.is_single_file() {
            format!("{}.{}", self.prefix, self.format.extension())
        } else {
            format!(
                "{}_{}.{}",
                self.prefix,
                SEQUENCE_PLACEHOLDER,
                self.format.extension()
            )
        };
        self.output_dir.join(file_name)
    }

    /// Matcher for `{prefix}*.{ext}` in the destination folder
    pub fn output_pattern(&self) -> OutputPattern {
        OutputPattern::new(&self.prefix, self.format.extension())
    }
}

/// Glob-style `{prefix}*.{ext}` file name matcher
#[derive(Debug, Clone)]
pub struct OutputPattern {
    glob: String,
    regex: Regex,
}

impl OutputPattern {
    pub fn new(prefix: &str, extension: &str) -> Self {
        let source = format!(
            "^{}.*\\.{}$",
            regex::escape(prefix),
            regex::escape(extension)
        );
        let regex = Regex::new(&source).expect("escaped glob is a valid regex");
        Self {
            glob: format!("{}*.{}", prefix, extension),
            regex,
        }
    }

    /// Case-sensitive match on a bare file name
    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }

}

impl fmt::Display for OutputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}
