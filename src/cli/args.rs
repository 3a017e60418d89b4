use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use log::{debug, info};
use std::path::PathBuf;

use crate::scan::{ColorMode, Driver, OutputFormat, PaperSource};

/// Command-line arguments
///
/// Scan settings are `None` when not given, so configuration-file values and
/// built-in defaults can fill the gaps later.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Output folder
    pub output: Option<String>,
    /// File name prefix
    pub prefix: Option<String>,
    /// Output format
    pub format: Option<OutputFormat>,
    /// Resolution in DPI
    pub dpi: Option<u32>,
    /// Colour mode
    pub color: Option<ColorMode>,
    /// Paper source
    pub source: Option<PaperSource>,
    /// Scanner device name; auto-detected when unset
    pub device: Option<String>,
    /// Scanner driver
    pub driver: Option<Driver>,

    /// Show usage and exit
    pub help: bool,
    /// Show version and exit
    pub version: bool,

    /// Verbose output (debug level logging)
    pub verbose: bool,
    /// Quiet output (error level logging only)
    pub quiet: bool,
    /// Debug output (trace level logging)
    pub debug: bool,
    /// Log format: text or json
    pub log_format: Option<String>,
    /// Log file path for file output
    pub log_file: Option<PathBuf>,
    /// Log level for file output (independent of console level)
    pub log_file_level: Option<String>,

    /// Configuration file path
    pub config_file: Option<PathBuf>,
    /// Configuration section name
    pub config_name: Option<String>,

    /// Disable coloured output
    pub no_color: bool,
    /// Colour output even when not attached to a terminal
    pub force_color: bool,

    /// Engine executable
    pub engine: Option<String>,
    /// Only count files written during this run
    pub fresh_only: bool,
    /// Wait for Enter before exiting
    pub pause: bool,

    /// Ignored values, reported once logging is up
    pub warnings: Vec<String>,
}

/// Flags that consume the following token as their value
const VALUE_FLAGS: &[&str] = &[
    "--output", "-o",
    "--prefix", "-p",
    "--format", "-f",
    "--dpi", "-d",
    "--color", "-c",
    "--source", "-s",
    "--device",
    "--driver",
    "--log-format",
    "--log-file",
    "--log-file-level",
    "--config-file",
    "--config-name",
    "--engine",
];

impl Args {
    /// Apply a value flag; values that do not parse are recorded and ignored
    fn apply_value(&mut self, flag: &str, value: String) {
        match flag {
            "--output" | "-o" => self.output = Some(value),
            "--prefix" | "-p" => self.prefix = Some(value),
            "--format" | "-f" => self.format = self.parse_or_keep(flag, &value, self.format),
            "--dpi" | "-d" => match value.trim().parse::<u32>() {
                Ok(dpi) if dpi > 0 => self.dpi = Some(dpi),
                _ => self
                    .warnings
                    .push(format!("Ignoring {} {}: expected a positive integer", flag, value)),
            },
            "--color" | "-c" => self.color = self.parse_or_keep(flag, &value, self.color),
            "--source" | "-s" => self.source = self.parse_or_keep(flag, &value, self.source),
            "--device" => self.device = Some(value),
            "--driver" => self.driver = self.parse_or_keep(flag, &value, self.driver),
            "--log-format" => self.log_format = Some(value),
            "--log-file" => self.log_file = Some(PathBuf::from(value)),
            "--log-file-level" => self.log_file_level = Some(value),
            "--config-file" => self.config_file = Some(PathBuf::from(value)),
            "--config-name" => self.config_name = Some(value),
            "--engine" => self.engine = Some(value),
            _ => {}
        }
    }

    fn parse_or_keep<T>(&mut self, flag: &str, value: &str, current: Option<T>) -> Option<T>
    where
        T: std::str::FromStr<Err = String>,
    {
        match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.warnings.push(format!("Ignoring {}: {}", flag, e));
                current
            }
        }
    }

    /// Apply a switch; returns false when the flag is not a known switch
    fn apply_switch(&mut self, flag: &str) -> bool {
        match flag {
            "--help" | "-h" => self.help = true,
            "--version" => self.version = true,
            "--verbose" | "-v" => self.verbose = true,
            "--quiet" | "-q" => self.quiet = true,
            "--debug" => self.debug = true,
            "--no-color" => self.no_color = true,
            "--force-color" => self.force_color = true,
            "--fresh-only" => self.fresh_only = true,
            "--pause" => self.pause = true,
            _ => return false,
        }
        true
    }
}

/// Parse arguments leniently
///
/// Flag names are case-insensitive and may be written `--flag=value`.
/// Unknown flags, stray positionals and a value flag with nothing after it
/// are ignored; a value that does not parse leaves the setting untouched.
pub fn parse_from_args<I, S>(tokens: I) -> Args
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = Args::default();
    let mut tokens = tokens.into_iter().map(Into::into);

    while let Some(token) = tokens.next() {
        if !token.starts_with('-') || token == "-" {
            debug!("Ignoring positional argument: {}", token);
            continue;
        }

        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name.to_lowercase(), Some(value.to_string())),
            _ => (token.to_lowercase(), None),
        };

        if VALUE_FLAGS.contains(&name.as_str()) {
            match inline_value.or_else(|| tokens.next()) {
                Some(value) => args.apply_value(&name, value),
                None => debug!("Ignoring {} without a value", name),
            }
        } else if !args.apply_switch(&name) {
            debug!("Ignoring unrecognised flag: {}", token);
        }
    }

    args
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    let args = parse_from_args(std::env::args().skip(1));
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    if let Some(ref format) = args.log_format {
        match format.to_lowercase().as_str() {
            "text" | "json" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log format '{}'. Valid options: text, json",
                    format
                ))
            }
        }
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace",
                    level
                ))
            }
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if args.no_color && args.force_color {
        return Err(anyhow::anyhow!(
            "Conflicting colour flags: --no-color and --force-color"
        ));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}

/// clap description of the interface, used for help and version output
pub fn build_command() -> Command {
    Command::new("scanwrap")
        .about("Scan documents through the NAPS2 console engine and verify the pages it produced")
        .version(clap::crate_version!())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .next_line_help(false)
        .arg(value_arg("output", Some('o'), "DIR", "Output folder (default: scanned_pages)"))
        .arg(value_arg("prefix", Some('p'), "TEXT", "File name prefix (default: page)"))
        .arg(value_arg("format", Some('f'), "FORMAT", "Output format: png, jpg, jpeg, tiff, bmp, pdf (default: png)"))
        .arg(value_arg("dpi", Some('d'), "N", "Resolution in DPI (default: 300)"))
        .arg(value_arg("color", Some('c'), "MODE", "Colour mode: color, gray, bw (default: color)"))
        .arg(value_arg("source", Some('s'), "SOURCE", "Paper source: feeder, glass (default: feeder)"))
        .arg(value_arg("device", None, "NAME", "Scanner device name (auto-detect if not specified)"))
        .arg(value_arg("driver", None, "DRIVER", "Scanner driver: wia, twain (default: wia)"))
        .arg(value_arg("engine", None, "PATH", "Engine executable (default: NAPS2.Console)"))
        .arg(switch_arg("fresh-only", None, "Only count output files written during this run"))
        .arg(switch_arg("pause", None, "Wait for Enter before exiting"))
        .arg(switch_arg("verbose", Some('v'), "Verbose output (debug level logging)"))
        .arg(switch_arg("quiet", Some('q'), "Quiet output (error level logging only)"))
        .arg(switch_arg("debug", None, "Debug output (trace level logging)"))
        .arg(value_arg("log-format", None, "FORMAT", "Log format: text or json"))
        .arg(value_arg("log-file", None, "FILE", "Log file path for file output"))
        .arg(value_arg("log-file-level", None, "LEVEL", "Log level for file output (independent of console level)"))
        .arg(value_arg("config-file", None, "FILE", "Configuration file path"))
        .arg(value_arg("config-name", None, "SECTION", "Configuration section name"))
        .arg(switch_arg("no-color", None, "Disable coloured output"))
        .arg(switch_arg("force-color", None, "Colour output even when not writing to a terminal"))
        .arg(switch_arg("help", Some('h'), "Show this help"))
        .arg(switch_arg("version", None, "Show version"))
        .after_help(EXAMPLES)
}

const EXAMPLES: &str = "\
EXAMPLES:
  scanwrap
    Basic scan with auto-detection

  scanwrap -o \"D:\\scans\" -p doc -f jpg -d 600 -c gray
    Custom folder, prefix, format, DPI and colour

  scanwrap --device \"Xerox WIA - ETE84DEC0F2B58\" --source feeder
    Specific device and source

  scanwrap --driver twain --format pdf --dpi 300
    Use the TWAIN driver and save as a single PDF";

fn value_arg(name: &'static str, short: Option<char>, value_name: &'static str, help: &'static str) -> Arg {
    let arg = Arg::new(name)
        .long(name)
        .value_name(value_name)
        .action(ArgAction::Set)
        .help(help);
    match short {
        Some(c) => arg.short(c),
        None => arg,
    }
}

fn switch_arg(name: &'static str, short: Option<char>, help: &'static str) -> Arg {
    let arg = Arg::new(name).long(name).action(ArgAction::SetTrue).help(help);
    match short {
        Some(c) => arg.short(c),
        None => arg,
    }
}

/// Rendered usage text
pub fn help_text() -> String {
    build_command().render_help().to_string()
}

/// Rendered version line
pub fn version_text() -> String {
    build_command().render_version()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> Args {
        parse_from_args(tokens.iter().copied())
    }

    #[test]
    fn test_no_arguments_leaves_everything_unset() {
        let args = parse(&[]);
        assert_eq!(args, Args::default());
    }

    #[test]
    fn test_long_and_short_forms() {
        let args = parse(&[
            "-o", "D:\\scans", "-p", "doc", "-f", "jpg", "-d", "600", "-c", "gray", "-s", "glass",
        ]);
        assert_eq!(args.output.as_deref(), Some("D:\\scans"));
        assert_eq!(args.prefix.as_deref(), Some("doc"));
        assert_eq!(args.format, Some(OutputFormat::Jpg));
        assert_eq!(args.dpi, Some(600));
        assert_eq!(args.color, Some(ColorMode::Gray));
        assert_eq!(args.source, Some(PaperSource::Glass));

        let args = parse(&[
            "--output", "out", "--prefix", "contract", "--format", "pdf", "--dpi", "150",
            "--color", "bw", "--source", "feeder", "--device", "Xerox WIA - ETE84DEC0F2B58",
            "--driver", "twain",
        ]);
        assert_eq!(args.output.as_deref(), Some("out"));
        assert_eq!(args.format, Some(OutputFormat::Pdf));
        assert_eq!(args.color, Some(ColorMode::Bw));
        assert_eq!(args.device.as_deref(), Some("Xerox WIA - ETE84DEC0F2B58"));
        assert_eq!(args.driver, Some(Driver::Twain));
    }

    #[test]
    fn test_flag_names_are_case_insensitive() {
        let args = parse(&["--FORMAT", "PDF", "-D", "200", "--Driver", "TWAIN", "-H"]);
        assert_eq!(args.format, Some(OutputFormat::Pdf));
        assert_eq!(args.dpi, Some(200));
        assert_eq!(args.driver, Some(Driver::Twain));
        assert!(args.help);
    }

    #[test]
    fn test_equals_syntax() {
        let args = parse(&["--dpi=450", "--device=Canon LiDE 300"]);
        assert_eq!(args.dpi, Some(450));
        assert_eq!(args.device.as_deref(), Some("Canon LiDE 300"));
    }

    #[test]
    fn test_non_numeric_dpi_keeps_prior_value() {
        let args = parse(&["--dpi", "abc"]);
        assert_eq!(args.dpi, None);
        assert_eq!(args.warnings.len(), 1);

        let args = parse(&["--dpi", "600", "--dpi", "abc"]);
        assert_eq!(args.dpi, Some(600));

        let args = parse(&["--dpi", "0"]);
        assert_eq!(args.dpi, None);
    }

    #[test]
    fn test_unknown_flag_does_not_stop_parsing() {
        let args = parse(&["--bogus", "--prefix", "invoice", "stray", "-z", "--format", "tiff"]);
        assert_eq!(args.prefix.as_deref(), Some("invoice"));
        assert_eq!(args.format, Some(OutputFormat::Tiff));
        assert!(args.warnings.is_empty());
    }

    #[test]
    fn test_trailing_value_flag_is_ignored() {
        let args = parse(&["--prefix", "scan", "--output"]);
        assert_eq!(args.prefix.as_deref(), Some("scan"));
        assert_eq!(args.output, None);
    }

    #[test]
    fn test_invalid_enum_value_keeps_prior_value() {
        let args = parse(&["--format", "pdf", "--format", "gif", "--color", "sepia"]);
        assert_eq!(args.format, Some(OutputFormat::Pdf));
        assert_eq!(args.color, None);
        assert_eq!(args.warnings.len(), 2);
    }

    #[test]
    fn test_ambient_flags() {
        let args = parse(&[
            "-v", "--log-format", "json", "--log-file", "scan.log", "--log-file-level", "debug",
            "--config-file", "my.toml", "--config-name", "office", "--no-color", "--engine",
            "/opt/naps2/naps2", "--fresh-only", "--pause", "--version",
        ]);
        assert!(args.verbose);
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert_eq!(args.log_file, Some(PathBuf::from("scan.log")));
        assert_eq!(args.log_file_level.as_deref(), Some("debug"));
        assert_eq!(args.config_file, Some(PathBuf::from("my.toml")));
        assert_eq!(args.config_name.as_deref(), Some("office"));
        assert!(args.no_color);
        assert_eq!(args.engine.as_deref(), Some("/opt/naps2/naps2"));
        assert!(args.fresh_only);
        assert!(args.pause);
        assert!(args.version);
    }

    #[test]
    fn test_validate_args_success() {
        let args = Args {
            verbose: true,
            log_format: Some("json".to_string()),
            ..Args::default()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_conflicting_flags() {
        let args = Args {
            verbose: true,
            quiet: true,
            ..Args::default()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            no_color: true,
            force_color: true,
            ..Args::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_invalid_format() {
        let args = Args {
            log_format: Some("xml".to_string()),
            ..Args::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_file_level_without_file() {
        let args = Args {
            log_file_level: Some("debug".to_string()),
            ..Args::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_clap_command_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn test_help_lists_every_value_flag() {
        let help = help_text();
        for flag in VALUE_FLAGS.iter().filter(|f| f.starts_with("--")) {
            assert!(help.contains(flag), "help text is missing {}", flag);
        }
        assert!(help.contains("EXAMPLES:"));
    }

    #[test]
    fn test_version_text() {
        assert!(version_text().contains(env!("CARGO_PKG_VERSION")));
    }
}
