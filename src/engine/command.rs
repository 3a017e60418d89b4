//! Engine argument construction

use crate::scan::ScanRequest;

/// Ordered argument vector for one scan invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    args: Vec<String>,
}

impl EngineCommand {
    /// Map a request and its resolved device onto the engine's options
    ///
    /// Values are passed through as-is; the request's types already restrict
    /// them to the tokens the engine understands.
    pub fn build(request: &ScanRequest, device: &str) -> Self {
        let args = vec![
            "--driver".to_string(),
            request.driver.to_string(),
            "--device".to_string(),
            device.to_string(),
            "--source".to_string(),
            request.source.to_string(),
            "--dpi".to_string(),
            request.dpi.to_string(),
            "--bitdepth".to_string(),
            request.color.to_string(),
            "--output".to_string(),
            request.output_path().to_string_lossy().into_owned(),
            "--verbose".to_string(),
        ];
        Self { args }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value following `option`, if present
    #[cfg(test)]
    pub fn value_of(&self, option: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == option)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }

    /// Human-readable command line, quoting arguments that contain spaces
    pub fn display_line(&self, executable: &str) -> String {
        std::iter::once(executable)
            .chain(self.args.iter().map(String::as_str))
            .map(quote_if_needed)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_if_needed(arg: &str) -> String {
    if arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}
