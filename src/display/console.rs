//! Operator-facing output sink
//!
//! Scan progress, engine output and the final report are written through a
//! `Console` rather than straight to stdout, so tests can capture every line.

use parking_lot::Mutex;

use super::ColourManager;

/// Kind of operator message; decides colouring only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Plain,
    Highlight,
    Success,
    Warning,
    Error,
    /// Line relayed from the engine's standard output
    EngineOutput,
    /// Line relayed from the engine's standard error
    EngineError,
}

/// Destination for operator messages
pub trait Console: Send + Sync {
    fn emit(&self, kind: MessageKind, text: &str);

    fn plain(&self, text: &str) {
        self.emit(MessageKind::Plain, text);
    }

    fn highlight(&self, text: &str) {
        self.emit(MessageKind::Highlight, text);
    }

    fn success(&self, text: &str) {
        self.emit(MessageKind::Success, text);
    }

    fn warning(&self, text: &str) {
        self.emit(MessageKind::Warning, text);
    }

    fn error(&self, text: &str) {
        self.emit(MessageKind::Error, text);
    }

    fn blank(&self) {
        self.emit(MessageKind::Plain, "");
    }
}

/// Writes to stdout, coloured through a `ColourManager`
#[derive(Debug, Clone, Default)]
pub struct TerminalConsole {
    colours: ColourManager,
}

impl TerminalConsole {
    pub fn new(colours: ColourManager) -> Self {
        Self { colours }
    }

    fn render(&self, kind: MessageKind, text: &str) -> String {
        match kind {
            MessageKind::Plain | MessageKind::EngineOutput => text.to_string(),
            MessageKind::Highlight => self.colours.highlight(text).to_string(),
            MessageKind::Success => self.colours.success(text).to_string(),
            MessageKind::Warning => self.colours.warning(text).to_string(),
            MessageKind::Error | MessageKind::EngineError => self.colours.error(text).to_string(),
        }
    }
}

impl Console for TerminalConsole {
    fn emit(&self, kind: MessageKind, text: &str) {
        println!("{}", self.render(kind, text));
    }
}

/// Captures messages in memory
#[derive(Debug, Default)]
pub struct MemoryConsole {
    messages: Mutex<Vec<(MessageKind, String)>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured text, without kinds
    pub fn lines(&self) -> Vec<String> {
        self.messages.lock().iter().map(|(_, text)| text.clone()).collect()
    }

    /// Captured text of one kind
    pub fn lines_of(&self, kind: MessageKind) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Whether any captured line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|(_, text)| text.contains(needle))
    }
}

impl Console for MemoryConsole {
    fn emit(&self, kind: MessageKind, text: &str) {
        self.messages.lock().push((kind, text.to_string()));
    }
}
