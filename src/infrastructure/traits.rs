//! I/O boundary traits for testability
//!
//! Services narrate through [`Console`] instead of printing directly, so
//! tests can capture and assert on what a demo says.

use colored::Colorize;
use parking_lot::Mutex;

/// How a narration line should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Header,
    Success,
    Warning,
    Failure,
}

/// Line-oriented narration sink.
pub trait Console: Send + Sync {
    /// Emit one line with the given tone.
    fn emit(&self, tone: Tone, msg: &str);

    fn line(&self, msg: &str) {
        self.emit(Tone::Plain, msg);
    }

    fn header(&self, msg: &str) {
        self.emit(Tone::Header, msg);
    }

    fn success(&self, msg: &str) {
        self.emit(Tone::Success, msg);
    }

    fn warning(&self, msg: &str) {
        self.emit(Tone::Warning, msg);
    }

    fn failure(&self, msg: &str) {
        self.emit(Tone::Failure, msg);
    }

    fn blank(&self) {
        self.emit(Tone::Plain, "");
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Console writing to stdout.
///
/// Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE through `colored`.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn emit(&self, tone: Tone, msg: &str) {
        match tone {
            Tone::Plain => println!("{}", msg),
            Tone::Header => println!("{}", msg.cyan().bold()),
            Tone::Success => println!("{}", msg.green()),
            Tone::Warning => println!("{}", msg.yellow()),
            Tone::Failure => println!("{}", msg.red()),
        }
    }
}

/// Console that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    entries: Mutex<Vec<(Tone, String)>>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines with their tones, in emission order.
    pub fn entries(&self) -> Vec<(Tone, String)> {
        self.entries.lock().clone()
    }

    /// Recorded lines as plain text.
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, msg)| msg.clone()).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.lock().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl Console for RecordingConsole {
    fn emit(&self, tone: Tone, msg: &str) {
        self.entries.lock().push((tone, msg.to_string()));
    }
}
