//! Text-format terminal output
//!
//! Status lines start with a colored mark. Errors and warnings go to stderr
//! so `--format json` output on stdout stays parseable.

use console::{Style, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Warning,
    Error,
    Info,
}

impl Level {
    fn mark(self) -> &'static str {
        match self {
            Level::Success => "✓",
            Level::Warning => "!",
            Level::Error => "✗",
            Level::Info => "→",
        }
    }

    fn style(self) -> Style {
        match self {
            Level::Success => Style::new().green().bold(),
            Level::Warning => Style::new().yellow().bold(),
            Level::Error => Style::new().red().bold(),
            Level::Info => Style::new().blue(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Warning | Level::Error)
    }
}

fn status_line(level: Level, message: &str) -> String {
    format!("{} {}", level.style().apply_to(level.mark()), message)
}

fn emit(level: Level, message: &str) {
    let term = if level.to_stderr() {
        Term::stderr()
    } else {
        Term::stdout()
    };
    // Nothing useful to do when the terminal is gone
    let _ = term.write_line(&status_line(level, message));
}

pub fn success(message: &str) {
    emit(Level::Success, message);
}

pub fn error(message: &str) {
    emit(Level::Error, message);
}

pub fn warning(message: &str) {
    emit(Level::Warning, message);
}

pub fn info(message: &str) {
    emit(Level::Info, message);
}

/// Section title above a block of `key_value` lines
pub fn header(text: &str) -> String {
    Style::new().bold().underlined().apply_to(text).to_string()
}

/// Indented `key: value` line with a dimmed key
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", Style::new().dim().apply_to(key), value)
}

pub fn version_style() -> Style {
    Style::new().green().bold()
}

pub fn path_style() -> Style {
    Style::new().cyan()
}
