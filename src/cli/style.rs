//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the ANSI codes when stdout
//! is not a terminal.

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use std::fmt::Display;

/// Semantic colors for CLI output
pub trait Stylize: Display + Sized {
    /// De-emphasized text
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    /// Headings and names
    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    /// Identifiers such as repositories and PR numbers
    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    /// Positive outcome
    fn success(&self) -> String {
        self.green().to_string()
    }

    /// Recoverable problem
    fn warn(&self) -> String {
        self.yellow().to_string()
    }

    /// Failure
    fn error(&self) -> String {
        self.red().to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    "✓".success()
}

/// Red cross
pub fn cross() -> String {
    "✗".error()
}

/// Spinner style shared by long-running commands
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
