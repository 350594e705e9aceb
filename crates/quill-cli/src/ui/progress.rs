//! Progress indicators for long-running operations using indicatif.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A spinner for indeterminate progress, drawn on stderr.
///
/// Without a terminal (or in quiet mode) the spinner is inert.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    /// Create a spinner with the given message.
    pub fn new(message: &str, quiet: bool) -> Self {
        let animate = !quiet && std::io::stderr().is_terminal();
        Self::with_animation(message, animate)
    }

    fn with_animation(message: &str, animate: bool) -> Self {
        if !animate {
            return Self { bar: None };
        }
        let pb = ProgressBar::new_spinner();
        // The template is a constant; fall back to the default style if it is ever rejected.
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}...")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", ""]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        Self { bar: Some(pb) }
    }

    /// Begin animating.
    pub fn start(&self) {
        if let Some(bar) = &self.bar {
            bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    /// Stop and clear the spinner line.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_spinner_is_inert() {
        let spinner = Spinner::new("Deriving key", true);
        assert!(spinner.bar.is_none());
        spinner.start();
        spinner.finish();
    }

    #[test]
    fn test_animated_spinner_finishes() {
        let spinner = Spinner::with_animation("Deriving key", true);
        assert!(spinner.bar.is_some());
        spinner.start();
        spinner.finish();
    }
}
