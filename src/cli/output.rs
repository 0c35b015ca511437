//! Output formatting and progress indicators
//!
//! This module renders core [`Message`] values for the terminal, shows a
//! spinner while a batch runs, and mirrors every message to `tracing`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::core::result::{DownloadResult, Message, ResultSink};

/// Output settings selected by the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,
    /// Machine-readable output on stdout
    pub json: bool,
    /// Verbosity level from `-v`
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Whether human-oriented progress output is wanted
    pub fn is_interactive(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Print a success line unless quiet or JSON
    pub fn success(&self, text: &str) {
        if self.is_interactive() {
            println!("{} {text}", status::SUCCESS);
        }
    }

    /// Print `value` as pretty JSON on stdout
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Render a message as one terminal line
pub fn format_message(message: &Message) -> String {
    match message.kind() {
        Some(kind) => format!("{} [{kind}] {}", status::ERROR, message.render()),
        None => format!("{} {}", status::SUCCESS, message.render()),
    }
}

/// Mirror a message to the tracing subscriber
fn trace_message(message: &Message) {
    match message.kind() {
        Some(kind) if kind.is_retryable() => {
            tracing::warn!(kind = %kind, "{}", message.render());
        }
        Some(kind) => tracing::error!(kind = %kind, "{}", message.render()),
        None => tracing::info!("{}", message.render()),
    }
}

/// Console sink for batch messages
///
/// Text mode prints each outcome as it completes; errors go to stderr and
/// survive `--quiet`. JSON mode stays silent until [`ConsoleSink::finish`]
/// prints the whole result.
pub struct ConsoleSink {
    config: OutputConfig,
    spinner: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new(config: OutputConfig) -> Self {
        Self {
            config,
            spinner: None,
        }
    }

    /// Show a spinner with `message` until [`ConsoleSink::finish`]
    #[must_use]
    pub fn with_spinner(mut self, message: &str) -> Self {
        if self.config.is_interactive() {
            self.spinner = Some(create_spinner(message));
        }
        self
    }

    /// Stop the spinner and print the batch outcome
    pub fn finish(&self, result: &DownloadResult) -> anyhow::Result<()> {
        if let Some(spinner) = &self.spinner {
            spinner.finish_and_clear();
        }

        let summary = result.summary();
        trace_message(&summary);

        if self.config.json {
            return self.config.print_json(result);
        }
        if !self.config.quiet {
            println!("{}", summary.render());
        }
        Ok(())
    }

    fn print(&self, line: &str, to_stderr: bool) {
        let write = || {
            if to_stderr {
                eprintln!("{line}");
            } else {
                println!("{line}");
            }
        };
        match &self.spinner {
            Some(spinner) => spinner.suspend(write),
            None => write(),
        }
    }
}

impl ResultSink for ConsoleSink {
    fn emit(&self, message: &Message) {
        trace_message(message);

        if self.config.json || (self.config.quiet && !message.is_error()) {
            return;
        }
        self.print(&format_message(message), message.is_error());
    }
}

/// Display a top-level error
pub fn display_error(error: &anyhow::Error, config: &OutputConfig) {
    if config.json {
        let body = serde_json::json!({ "error": format!("{error:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("{} Error: {error:#}", status::ERROR);
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}
