//! Shell output and progress for the CLI.
//!
//! Status lines go to stderr as `{status:>12} {message}` so stdout stays
//! free for machine-readable output (`--json`, `info --format json`).
//! Long-running stages get a spinner unless output is verbose or stderr is
//! not a terminal.

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Default: status messages + spinners
    #[default]
    Normal,
    /// --verbose: status lines and debug logs, no spinners
    Verbose,
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Finished,
    Packaged,
    Exported,
    Removed,

    // In-progress statuses (cyan)
    Resolving,
    Generating,
    Fetching,
    Building,
    Packaging,

    // Warning statuses (yellow)
    Skipped,
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Packaged => "Packaged",
            Status::Exported => "Exported",
            Status::Removed => "Removed",
            Status::Resolving => "Resolving",
            Status::Generating => "Generating",
            Status::Fetching => "Fetching",
            Status::Building => "Building",
            Status::Packaging => "Packaging",
            Status::Skipped => "Skipped",
            Status::Warning => "Warning",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Packaged | Status::Exported | Status::Removed => "\x1b[1;32m",
            Status::Resolving
            | Status::Generating
            | Status::Fetching
            | Status::Building
            | Status::Packaging => "\x1b[1;36m",
            Status::Skipped | Status::Warning => "\x1b[1;33m",
        }
    }
}

/// Central shell for all CLI output.
#[derive(Debug, Clone)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
    interactive: bool,
}

impl Shell {
    pub fn new(verbosity: Verbosity) -> Self {
        let interactive = io::stderr().is_terminal();
        Shell {
            verbosity,
            use_color: interactive,
            interactive,
        }
    }

    pub fn from_flags(verbose: bool) -> Self {
        Shell::new(if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        })
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    pub fn status(&self, status: Status, msg: impl Display) {
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    fn format_status(&self, status: Status) -> String {
        if self.use_color {
            format!("{}{:>12}\x1b[0m", status.color_code(), status.as_str())
        } else {
            format!("{:>12}", status.as_str())
        }
    }

    /// Start a spinner for a long-running step.
    ///
    /// The status line is printed either way; the spinner only runs on an
    /// interactive, non-verbose terminal.
    pub fn spinner(&self, status: Status, msg: impl Display) -> Spinner {
        self.status(status, &msg);

        let pb = if self.interactive && !self.is_verbose() {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})") {
                pb.set_style(style);
            }
            pb.set_message(msg.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        Spinner {
            pb,
            start: Instant::now(),
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(Verbosity::Normal)
    }
}

/// A running spinner; cleared when finished or dropped.
pub struct Spinner {
    pb: Option<ProgressBar>,
    start: Instant,
}

impl Spinner {
    /// Stop the spinner and return how long the step took.
    pub fn finish(self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
    }
}

/// Format a duration the way status lines show it.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = d.as_secs() / 60;
        format!("{}m {:02}s", mins, d.as_secs() % 60)
    }
}
