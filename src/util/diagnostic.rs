//! User-facing diagnostic messages.
//!
//! Every failure names the stage it came from, carries the tool output that
//! explains it, and suggests what to change.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages.
pub mod suggestions {
    pub const NO_RECIPE: &str = "Run quay from a directory containing Recipe.toml, or pass --recipe";
    pub const CHECK_SETTINGS: &str = "Check the -s/-o values and the [settings] section of .quay/config.toml";
    pub const FETCH_FAILED: &str = "Check your network connection and that the tag exists upstream";
    pub const BUILD_VERBOSE: &str = "Re-run with --verbose to see every tool invocation";
    pub const RESTART_LIFECYCLE: &str = "Run the earlier stages first, e.g. `quay create`";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional output and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Short label shown next to the severity, e.g. the stage name
    pub label: Option<String>,
    /// Verbatim lines from the failing tool
    pub output: Vec<String>,
    pub suggestions: Vec<String>,
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            label: None,
            output: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach tool output; each line is kept as-is.
    pub fn with_output(mut self, output: &str) -> Self {
        self.output
            .extend(output.lines().map(|l| l.trim_end().to_string()));
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::new();

        let head = match &self.label {
            Some(label) => format!("{}[{}]", self.severity, label),
            None => self.severity.to_string(),
        };
        let head = if color {
            let code = match self.severity {
                Severity::Error => "1;31",
                Severity::Warning => "1;33",
            };
            format!("\x1b[{}m{}\x1b[0m", code, head)
        } else {
            head
        };
        out.push_str(&format!("{}: {}\n", head, self.message));

        if let Some(ref path) = self.location {
            out.push_str(&format!("  --> {}\n", path.display()));
        }

        if !self.output.is_empty() {
            out.push_str("  |\n");
            for line in &self.output {
                out.push_str(&format!("  | {}\n", line));
            }
        }

        if !self.suggestions.is_empty() {
            out.push('\n');
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            for suggestion in &self.suggestions {
                out.push_str(&format!("{}: {}\n", help, suggestion));
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("build failed: `meson compile -C builddir` exited with code 1")
            .with_label("build")
            .with_output("../code/sys.c:12:5: error: expected ';'\nninja: build stopped")
            .with_suggestion("Re-run with --verbose");

        let out = diag.format(false);
        assert!(out.starts_with("error[build]: build failed"));
        assert!(out.contains("  | ../code/sys.c:12:5: error: expected ';'"));
        assert!(out.contains("  | ninja: build stopped"));
        assert!(out.contains("help: Re-run with --verbose"));
    }

    #[test]
    fn test_warning_without_label() {
        let out = Diagnostic::warning("no headers matched").format(false);
        assert_eq!(out, "warning: no headers matched\n");
    }
}
