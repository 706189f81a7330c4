//! Recipe error taxonomy.
//!
//! Every error knows which lifecycle stage raised it, so the host can report
//! "my settings are wrong" separately from "the library failed to compile".

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::stage::{RecipeState, Stage};
use crate::util::diagnostic::{suggestions, Diagnostic};
use crate::util::process::ToolFailure;

/// Error raised while loading or running a recipe.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum RecipeError {
    /// Bad recipe, settings, options, or unusable paths.
    #[error("{message}")]
    #[diagnostic(code(quay::configuration))]
    Configuration {
        stage: Option<Stage>,
        message: String,
    },

    /// The settings have no mapping to build-tool flags.
    #[error("unsupported settings {settings}: {reason}")]
    #[diagnostic(
        code(quay::generate::unsupported_settings),
        help("pick a supported os/compiler/arch combination or extend the toolchain mapping")
    )]
    UnsupportedSettings { settings: String, reason: String },

    /// The source tree could not be fetched.
    #[error("failed to fetch `{reference}` from {url}: {message}")]
    #[diagnostic(code(quay::source::fetch_failed))]
    SourceFetch {
        url: String,
        reference: String,
        message: String,
    },

    /// The build tool's configure step failed.
    #[error("configure failed: {failure}")]
    #[diagnostic(code(quay::build::configure_failed))]
    Configure {
        #[source]
        failure: ToolFailure,
    },

    /// The build tool's compile step failed.
    #[error("build failed: {failure}")]
    #[diagnostic(code(quay::build::compile_failed))]
    Build {
        #[source]
        failure: ToolFailure,
    },

    /// Installing or copying into the package folder failed.
    #[error("packaging failed: {message}")]
    #[diagnostic(code(quay::package::failed))]
    Packaging {
        message: String,
        output: Option<String>,
    },

    /// A stage was invoked in the wrong order.
    #[error("cannot run `{stage}` while the recipe is {state}")]
    #[diagnostic(code(quay::lifecycle::out_of_order))]
    OutOfOrder { stage: Stage, state: RecipeState },

    /// An upstream ordering bug was detected.
    #[error("{message}")]
    #[diagnostic(code(quay::lifecycle::ordering_bug))]
    Lifecycle { stage: Stage, message: String },
}

impl RecipeError {
    /// Configuration error raised by a lifecycle stage.
    pub fn configuration(stage: Stage, message: impl Into<String>) -> Self {
        RecipeError::Configuration {
            stage: Some(stage),
            message: message.into(),
        }
    }

    /// Configuration error raised while loading the recipe or host inputs.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RecipeError::Configuration {
            stage: None,
            message: message.into(),
        }
    }

    pub fn packaging(message: impl Into<String>) -> Self {
        RecipeError::Packaging {
            message: message.into(),
            output: None,
        }
    }

    /// The stage that raised this error, if it came from a stage at all.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RecipeError::Configuration { stage, .. } => *stage,
            RecipeError::UnsupportedSettings { .. } => Some(Stage::Generate),
            RecipeError::SourceFetch { .. } => Some(Stage::Source),
            RecipeError::Configure { .. } | RecipeError::Build { .. } => Some(Stage::Build),
            RecipeError::Packaging { .. } => Some(Stage::Package),
            RecipeError::OutOfOrder { stage, .. } | RecipeError::Lifecycle { stage, .. } => {
                Some(*stage)
            }
        }
    }

    /// Tool output to show verbatim, if the error carries any.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            RecipeError::Configure { failure } | RecipeError::Build { failure } => {
                Some(failure.output.as_str())
            }
            RecipeError::Packaging { output, .. } => output.as_deref(),
            _ => None,
        }
    }

    /// Whether the caller may reasonably retry without changing anything.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecipeError::SourceFetch { .. })
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = self.stage().map(|s| s.as_str()).unwrap_or("recipe");
        let mut diag = Diagnostic::error(self.to_string()).with_label(label);

        if let Some(output) = self.tool_output() {
            diag = diag.with_output(output);
        }

        match self {
            RecipeError::Configuration { .. } | RecipeError::UnsupportedSettings { .. } => {
                diag.with_suggestion(suggestions::CHECK_SETTINGS)
            }
            RecipeError::SourceFetch { .. } => diag.with_suggestion(suggestions::FETCH_FAILED),
            RecipeError::Configure { .. } | RecipeError::Build { .. } => {
                diag.with_suggestion(suggestions::BUILD_VERBOSE)
            }
            RecipeError::OutOfOrder { .. } | RecipeError::Lifecycle { .. } => {
                diag.with_suggestion(suggestions::RESTART_LIFECYCLE)
            }
            RecipeError::Packaging { .. } => diag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::process::FailureStatus;

    #[test]
    fn test_build_error_keeps_tool_output() {
        let err = RecipeError::Build {
            failure: ToolFailure {
                command: "meson compile -C builddir".to_string(),
                status: FailureStatus::Exited(1),
                output: "sys.c:3: error: unknown type name 'uint'\n".to_string(),
            },
        };

        assert_eq!(err.stage(), Some(Stage::Build));
        let text = err.to_diagnostic().format(false);
        assert!(text.starts_with("error[build]: build failed: `meson compile -C builddir` exited with code 1"));
        assert!(text.contains("unknown type name 'uint'"));
    }

    #[test]
    fn test_stage_labels() {
        let err = RecipeError::invalid_input("unknown option `static`");
        assert_eq!(err.stage(), None);
        assert!(err.to_diagnostic().format(false).starts_with("error[recipe]:"));

        let err = RecipeError::SourceFetch {
            url: "https://example.com/x".to_string(),
            reference: "v1.0.0".to_string(),
            message: "tag not found".to_string(),
        };
        assert_eq!(err.stage(), Some(Stage::Source));
        assert!(err.is_retryable());
    }
}
