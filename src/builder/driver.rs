//! Configure-then-build against a resolved layout.

use std::path::Path;

use crate::builder::fingerprint::ConfigureStamp;
use crate::builder::meson::BuildTool;
use crate::builder::toolchain::ToolchainFile;
use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::stage::Stage;
use crate::util::fs::ensure_dir;
use crate::util::process::{FailureStatus, ToolFailure};

/// Build description that must exist in the source folder.
pub const BUILD_DESCRIPTION: &str = "meson.build";

/// What happened to the configure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureAction {
    /// First configure of this build folder
    Fresh,
    /// Inputs changed; the previous configuration was wiped
    Reconfigured,
    /// Inputs unchanged; configure was skipped
    Skipped,
}

/// Outcome of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub configure: ConfigureAction,
    pub stamp: ConfigureStamp,
}

/// Drives a `BuildTool` through configure and build.
pub struct BuildDriver<'a, T: BuildTool> {
    tool: &'a T,
}

impl<'a, T: BuildTool> BuildDriver<'a, T> {
    pub fn new(tool: &'a T) -> Self {
        BuildDriver { tool }
    }

    /// Configure (when needed) and build.
    pub fn run(&self, layout: &Layout, toolchain: &ToolchainFile) -> Result<BuildReport, RecipeError> {
        let (configure, stamp) = self.configure(layout, toolchain)?;

        tracing::info!("building {}", layout.build_folder.display());
        self.tool
            .build(&layout.build_folder)
            .map_err(|failure| RecipeError::Build { failure })?;

        Ok(BuildReport { configure, stamp })
    }

    fn configure(
        &self,
        layout: &Layout,
        toolchain: &ToolchainFile,
    ) -> Result<(ConfigureAction, ConfigureStamp), RecipeError> {
        let source = &layout.source_folder;
        let build = &layout.build_folder;

        if !source.join(BUILD_DESCRIPTION).is_file() {
            return Err(RecipeError::Configure {
                failure: missing_build_description(self.tool.name(), source),
            });
        }

        ensure_dir(build).map_err(|e| RecipeError::configuration(Stage::Build, format!("{:#}", e)))?;

        let current = ConfigureStamp::compute(toolchain, source, self.tool.name());
        let configured = self.tool.is_configured(build);
        let previous = ConfigureStamp::load(build);

        let action = match previous {
            Some(ref prev) if configured && prev.matches(&current) => ConfigureAction::Skipped,
            _ if configured => ConfigureAction::Reconfigured,
            _ => ConfigureAction::Fresh,
        };

        match action {
            ConfigureAction::Skipped => {
                tracing::info!("configuration of {} is up to date", build.display());
                return Ok((action, current));
            }
            ConfigureAction::Reconfigured => {
                tracing::info!("inputs changed, reconfiguring {}", build.display());
            }
            ConfigureAction::Fresh => {
                tracing::info!("configuring {} with {}", build.display(), self.tool.name());
            }
        }

        self.tool
            .configure(source, build, toolchain, action == ConfigureAction::Reconfigured)
            .map_err(|failure| RecipeError::Configure { failure })?;

        if let Err(e) = current.save(build) {
            tracing::warn!("failed to record configure stamp: {:#}", e);
        }

        Ok((action, current))
    }
}

fn missing_build_description(tool: &str, source: &Path) -> ToolFailure {
    ToolFailure {
        command: format!("{} setup", tool),
        status: FailureStatus::NotStarted,
        output: format!(
            "`{}` not found in source folder `{}`",
            BUILD_DESCRIPTION,
            source.display()
        ),
    }
}
