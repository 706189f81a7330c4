//! The recipe lifecycle: one method per stage, strictly forward.
//!
//! ```text
//! Created -> LayoutResolved -> ToolchainGenerated -> SourceReady
//!         -> Built -> Packaged -> Described
//! ```
//!
//! A stage runs when the recipe is in the state the stage requires (advance)
//! or already in the state it produces (re-entry, state unchanged). A failing
//! stage leaves the state where it was.

use std::path::{Path, PathBuf};

use crate::builder::driver::{BuildDriver, BuildReport};
use crate::builder::meson::BuildTool;
use crate::builder::packager::{PackageReport, Packager};
use crate::builder::toolchain::{ToolchainFile, ToolchainGenerator};
use crate::core::consumer::{self, ConsumerInfo};
use crate::core::errors::RecipeError;
use crate::core::layout::{self, Layout};
use crate::core::options::Options;
use crate::core::recipe::Recipe;
use crate::core::settings::{BuildMachine, Settings};
use crate::core::stage::{RecipeState, Stage};
use crate::sources::{FetchStrategy, SourceAcquirer, SourceStatus};

/// Default package folder name under the base directory.
pub const PACKAGE_DIR: &str = "package";

/// Drives one recipe instance through its stages.
pub struct Lifecycle<'a, T: BuildTool> {
    recipe: &'a Recipe,
    settings: Settings,
    options: Options,
    tool: T,
    base: PathBuf,
    package_folder: PathBuf,
    strategy: FetchStrategy,
    build_machine: Option<BuildMachine>,

    state: RecipeState,
    layout: Option<Layout>,
    toolchain: Option<ToolchainFile>,
}

impl<'a, T: BuildTool> Lifecycle<'a, T> {
    /// Bind a recipe to its settings, options, build tool and base directory.
    ///
    /// The package folder defaults to `<base>/package`, the fetch strategy to
    /// shallow, and the build machine to none (native build).
    pub fn new(
        recipe: &'a Recipe,
        settings: Settings,
        options: Options,
        tool: T,
        base: impl Into<PathBuf>,
    ) -> Self {
        let base = base.into();
        Lifecycle {
            recipe,
            settings,
            options,
            tool,
            package_folder: base.join(PACKAGE_DIR),
            base,
            strategy: FetchStrategy::default(),
            build_machine: None,
            state: RecipeState::Created,
            layout: None,
            toolchain: None,
        }
    }

    pub fn with_package_folder(mut self, package_folder: impl Into<PathBuf>) -> Self {
        self.package_folder = package_folder.into();
        self
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Machine the build runs on; decides native vs cross toolchain files.
    pub fn with_build_machine(mut self, build_machine: Option<BuildMachine>) -> Self {
        self.build_machine = build_machine;
        self
    }

    pub fn state(&self) -> RecipeState {
        self.state
    }

    pub fn recipe(&self) -> &Recipe {
        self.recipe
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn package_folder(&self) -> &Path {
        &self.package_folder
    }

    /// The resolved layout, once `layout` has run.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// The generated toolchain file, once `generate` has run.
    pub fn toolchain(&self) -> Option<&ToolchainFile> {
        self.toolchain.as_ref()
    }

    /// Set an option; fails once the toolchain has been generated.
    pub fn set_option(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        self.options.set(key, value)
    }

    /// Resolve source and build folders.
    pub fn resolve_layout(&mut self) -> Result<Layout, RecipeError> {
        self.run_stage(Stage::Layout, |lc| {
            let layout = layout::resolve(lc.recipe, &lc.base)?;
            lc.layout = Some(layout.clone());
            Ok(layout)
        })
    }

    /// Write the toolchain file and freeze the options.
    pub fn generate(&mut self) -> Result<ToolchainFile, RecipeError> {
        self.run_stage(Stage::Generate, |lc| {
            let build_folder = lc.require_layout(Stage::Generate)?.build_folder.clone();
            let toolchain = ToolchainGenerator::new(&lc.settings, &lc.options, lc.build_machine)
                .generate(&build_folder)?;
            lc.options.freeze();
            lc.toolchain = Some(toolchain.clone());
            Ok(toolchain)
        })
    }

    /// Make sure the source folder holds the versioned source tree.
    pub fn source(&mut self) -> Result<SourceStatus, RecipeError> {
        self.run_stage(Stage::Source, |lc| {
            let layout = lc.require_layout(Stage::Source)?;
            SourceAcquirer::for_recipe(lc.recipe, lc.strategy).acquire(&layout.source_folder)
        })
    }

    /// Configure (when needed) and compile.
    pub fn build(&mut self) -> Result<BuildReport, RecipeError> {
        self.run_stage(Stage::Build, |lc| {
            let layout = lc.require_layout(Stage::Build)?;
            let toolchain = lc.require_toolchain(Stage::Build)?;
            BuildDriver::new(&lc.tool).run(layout, toolchain)
        })
    }

    /// Install into the package folder, copy headers, write the manifest.
    pub fn package(&mut self) -> Result<PackageReport, RecipeError> {
        self.run_stage(Stage::Package, |lc| {
            let layout = lc.require_layout(Stage::Package)?;
            Packager::new(lc.recipe, layout, &lc.package_folder).run(&lc.tool)
        })
    }

    /// Describe the package for consumers.
    pub fn describe(&mut self) -> Result<ConsumerInfo, RecipeError> {
        self.run_stage(Stage::PackageInfo, |lc| {
            consumer::describe(lc.recipe.identity(), &lc.package_folder)
        })
    }

    /// Run a single stage by name, discarding its report.
    pub fn step(&mut self, stage: Stage) -> Result<(), RecipeError> {
        match stage {
            Stage::Layout => self.resolve_layout().map(drop),
            Stage::Generate => self.generate().map(drop),
            Stage::Source => self.source().map(drop),
            Stage::Build => self.build().map(drop),
            Stage::Package => self.package().map(drop),
            Stage::PackageInfo => self.describe().map(drop),
        }
    }

    /// Run every remaining stage up to and including `target`.
    pub fn run_until(&mut self, target: RecipeState) -> Result<(), RecipeError> {
        for stage in Self::pending(self.state, target) {
            self.step(stage)?;
        }
        Ok(())
    }

    /// Run the whole lifecycle and return the consumer info.
    pub fn run(&mut self) -> Result<ConsumerInfo, RecipeError> {
        self.run_until(RecipeState::Packaged)?;
        self.describe()
    }

    /// Stages that move `from` forward to `target`, in order.
    pub fn pending(from: RecipeState, target: RecipeState) -> Vec<Stage> {
        Stage::ALL
            .iter()
            .copied()
            .filter(|s| s.produces() > from && s.produces() <= target)
            .collect()
    }

    fn check(&self, stage: Stage) -> Result<(), RecipeError> {
        if self.state == stage.requires() || self.state == stage.produces() {
            Ok(())
        } else {
            Err(RecipeError::OutOfOrder {
                stage,
                state: self.state,
            })
        }
    }

    fn run_stage<R>(
        &mut self,
        stage: Stage,
        f: impl FnOnce(&mut Self) -> Result<R, RecipeError>,
    ) -> Result<R, RecipeError> {
        self.check(stage)?;
        tracing::debug!("{}: running `{}` from {}", self.recipe.identity(), stage, self.state);

        match f(self) {
            Ok(out) => {
                self.state = stage.produces();
                tracing::debug!("{}: `{}` done, now {}", self.recipe.identity(), stage, self.state);
                Ok(out)
            }
            Err(e) => {
                tracing::debug!("{}: `{}` failed in {}", self.recipe.identity(), stage, self.state);
                Err(e)
            }
        }
    }

    fn require_layout(&self, stage: Stage) -> Result<&Layout, RecipeError> {
        self.layout.as_ref().ok_or_else(|| RecipeError::Lifecycle {
            stage,
            message: "layout has not been resolved".to_string(),
        })
    }

    fn require_toolchain(&self, stage: Stage) -> Result<&ToolchainFile, RecipeError> {
        self.toolchain.as_ref().ok_or_else(|| RecipeError::Lifecycle {
            stage,
            message: "toolchain file has not been generated".to_string(),
        })
    }
}
