//! Command implementations

pub mod clean;
pub mod completions;
pub mod export;
pub mod info;
pub mod inspect;
pub mod layout;
pub mod lifecycle;
pub mod toolchain;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::{GlobalArgs, ProfileArgs};
use quay::core::settings::{BuildMachine, PartialSettings};
use quay::ops::lifecycle::PACKAGE_DIR;
use quay::util::config::Config;
use quay::util::{GlobalContext, Shell};
use quay::{MesonTool, Options, Recipe, Settings};

/// Everything a command needs once the recipe has been found.
pub struct Session {
    pub ctx: GlobalContext,
    pub recipe: Recipe,
    pub config: Config,
    pub shell: Shell,
}

impl Session {
    /// Locate and load the recipe, then the config next to it.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let mut ctx = GlobalContext::new()?;
        ctx.set_verbose(global.verbose);

        let path = ctx.recipe_path(global.recipe.as_deref())?;
        let recipe = Recipe::load(&path)?;
        let config = ctx.load_config(recipe.recipe_dir());
        let shell = Shell::from_flags(global.verbose || config.build.verbose);

        Ok(Session {
            ctx,
            recipe,
            config,
            shell,
        })
    }

    /// Base directory the layout is resolved against.
    pub fn base(&self) -> &Path {
        self.recipe.recipe_dir()
    }

    /// Package folder: explicit flag, else `<base>/package`.
    pub fn package_folder(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(dir) => self.ctx.cwd().join(dir),
            None => self.base().join(PACKAGE_DIR),
        }
    }

    /// Settings: `-s` flags over `[settings]` config over detection.
    pub fn settings(&self, profile: &ProfileArgs) -> Result<Settings> {
        let cli = PartialSettings::from_assignments(&profile.settings)?;
        let config = self.config.settings.to_partial()?;
        Ok(Settings::resolve(&cli.or(config))?)
    }

    /// Options: recipe defaults with `-o` flags applied.
    pub fn options(&self, profile: &ProfileArgs) -> Result<Options> {
        let mut options = Options::from_defaults(self.recipe.option_defaults());
        options.apply_assignments(&profile.options)?;
        Ok(options)
    }

    /// The Meson driver: configured program or PATH lookup.
    pub fn meson(&self, jobs: Option<usize>) -> MesonTool {
        let tool = match &self.config.build.meson {
            Some(program) => MesonTool::new(program),
            None => MesonTool::detect(),
        };
        tool.with_jobs(jobs.or(self.config.build.jobs))
            .with_verbose(self.shell.is_verbose())
    }

    pub fn build_machine(&self) -> Option<BuildMachine> {
        BuildMachine::current()
    }
}
