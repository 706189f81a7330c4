//! Global context for quay operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::core::errors::RecipeError;
use crate::core::recipe::RECIPE_FILE;
use crate::util::config::{load_config, project_config_path, Config};

/// Environment variable overriding the global quay directory.
pub const HOME_ENV: &str = "QUAY_HOME";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global quay data (~/.quay/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => BaseDirs::new()
                .map(|b| b.home_dir().join(".quay"))
                .unwrap_or_else(|| PathBuf::from(".quay")),
        };

        Ok(GlobalContext {
            cwd,
            home,
            verbose: false,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Override the global quay directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the quay home directory (~/.quay/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Global config merged with the project config found under `base`.
    pub fn load_config(&self, base: &Path) -> Config {
        load_config(&self.config_path(), &project_config_path(base))
    }

    /// Find Recipe.toml starting from cwd and searching upward.
    pub fn find_recipe(&self) -> Result<PathBuf, RecipeError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(RECIPE_FILE);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(RecipeError::invalid_input(format!(
                    "could not find `{}` in `{}` or any parent directory",
                    RECIPE_FILE,
                    self.cwd.display()
                )));
            }
        }
    }

    /// Resolve an explicit `--recipe` argument, or search from cwd.
    ///
    /// A directory argument means the Recipe.toml inside it.
    pub fn recipe_path(&self, explicit: Option<&Path>) -> Result<PathBuf, RecipeError> {
        match explicit {
            Some(path) => {
                let path = self.cwd.join(path);
                if path.is_dir() {
                    Ok(path.join(RECIPE_FILE))
                } else {
                    Ok(path)
                }
            }
            None => self.find_recipe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::new()
            .unwrap()
            .with_home(tmp.path().join(".quay"));
        assert!(ctx.cwd().is_absolute());
        assert_eq!(ctx.config_path(), tmp.path().join(".quay/config.toml"));
    }

    #[test]
    fn test_find_recipe_upward() {
        let tmp = TempDir::new().unwrap();
        let recipe = tmp.path().join(RECIPE_FILE);
        std::fs::write(&recipe, "").unwrap();
        let nested = tmp.path().join("code/logic");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = GlobalContext::with_cwd(nested).unwrap();
        assert_eq!(ctx.find_recipe().unwrap(), recipe);
    }

    #[test]
    fn test_recipe_path_accepts_directory() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(
            ctx.recipe_path(Some(Path::new("."))).unwrap(),
            tmp.path().join(".").join(RECIPE_FILE)
        );
    }

    #[test]
    fn test_project_config_wins() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(home.join("config.toml"), "[build]\njobs = 2\nverbose = true\n").unwrap();
        std::fs::create_dir_all(tmp.path().join(".quay")).unwrap();
        std::fs::write(tmp.path().join(".quay/config.toml"), "[build]\njobs = 16\n").unwrap();

        let ctx = GlobalContext::new().unwrap().with_home(home);
        let config = ctx.load_config(tmp.path());
        assert_eq!(config.build.jobs, Some(16));
        assert!(config.build.verbose);
    }
}
