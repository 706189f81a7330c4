//! Layout resolution: where sources live and where the build goes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::recipe::{check_relative, Recipe};
use crate::core::stage::Stage;
use crate::util::fs::is_writable_dir;

/// `[layout]` table of Recipe.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Source folder, relative to the base directory
    pub source: PathBuf,

    /// Build folder, relative to the base directory
    pub build: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            source: PathBuf::from("."),
            build: PathBuf::from("builddir"),
        }
    }
}

impl LayoutConfig {
    pub(crate) fn validate(&self) -> Result<(), RecipeError> {
        check_relative("layout.source", &self.source)?;
        check_relative("layout.build", &self.build)?;

        let is_base = self
            .build
            .components()
            .all(|c| matches!(c, std::path::Component::CurDir));
        if is_base {
            return Err(RecipeError::invalid_input(
                "layout.build must be a dedicated subdirectory, not the base directory",
            ));
        }
        Ok(())
    }
}

/// Resolved folders for one invocation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub source_folder: PathBuf,
    pub build_folder: PathBuf,
}

/// Resolve the layout of `recipe` under `base`.
///
/// Pure: checks the base directory but creates nothing.
pub fn resolve(recipe: &Recipe, base: &Path) -> Result<Layout, RecipeError> {
    if !base.exists() {
        return Err(RecipeError::configuration(
            Stage::Layout,
            format!("base directory `{}` does not exist", base.display()),
        ));
    }
    if !base.is_dir() {
        return Err(RecipeError::configuration(
            Stage::Layout,
            format!("base directory `{}` is not a directory", base.display()),
        ));
    }
    if !is_writable_dir(base) {
        return Err(RecipeError::configuration(
            Stage::Layout,
            format!("base directory `{}` is not writable", base.display()),
        ));
    }

    let config = recipe.layout();
    let source_folder = if config.source == Path::new(".") {
        base.to_path_buf()
    } else {
        base.join(&config.source)
    };

    let layout = Layout {
        source_folder,
        build_folder: base.join(&config.build),
    };

    tracing::debug!(
        "layout for {}: source={} build={}",
        recipe.identity(),
        layout.source_folder.display(),
        layout.build_folder.display()
    );

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fossil_recipe_at;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let tmp = TempDir::new().unwrap();
        let recipe = fossil_recipe_at(tmp.path());

        let layout = resolve(&recipe, tmp.path()).unwrap();
        assert_eq!(layout.source_folder, tmp.path());
        assert_eq!(layout.build_folder, tmp.path().join("builddir"));
    }

    #[test]
    fn test_resolve_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let recipe = fossil_recipe_at(tmp.path());

        let layout = resolve(&recipe, tmp.path()).unwrap();
        assert!(!layout.build_folder.exists());
    }

    #[test]
    fn test_missing_base_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let recipe = fossil_recipe_at(tmp.path());

        let err = resolve(&recipe, &tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, RecipeError::Configuration { .. }));
        assert_eq!(err.stage(), Some(Stage::Layout));
    }

    #[test]
    fn test_readonly_base_is_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("ro");
        std::fs::create_dir(&base).unwrap();
        let recipe = fossil_recipe_at(tmp.path());

        let mut perms = std::fs::metadata(&base).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&base, perms.clone()).unwrap();

        // Privileged users write through missing permission bits.
        let writable = tempfile::tempfile_in(&base).is_ok();
        let result = resolve(&recipe, &base);

        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        std::fs::set_permissions(&base, perms).unwrap();

        if writable {
            assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            assert_eq!(err.stage(), Some(Stage::Layout));
            assert!(err.to_string().contains("not writable"));
        }
    }

    #[test]
    fn test_build_folder_must_be_dedicated() {
        let config = LayoutConfig {
            source: PathBuf::from("."),
            build: PathBuf::from("."),
        };
        assert!(config.validate().is_err());
    }
}
