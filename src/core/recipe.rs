//! Recipe.toml parsing and schema.
//!
//! A recipe is loaded once and never mutated. Every stage gets a reference
//! to the same `Recipe`, so several recipes (for example two versions of the
//! same library) can live side by side in one process.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::identity::{PackageIdentity, PackageMetadata};
use crate::core::layout::LayoutConfig;
use crate::core::options::OptionDefaults;
use crate::sources::FetchStrategy;

/// File name of a recipe manifest.
pub const RECIPE_FILE: &str = "Recipe.toml";

/// `[source]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSpec {
    /// How to fetch; `None` defers to configuration
    pub strategy: Option<FetchStrategy>,

    /// Commit the version tag is expected to point at
    pub commit: Option<String>,
}

/// `[exports]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSpec {
    /// Glob patterns, relative to the recipe directory, shipped with the recipe
    pub sources: Vec<String>,
}

/// A `[[headers]]` rule: headers copied into the package even if the build
/// tool does not install them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderCopy {
    #[serde(default = "default_header_pattern")]
    pub pattern: String,

    /// Directory in the source tree to search
    pub src: PathBuf,

    /// Directory under `include/<name>/` to copy into
    #[serde(default)]
    pub subdir: PathBuf,
}

fn default_header_pattern() -> String {
    "*.h".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    package: PackageMetadata,
    #[serde(default)]
    options: OptionDefaults,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    source: SourceSpec,
    #[serde(default)]
    exports: ExportSpec,
    #[serde(default)]
    headers: Vec<HeaderCopy>,
}

/// A loaded, validated recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    identity: PackageIdentity,
    options: OptionDefaults,
    layout: LayoutConfig,
    source: SourceSpec,
    exports: ExportSpec,
    headers: Vec<HeaderCopy>,
    path: PathBuf,
}

impl Recipe {
    /// Load a recipe from a Recipe.toml file.
    pub fn load(path: &Path) -> Result<Recipe, RecipeError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RecipeError::invalid_input(format!("failed to read {}: {}", path.display(), e))
        })?;
        Recipe::parse(&contents, path)
    }

    /// Parse recipe text; `path` is where the recipe lives.
    pub fn parse(contents: &str, path: &Path) -> Result<Recipe, RecipeError> {
        let raw: RawRecipe = toml::from_str(contents).map_err(|e| {
            RecipeError::invalid_input(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let identity = PackageIdentity::from_metadata(raw.package)?;
        raw.layout.validate()?;

        for rule in &raw.headers {
            check_relative("headers.src", &rule.src)?;
            check_relative("headers.subdir", &rule.subdir)?;
            glob::Pattern::new(&rule.pattern).map_err(|e| {
                RecipeError::invalid_input(format!(
                    "invalid header pattern `{}`: {}",
                    rule.pattern, e
                ))
            })?;
        }

        if let Some(ref commit) = raw.source.commit {
            if commit.is_empty() || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(RecipeError::invalid_input(format!(
                    "source.commit `{}` is not a hex commit id",
                    commit
                )));
            }
        }

        Ok(Recipe {
            identity,
            options: raw.options,
            layout: raw.layout,
            source: raw.source,
            exports: raw.exports,
            headers: raw.headers,
            path: path.to_path_buf(),
        })
    }

    pub fn identity(&self) -> &PackageIdentity {
        &self.identity
    }

    pub fn option_defaults(&self) -> OptionDefaults {
        self.options
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn source(&self) -> &SourceSpec {
        &self.source
    }

    pub fn exports(&self) -> &ExportSpec {
        &self.exports
    }

    pub fn headers(&self) -> &[HeaderCopy] {
        &self.headers
    }

    /// Path of the Recipe.toml this was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the recipe; the default base directory.
    pub fn recipe_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

/// Reject absolute paths and `..` components in recipe-relative paths.
pub(crate) fn check_relative(field: &str, path: &Path) -> Result<(), RecipeError> {
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(RecipeError::invalid_input(format!(
            "{} must be a relative path inside the recipe directory, got `{}`",
            field,
            path.display()
        )));
    }
    Ok(())
}
