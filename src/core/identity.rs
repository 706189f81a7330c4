//! Package identity - the static metadata every stage reads.

use std::collections::BTreeSet;
use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::errors::RecipeError;

/// Raw `[package]` section as written in Recipe.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Validated identity of the package a recipe builds.
///
/// Immutable once loaded; passed by reference into every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageIdentity {
    name: String,
    version: Version,
    license: Option<String>,
    author: Option<String>,
    url: Url,
    description: Option<String>,
    topics: BTreeSet<String>,
}

impl PackageIdentity {
    /// Validate raw metadata into an identity.
    pub fn from_metadata(meta: PackageMetadata) -> Result<Self, RecipeError> {
        validate_name(&meta.name)?;

        let version = Version::parse(meta.version.trim()).map_err(|e| {
            RecipeError::invalid_input(format!(
                "invalid version `{}` for package `{}`: {}",
                meta.version, meta.name, e
            ))
        })?;

        let url = Url::parse(meta.url.trim()).map_err(|e| {
            RecipeError::invalid_input(format!("invalid url `{}`: {}", meta.url, e))
        })?;

        Ok(PackageIdentity {
            name: meta.name,
            version,
            license: meta.license,
            author: meta.author,
            url,
            description: meta.description,
            topics: meta.topics.into_iter().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn topics(&self) -> &BTreeSet<String> {
        &self.topics
    }

    /// The git tag the source for this version lives at.
    pub fn source_ref(&self) -> String {
        format!("v{}", self.version)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

fn validate_name(name: &str) -> Result<(), RecipeError> {
    if name.is_empty() {
        return Err(RecipeError::invalid_input("package name cannot be empty"));
    }
    if name.chars().all(|c| c == '.') {
        return Err(RecipeError::invalid_input(format!(
            "package name `{}` cannot be used as a directory name",
            name
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(RecipeError::invalid_input(format!(
            "invalid character `{}` in package name `{}`",
            c, name
        )));
    }
    Ok(())
}
