//! Source acquisition.
//!
//! A recipe's source tree is fetched from its git repository at the tag
//! matching the package version.

pub mod git;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;

pub use git::{SourceAcquirer, SourceStatus};

/// How the source repository is retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// Depth-1 fetch of the version tag only
    #[default]
    Shallow,
    /// All branches and tags with complete history
    Full,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStrategy::Shallow => "shallow",
            FetchStrategy::Full => "full",
        }
    }

    /// Pick the first strategy given, in precedence order.
    pub fn select(
        cli: Option<FetchStrategy>,
        recipe: Option<FetchStrategy>,
        config: Option<FetchStrategy>,
    ) -> FetchStrategy {
        cli.or(recipe).or(config).unwrap_or_default()
    }
}

impl FromStr for FetchStrategy {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shallow" => Ok(FetchStrategy::Shallow),
            "full" => Ok(FetchStrategy::Full),
            _ => Err(RecipeError::invalid_input(format!(
                "invalid fetch strategy `{}`, valid values: shallow, full",
                s
            ))),
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_precedence() {
        use FetchStrategy::*;
        assert_eq!(FetchStrategy::select(None, None, None), Shallow);
        assert_eq!(FetchStrategy::select(None, None, Some(Full)), Full);
        assert_eq!(FetchStrategy::select(None, Some(Shallow), Some(Full)), Shallow);
        assert_eq!(FetchStrategy::select(Some(Full), Some(Shallow), None), Full);
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("FULL".parse::<FetchStrategy>().unwrap(), FetchStrategy::Full);
        assert!("deep".parse::<FetchStrategy>().is_err());
    }
}
