//! Recipe options and the frozen-options invariant.
//!
//! Options are mutable until the toolchain has been generated. After that
//! the generated file reflects them, so any further change is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::settings::split_assignment;

/// Declared option defaults from the `[options]` table of Recipe.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionDefaults {
    pub shared: bool,
}

/// Options a recipe is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    shared: bool,
    frozen: bool,
}

impl Options {
    /// Options starting from the recipe's declared defaults.
    pub fn from_defaults(defaults: OptionDefaults) -> Self {
        Options {
            shared: defaults.shared,
            frozen: false,
        }
    }

    /// Build shared libraries instead of static ones.
    pub fn shared(&self) -> bool {
        self.shared
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Set an option from its key and textual value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecipeError> {
        if self.frozen {
            return Err(RecipeError::invalid_input(format!(
                "options are frozen: cannot set `{}` after the toolchain was generated",
                key
            )));
        }

        match key {
            "shared" => {
                self.shared = parse_bool(value).ok_or_else(|| {
                    RecipeError::invalid_input(format!(
                        "invalid value `{}` for option `shared`, expected True or False",
                        value
                    ))
                })?;
            }
            other => {
                return Err(RecipeError::invalid_input(format!(
                    "unknown option `{}`, valid options: shared",
                    other
                )))
            }
        }
        Ok(())
    }

    /// Apply `key=value` assignments in order.
    pub fn apply_assignments<S: AsRef<str>>(&mut self, items: &[S]) -> Result<(), RecipeError> {
        for item in items {
            let (key, value) = split_assignment(item.as_ref())?;
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Freeze the options; later calls to `set` fail.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

impl Default for Options {
    fn default() -> Self {
        Options::from_defaults(OptionDefaults::default())
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shared={}", if self.shared { "True" } else { "False" })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_static() {
        let opts = Options::default();
        assert!(!opts.shared());
        assert_eq!(opts.to_string(), "shared=False");
    }

    #[test]
    fn test_set_shared() {
        let mut opts = Options::default();
        opts.apply_assignments(&["shared=True"]).unwrap();
        assert!(opts.shared());
        opts.set("shared", "0").unwrap();
        assert!(!opts.shared());
    }

    #[test]
    fn test_rejects_unknown_and_invalid() {
        let mut opts = Options::default();
        assert!(opts.set("fPIC", "True").is_err());
        assert!(opts.set("shared", "maybe").is_err());
    }

    #[test]
    fn test_frozen_options_reject_changes() {
        let mut opts = Options::from_defaults(OptionDefaults { shared: true });
        opts.freeze();

        let err = opts.set("shared", "False").unwrap_err();
        assert!(err.to_string().contains("options are frozen"));
        assert!(opts.shared());
    }
}
