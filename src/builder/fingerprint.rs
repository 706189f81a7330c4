//! Configure fingerprinting.
//!
//! A stamp in the build folder records the inputs of the last successful
//! configure, allowing us to skip `meson setup` when nothing has changed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::toolchain::ToolchainFile;
use crate::util::fs::write_if_changed;
use crate::util::hash::Fingerprint;

/// Stamp file name inside the build folder.
pub const CONFIGURE_STAMP: &str = "quay_configure.json";

/// Inputs of a configure step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigureStamp {
    /// Combined fingerprint of every field below
    pub fingerprint: String,

    /// SHA-256 of the toolchain file content
    pub toolchain: String,

    /// Source folder the build was configured against
    pub source: PathBuf,

    /// Build tool name
    pub tool: String,
}

impl ConfigureStamp {
    /// Compute the stamp for configuring `source` with `toolchain` and `tool`.
    pub fn compute(toolchain: &ToolchainFile, source: &Path, tool: &str) -> Self {
        let mut fp = Fingerprint::new();
        fp.update_str(&toolchain.fingerprint);
        fp.update_path(source);
        fp.update_str(tool);

        ConfigureStamp {
            fingerprint: fp.finish(),
            toolchain: toolchain.fingerprint.clone(),
            source: source.to_path_buf(),
            tool: tool.to_string(),
        }
    }

    pub fn path_in(build_folder: &Path) -> PathBuf {
        build_folder.join(CONFIGURE_STAMP)
    }

    /// Load the stamp from a build folder.
    ///
    /// A missing or unreadable stamp yields `None`: the next configure simply
    /// runs again.
    pub fn load(build_folder: &Path) -> Option<Self> {
        let path = Self::path_in(build_folder);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                tracing::debug!("ignoring corrupt configure stamp {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save the stamp into a build folder.
    pub fn save(&self, build_folder: &Path) -> Result<()> {
        let path = Self::path_in(build_folder);
        let content = serde_json::to_string_pretty(self).context("failed to encode configure stamp")?;
        write_if_changed(&path, content.as_bytes())?;
        Ok(())
    }

    /// Check if the stamp matches (nothing has changed).
    pub fn matches(&self, other: &ConfigureStamp) -> bool {
        self.fingerprint == other.fingerprint
    }
}
