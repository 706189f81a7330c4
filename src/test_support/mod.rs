//! Test utilities and mocks for quay unit tests.
//!
//! `RecordingTool` stands in for Meson: it records every call, fakes the
//! on-disk effects the lifecycle relies on, and fails on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use quay::test_support::{fossil_recipe_at, write_fossil_sources, RecordingTool};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     write_fossil_sources(tmp.path());
//!     let tool = RecordingTool::new().fail_build();
//!     // Drive a Lifecycle with `tool`...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::path::Path;

use crate::builder::meson::BuildTool;
use crate::builder::toolchain::ToolchainFile;
use crate::util::process::{FailureStatus, ToolFailure};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A call made to a `RecordingTool`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    Configure { wipe: bool },
    Build,
    Install,
}

/// Mock build tool that records calls instead of running Meson.
#[derive(Debug, Default)]
pub struct RecordingTool {
    calls: RefCell<Vec<ToolCall>>,
    fail_configure: bool,
    fail_build: bool,
    fail_install: bool,
}

impl RecordingTool {
    pub fn new() -> Self {
        RecordingTool::default()
    }

    /// Make every configure fail.
    pub fn fail_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Make every build fail.
    pub fn fail_build(mut self) -> Self {
        self.fail_build = true;
        self
    }

    /// Make every install fail.
    pub fn fail_install(mut self) -> Self {
        self.fail_install = true;
        self
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.borrow().clone()
    }

    fn failure(command: &str, output: &str) -> ToolFailure {
        ToolFailure {
            command: command.to_string(),
            status: FailureStatus::Exited(1),
            output: output.to_string(),
        }
    }
}

impl BuildTool for RecordingTool {
    fn name(&self) -> &str {
        "recording"
    }

    fn configure(
        &self,
        _source: &Path,
        build: &Path,
        toolchain: &ToolchainFile,
        wipe: bool,
    ) -> Result<(), ToolFailure> {
        self.calls.borrow_mut().push(ToolCall::Configure { wipe });
        if self.fail_configure {
            return Err(Self::failure(
                "meson setup",
                "meson.build:1:0: ERROR: Unknown compiler(s): [['cc']]\n",
            ));
        }

        let private = build.join("meson-private");
        std::fs::create_dir_all(&private).map_err(|e| Self::failure("meson setup", &e.to_string()))?;
        std::fs::write(private.join("coredata.dat"), toolchain.fingerprint.as_bytes())
            .map_err(|e| Self::failure("meson setup", &e.to_string()))?;
        Ok(())
    }

    fn build(&self, _build: &Path) -> Result<(), ToolFailure> {
        self.calls.borrow_mut().push(ToolCall::Build);
        if self.fail_build {
            return Err(Self::failure(
                "meson compile",
                "../code/logic/sys.c:3:1: error: unknown type name 'uint'\n",
            ));
        }
        Ok(())
    }

    fn install(&self, _build: &Path, package: &Path) -> Result<(), ToolFailure> {
        self.calls.borrow_mut().push(ToolCall::Install);
        if self.fail_install {
            return Err(Self::failure(
                "meson install",
                "Installing lib/libfossil_sys.a: Permission denied\n",
            ));
        }

        let lib = package.join("lib");
        std::fs::create_dir_all(&lib).map_err(|e| Self::failure("meson install", &e.to_string()))?;
        std::fs::write(lib.join("libfossil_sys.a"), b"!<arch>\n")
            .map_err(|e| Self::failure("meson install", &e.to_string()))?;
        Ok(())
    }

    fn is_configured(&self, build: &Path) -> bool {
        build.join("meson-private").join("coredata.dat").is_file()
    }
}
