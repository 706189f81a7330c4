//! Build tool integration.
//!
//! This module generates the Meson machine file, drives configure and build
//! through the `BuildTool` seam, and assembles the package folder.

pub mod driver;
pub mod fingerprint;
pub mod meson;
pub mod packager;
pub mod toolchain;

pub use driver::{BuildDriver, BuildReport, ConfigureAction};
pub use fingerprint::ConfigureStamp;
pub use meson::{BuildTool, MesonTool};
pub use packager::{PackageReport, Packager};
pub use toolchain::{MachineFileKind, ToolchainFile, ToolchainGenerator};
