//! quay - a package-recipe orchestrator for Meson-built C libraries
//!
//! This crate provides the core library functionality for quay: loading a
//! recipe, resolving its layout, generating the Meson machine file, fetching
//! tagged sources, building, packaging, and describing the result to
//! consumers.

pub mod builder;
pub mod core;
pub mod ops;
pub mod sources;
pub mod util;

/// Test utilities and mocks for quay unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording build tool and recipe, source tree and git fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    consumer::ConsumerInfo, errors::RecipeError, identity::PackageIdentity, layout::Layout,
    options::Options, recipe::Recipe, settings::Settings, stage::RecipeState, stage::Stage,
};

pub use builder::{BuildTool, MesonTool};
pub use ops::Lifecycle;
pub use sources::FetchStrategy;
pub use util::context::GlobalContext;
