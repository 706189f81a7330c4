//! Core recipe data types.

pub mod consumer;
pub mod errors;
pub mod identity;
pub mod layout;
pub mod options;
pub mod recipe;
pub mod settings;
pub mod stage;

pub use consumer::ConsumerInfo;
pub use errors::RecipeError;
pub use identity::PackageIdentity;
pub use layout::Layout;
pub use options::Options;
pub use recipe::Recipe;
pub use settings::{Arch, BuildMachine, BuildType, Compiler, Os, PartialSettings, Settings};
pub use stage::{RecipeState, Stage};
