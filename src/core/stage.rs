//! Lifecycle stages and the states they produce.

use std::fmt;

/// A lifecycle hook of a recipe, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Layout,
    Generate,
    Source,
    Build,
    Package,
    PackageInfo,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Layout,
        Stage::Generate,
        Stage::Source,
        Stage::Build,
        Stage::Package,
        Stage::PackageInfo,
    ];

    /// Get the hook name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Layout => "layout",
            Stage::Generate => "generate",
            Stage::Source => "source",
            Stage::Build => "build",
            Stage::Package => "package",
            Stage::PackageInfo => "package_info",
        }
    }

    /// The state a recipe must be in before this stage can advance it.
    pub fn requires(&self) -> RecipeState {
        match self {
            Stage::Layout => RecipeState::Created,
            Stage::Generate => RecipeState::LayoutResolved,
            Stage::Source => RecipeState::ToolchainGenerated,
            Stage::Build => RecipeState::SourceReady,
            Stage::Package => RecipeState::Built,
            Stage::PackageInfo => RecipeState::Packaged,
        }
    }

    /// The state a recipe is in after this stage succeeds.
    pub fn produces(&self) -> RecipeState {
        match self {
            Stage::Layout => RecipeState::LayoutResolved,
            Stage::Generate => RecipeState::ToolchainGenerated,
            Stage::Source => RecipeState::SourceReady,
            Stage::Build => RecipeState::Built,
            Stage::Package => RecipeState::Packaged,
            Stage::PackageInfo => RecipeState::Described,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a recipe is in its lifecycle.
///
/// States are totally ordered; a recipe only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RecipeState {
    #[default]
    Created,
    LayoutResolved,
    ToolchainGenerated,
    SourceReady,
    Built,
    Packaged,
    Described,
}

impl fmt::Display for RecipeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecipeState::Created => "Created",
            RecipeState::LayoutResolved => "LayoutResolved",
            RecipeState::ToolchainGenerated => "ToolchainGenerated",
            RecipeState::SourceReady => "SourceReady",
            RecipeState::Built => "Built",
            RecipeState::Packaged => "Packaged",
            RecipeState::Described => "Described",
        };
        f.write_str(name)
    }
}
