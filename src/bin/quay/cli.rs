//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use quay::FetchStrategy;

/// quay - build and package Meson C libraries from a Recipe.toml
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to Recipe.toml (or its directory); searched upward from cwd by default
    #[arg(long, global = true, value_name = "PATH")]
    pub recipe: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags every subcommand can see.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub verbose: bool,
    pub recipe: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print recipe metadata
    Inspect(InspectArgs),

    /// Print the resolved source and build folders
    Layout(LayoutArgs),

    /// Generate the Meson machine file
    Toolchain(ToolchainArgs),

    /// Fetch the tagged sources (unless already present)
    Source(LifecycleArgs),

    /// Configure and compile
    Build(LifecycleArgs),

    /// Build and assemble the package folder
    Package(LifecycleArgs),

    /// Run the whole lifecycle and print consumer info
    Create(LifecycleArgs),

    /// Describe an existing package folder
    Info(InfoArgs),

    /// Copy the recipe and its exported sources somewhere else
    Export(ExportArgs),

    /// Remove the build folder
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Settings and options shared by every command that generates a toolchain.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Setting as key=value (os, arch, compiler, build_type)
    #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
    pub settings: Vec<String>,

    /// Option as key=value (shared)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Print the generated file content
    #[arg(long)]
    pub print: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LifecycleArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Package folder (defaults to <recipe dir>/package)
    #[arg(long, value_name = "DIR")]
    pub package_folder: Option<PathBuf>,

    /// How to fetch sources: shallow or full
    #[arg(long)]
    pub strategy: Option<FetchStrategy>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InfoFormat {
    Text,
    Json,
    PkgConfig,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Package folder (defaults to <recipe dir>/package)
    #[arg(long, value_name = "DIR")]
    pub package_folder: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = InfoFormat::Text)]
    pub format: InfoFormat,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Destination directory
    #[arg(long, value_name = "DIR")]
    pub dest: PathBuf,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the package folder
    #[arg(long)]
    pub all: bool,

    /// Package folder removed with --all (defaults to <recipe dir>/package)
    #[arg(long, value_name = "DIR")]
    pub package_folder: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
