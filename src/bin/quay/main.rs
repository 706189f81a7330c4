//! quay CLI - build and package Meson C libraries from recipes

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, GlobalArgs};
use quay::util::diagnostic::emit;
use quay::RecipeError;

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<RecipeError>() {
            Some(err) => emit(&err.to_diagnostic(), std::io::stderr().is_terminal()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("quay=debug")
    } else {
        EnvFilter::new("quay=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = GlobalArgs {
        verbose: cli.verbose,
        recipe: cli.recipe,
    };

    // Execute command
    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(args, &global),
        Commands::Layout(args) => commands::layout::execute(args, &global),
        Commands::Toolchain(args) => commands::toolchain::execute(args, &global),
        Commands::Source(args) => commands::lifecycle::source(args, &global),
        Commands::Build(args) => commands::lifecycle::build(args, &global),
        Commands::Package(args) => commands::lifecycle::package(args, &global),
        Commands::Create(args) => commands::lifecycle::create(args, &global),
        Commands::Info(args) => commands::info::execute(args, &global),
        Commands::Export(args) => commands::export::execute(args, &global),
        Commands::Clean(args) => commands::clean::execute(args, &global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
