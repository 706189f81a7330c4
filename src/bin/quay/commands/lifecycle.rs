//! `quay source`, `quay build`, `quay package` and `quay create` commands
//!
//! Each command runs the lifecycle from scratch up to its target state.
//! Every stage is idempotent, so re-running skips what is already done.

use anyhow::Result;

use crate::cli::{GlobalArgs, LifecycleArgs};
use crate::commands::Session;
use quay::builder::ConfigureAction;
use quay::sources::{FetchStrategy, SourceStatus};
use quay::util::shell::{format_duration, Status};
use quay::{Lifecycle, MesonTool, RecipeState, Stage};

pub fn source(args: LifecycleArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    drive(&session, &args, RecipeState::SourceReady)?;
    Ok(())
}

pub fn build(args: LifecycleArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    drive(&session, &args, RecipeState::Built)?;
    Ok(())
}

pub fn package(args: LifecycleArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    drive(&session, &args, RecipeState::Packaged)?;
    Ok(())
}

pub fn create(args: LifecycleArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let mut lc = drive(&session, &args, RecipeState::Packaged)?;

    let info = lc.describe()?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Run every stage up to `target`, reporting progress on the shell.
fn drive<'a>(
    session: &'a Session,
    args: &LifecycleArgs,
    target: RecipeState,
) -> Result<Lifecycle<'a, MesonTool>> {
    let recipe = &session.recipe;
    let settings = session.settings(&args.profile)?;
    let options = session.options(&args.profile)?;
    let strategy = FetchStrategy::select(
        args.strategy,
        recipe.source().strategy,
        session.config.source.strategy,
    );

    let mut lc = Lifecycle::new(
        recipe,
        settings,
        options,
        session.meson(args.jobs),
        session.base(),
    )
    .with_package_folder(session.package_folder(args.package_folder.as_deref()))
    .with_strategy(strategy)
    .with_build_machine(session.build_machine());

    let shell = &session.shell;
    let name = recipe.identity().to_string();

    for stage in Lifecycle::<MesonTool>::pending(lc.state(), target) {
        match stage {
            Stage::Layout => {
                let layout = lc.resolve_layout()?;
                tracing::debug!("source folder {}", layout.source_folder.display());
            }
            Stage::Generate => {
                shell.status(Status::Generating, format!("{} ({})", lc.settings(), lc.options()));
                lc.generate()?;
            }
            Stage::Source => {
                let spinner = shell.spinner(
                    Status::Fetching,
                    format!("{} ({}, {})", recipe.identity().url(), recipe.identity().source_ref(), strategy),
                );
                let status = lc.source()?;
                spinner.finish();
                if status == SourceStatus::AlreadyPresent {
                    shell.status(Status::Skipped, "fetch, sources already present");
                }
            }
            Stage::Build => {
                let label = match lc.tool().version() {
                    Ok(version) => format!("{} (meson {})", name, version),
                    Err(failure) => {
                        tracing::debug!("could not query meson version: {}", failure);
                        name.clone()
                    }
                };
                let spinner = shell.spinner(Status::Building, label);
                let report = lc.build()?;
                let elapsed = spinner.finish();
                if report.configure == ConfigureAction::Skipped {
                    tracing::debug!("configure skipped, fingerprint {}", report.stamp.fingerprint);
                }
                shell.status(Status::Finished, format!("{} in {}", name, format_duration(elapsed)));
            }
            Stage::Package => {
                shell.status(Status::Packaging, &name);
                let report = lc.package()?;
                shell.status(
                    Status::Packaged,
                    format!(
                        "{} file(s) into {}",
                        report.manifest.len(),
                        lc.package_folder().display()
                    ),
                );
            }
            Stage::PackageInfo => {
                lc.describe()?;
            }
        }
    }

    Ok(lc)
}
