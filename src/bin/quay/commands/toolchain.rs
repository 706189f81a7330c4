//! `quay toolchain` command

use anyhow::Result;

use crate::cli::{GlobalArgs, ToolchainArgs};
use crate::commands::Session;
use quay::util::shell::Status;
use quay::{Lifecycle, RecipeState};

pub fn execute(args: ToolchainArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let settings = session.settings(&args.profile)?;
    let options = session.options(&args.profile)?;

    session
        .shell
        .status(Status::Generating, format!("{} ({}, {})", session.recipe.identity(), settings, options));

    let mut lc = Lifecycle::new(
        &session.recipe,
        settings,
        options,
        session.meson(None),
        session.base(),
    )
    .with_build_machine(session.build_machine());
    lc.run_until(RecipeState::ToolchainGenerated)?;

    let Some(toolchain) = lc.toolchain() else {
        anyhow::bail!("toolchain file was not generated");
    };

    if args.print {
        print!("{}", toolchain.content);
    } else {
        println!("{}", toolchain.path.display());
        println!("fingerprint: {}", toolchain.fingerprint);
    }
    Ok(())
}
