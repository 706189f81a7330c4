//! `quay clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use crate::commands::Session;
use quay::ops::{clean, CleanOptions};
use quay::util::shell::Status;

pub fn execute(args: CleanArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;

    let opts = CleanOptions {
        all: args.all,
        package_folder: args
            .package_folder
            .as_deref()
            .map(|dir| session.package_folder(Some(dir))),
    };

    let removed = clean(&session.recipe, session.base(), &opts)?;
    if removed.is_empty() {
        session.shell.status(Status::Skipped, "nothing to clean");
    }
    for dir in removed {
        session.shell.status(Status::Removed, dir.display());
    }
    Ok(())
}
