//! `quay export` command

use anyhow::Result;

use crate::cli::{ExportArgs, GlobalArgs};
use crate::commands::Session;
use quay::ops::export;
use quay::util::shell::Status;

pub fn execute(args: ExportArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let dest = session.ctx.cwd().join(&args.dest);

    let result = export(&session.recipe, &dest)?;

    for file in &result.files {
        println!("{}", file.display());
    }
    session.shell.status(
        Status::Exported,
        format!(
            "{} ({} file(s), {} unchanged) to {}",
            session.recipe.identity(),
            result.files.len(),
            result.unchanged,
            dest.display()
        ),
    );
    Ok(())
}
