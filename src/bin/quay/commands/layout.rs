//! `quay layout` command

use anyhow::Result;

use crate::cli::{GlobalArgs, LayoutArgs};
use crate::commands::Session;
use quay::core::layout;

pub fn execute(args: LayoutArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let layout = layout::resolve(&session.recipe, session.base())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        println!("source: {}", layout.source_folder.display());
        println!("build: {}", layout.build_folder.display());
    }
    Ok(())
}
