//! `quay info` command

use anyhow::Result;

use crate::cli::{GlobalArgs, InfoArgs, InfoFormat};
use crate::commands::Session;
use quay::core::consumer;

pub fn execute(args: InfoArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let identity = session.recipe.identity();
    let package_folder = session.package_folder(args.package_folder.as_deref());

    let info = consumer::describe(identity, &package_folder)?;

    match args.format {
        InfoFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        InfoFormat::PkgConfig => {
            let prefix = package_folder.canonicalize().unwrap_or(package_folder);
            print!("{}", info.to_pkg_config(identity, &prefix));
        }
        InfoFormat::Text => {
            println!("package: {}", identity);
            println!("folder: {}", package_folder.display());
            println!("libs: {}", info.libs.join(", "));
            let dirs: Vec<_> = info
                .includedirs
                .iter()
                .map(|d| d.display().to_string())
                .collect();
            println!("includedirs: {}", dirs.join(", "));
        }
    }
    Ok(())
}
