//! `quay inspect` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::{GlobalArgs, InspectArgs};
use crate::commands::Session;
use quay::core::recipe::{ExportSpec, HeaderCopy};
use quay::{FetchStrategy, PackageIdentity};

#[derive(Serialize)]
struct RecipeView<'a> {
    #[serde(flatten)]
    identity: &'a PackageIdentity,
    source_ref: String,
    shared: bool,
    strategy: Option<FetchStrategy>,
    exports: &'a ExportSpec,
    headers: &'a [HeaderCopy],
}

pub fn execute(args: InspectArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let recipe = &session.recipe;
    let identity = recipe.identity();

    if args.json {
        let view = RecipeView {
            identity,
            source_ref: identity.source_ref(),
            shared: recipe.option_defaults().shared,
            strategy: recipe.source().strategy,
            exports: recipe.exports(),
            headers: recipe.headers(),
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("name: {}", identity.name());
    println!("version: {}", identity.version());
    if let Some(license) = identity.license() {
        println!("license: {}", license);
    }
    if let Some(author) = identity.author() {
        println!("author: {}", author);
    }
    println!("url: {}", identity.url());
    if let Some(description) = identity.description() {
        println!("description: {}", description);
    }
    if !identity.topics().is_empty() {
        let topics: Vec<_> = identity.topics().iter().map(String::as_str).collect();
        println!("topics: {}", topics.join(", "));
    }
    println!("source ref: {}", identity.source_ref());
    println!("options: shared={}", recipe.option_defaults().shared);
    if let Some(strategy) = recipe.source().strategy {
        println!("fetch strategy: {}", strategy);
    }
    if !recipe.exports().sources.is_empty() {
        println!("exports: {}", recipe.exports().sources.join(", "));
    }
    for rule in recipe.headers() {
        println!(
            "headers: {} from {} -> include/{}/{}",
            rule.pattern,
            rule.src.display(),
            identity.name(),
            rule.subdir.display()
        );
    }

    Ok(())
}
