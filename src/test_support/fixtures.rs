//! Test fixtures for common test scenarios.
//!
//! This module provides the fossil_sys recipe used throughout the tests, a
//! matching source tree, and a local git repository to fetch it from.

use std::path::Path;

use git2::{Repository, Signature};

use crate::core::recipe::{Recipe, RECIPE_FILE};

/// Recipe for the fossil_sys library.
pub const FOSSIL_RECIPE: &str = r#"[package]
name = "fossil_sys"
version = "0.1.3"
license = "MPL-2.0"
author = "Fossil Logic"
url = "https://github.com/fossillogic/fossil-sys"
description = "Fossil Sys is a lightweight, portable system level library written in pure C."
topics = ["c", "memory", "host", "meson"]

[options]
shared = false

[layout]
build = "builddir"

[source]
strategy = "shallow"

[exports]
sources = ["code/**", "meson.build", "meson.options"]

[[headers]]
pattern = "*.h"
src = "code/logic/fossil/sys"
subdir = "sys"
"#;

/// Parse `FOSSIL_RECIPE` as if it lived in `dir`. Nothing is written.
pub fn fossil_recipe_at(dir: &Path) -> Recipe {
    Recipe::parse(FOSSIL_RECIPE, &dir.join(RECIPE_FILE)).unwrap()
}

/// Write a small fossil_sys source tree into `dir`.
///
/// Two headers (one nested) live under `code/logic/fossil/sys`, next to a
/// `.c` file that header rules must not pick up.
pub fn write_fossil_sources(dir: &Path) {
    let files = [
        (
            "meson.build",
            "project('fossil_sys', 'c', version: '0.1.3')\nsubdir('code')\n",
        ),
        (
            "code/meson.build",
            "fossil_sys_lib = library('fossil_sys', 'logic/sys.c')\n",
        ),
        (
            "code/logic/sys.c",
            "#include \"fossil/sys/sys.h\"\nint fossil_sys_init(void) { return 0; }\n",
        ),
        (
            "code/logic/fossil/sys/sys.h",
            "#ifndef FOSSIL_SYS_H\n#define FOSSIL_SYS_H\nint fossil_sys_init(void);\n#endif\n",
        ),
        (
            "code/logic/fossil/sys/internal/detail.h",
            "#define FOSSIL_SYS_DETAIL 1\n",
        ),
        ("code/logic/fossil/sys/sys.c", "/* not a header */\n"),
    ];

    for (rel, contents) in files {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

/// Create a git repository in `dir` with the fossil sources committed and
/// tagged `tag`. Returns the tagged commit id.
pub fn git_repo_with_tag(dir: &Path, tag: &str) -> String {
    let repo = Repository::init(dir).unwrap();
    write_fossil_sources(dir);

    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::now("quay tests", "tests@quay.invalid").unwrap();
    let commit_id = repo
        .commit(Some("HEAD"), &sig, &sig, "fossil_sys sources", &tree, &[])
        .unwrap();
    let commit = repo.find_commit(commit_id).unwrap();

    repo.tag(tag, commit.as_object(), &sig, tag, false).unwrap();
    commit_id.to_string()
}
