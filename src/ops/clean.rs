//! Implementation of `quay clean`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::layout;
use crate::core::recipe::Recipe;
use crate::sources::git::stale_staging_dirs;
use crate::util::fs::remove_dir_all_if_exists;

/// Options for the clean command.
#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Also remove the package folder
    pub all: bool,

    /// Package folder to remove with `all`; defaults to `<base>/package`
    pub package_folder: Option<PathBuf>,
}

/// Remove the build folder (and optionally the package folder).
///
/// Returns the directories that were actually removed.
pub fn clean(recipe: &Recipe, base: &Path, opts: &CleanOptions) -> Result<Vec<PathBuf>> {
    let layout = layout::resolve(recipe, base)?;

    let mut targets = vec![layout.build_folder.clone()];
    targets.extend(stale_staging_dirs(&layout.source_folder));
    if opts.all {
        targets.push(
            opts.package_folder
                .clone()
                .unwrap_or_else(|| base.join(crate::ops::lifecycle::PACKAGE_DIR)),
        );
    }

    let mut removed = Vec::new();
    for dir in targets {
        if dir.exists() {
            remove_dir_all_if_exists(&dir)?;
            tracing::info!("removed {}", dir.display());
            removed.push(dir);
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fossil_recipe_at;
    use tempfile::TempDir;

    #[test]
    fn test_clean_build_only() {
        let tmp = TempDir::new().unwrap();
        let recipe = fossil_recipe_at(tmp.path());
        std::fs::create_dir_all(tmp.path().join("builddir/meson-private")).unwrap();
        std::fs::create_dir_all(tmp.path().join("package/lib")).unwrap();
        std::fs::create_dir_all(tmp.path().join(".quay-fetch-abc123")).unwrap();

        let removed = clean(&recipe, tmp.path(), &CleanOptions::default()).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!tmp.path().join("builddir").exists());
        assert!(!tmp.path().join(".quay-fetch-abc123").exists());
        assert!(tmp.path().join("package").exists());
    }

    #[test]
    fn test_clean_all() {
        let tmp = TempDir::new().unwrap();
        let recipe = fossil_recipe_at(tmp.path());
        std::fs::create_dir_all(tmp.path().join("package/lib")).unwrap();

        let opts = CleanOptions {
            all: true,
            package_folder: None,
        };
        let removed = clean(&recipe, tmp.path(), &opts).unwrap();
        assert_eq!(removed, vec![tmp.path().join("package")]);
    }
}
