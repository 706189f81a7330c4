//! Implementation of `quay export`: ship a recipe with its exported sources.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::recipe::{Recipe, RECIPE_FILE};
use crate::util::fs::{copy_if_changed, ensure_dir, glob_files, WriteOutcome};

/// Result of an export.
#[derive(Debug, Clone, Default)]
pub struct ExportResult {
    /// Destination-relative paths of every exported file, sorted
    pub files: Vec<PathBuf>,
    /// How many of them were already identical at the destination
    pub unchanged: usize,
}

/// Copy the recipe and every `[exports].sources` match into `dest`.
///
/// Paths keep their position relative to the recipe directory. Files that
/// already live under `dest` are never re-exported into it.
pub fn export(recipe: &Recipe, dest: &Path) -> Result<ExportResult> {
    let root = recipe.recipe_dir();
    ensure_dir(dest)?;

    let dest_abs = dest
        .canonicalize()
        .with_context(|| format!("failed to resolve {}", dest.display()))?;

    let mut files = vec![recipe.path().to_path_buf()];
    files.extend(glob_files(root, &recipe.exports().sources)?);

    let mut result = ExportResult::default();
    for src in files {
        if src.canonicalize().map(|p| p.starts_with(&dest_abs)).unwrap_or(false) {
            continue;
        }
        let rel = match src.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(src.file_name().unwrap_or_else(|| RECIPE_FILE.as_ref())),
        };

        let outcome = copy_if_changed(&src, &dest.join(&rel))?;
        if outcome == WriteOutcome::Unchanged {
            result.unchanged += 1;
        }
        tracing::debug!("exported {}", rel.display());
        result.files.push(rel);
    }

    result.files.sort();
    result.files.dedup();
    tracing::info!(
        "exported {} {} ({} file(s)) to {}",
        recipe.identity().name(),
        recipe.identity().version(),
        result.files.len(),
        dest.display()
    );
    Ok(result)
}
