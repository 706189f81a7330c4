//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// What happened when a file was written idempotently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The destination did not exist
    Created,
    /// The destination existed with different content
    Overwritten,
    /// The destination already had identical content
    Unchanged,
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write bytes to a file unless it already holds exactly those bytes.
///
/// Parent directories are created as needed.
pub fn write_if_changed(path: &Path, contents: &[u8]) -> Result<WriteOutcome> {
    let outcome = match fs::read(path) {
        Ok(existing) if existing == contents => return Ok(WriteOutcome::Unchanged),
        Ok(_) => WriteOutcome::Overwritten,
        Err(_) => WriteOutcome::Created,
    };

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))?;

    Ok(outcome)
}

/// Copy a file, skipping the write when the destination is already identical.
pub fn copy_if_changed(src: &Path, dst: &Path) -> Result<WriteOutcome> {
    let contents =
        fs::read(src).with_context(|| format!("failed to read file: {}", src.display()))?;
    write_if_changed(dst, &contents)
}

/// Move every entry of `from` into `to`, keeping entries that already exist in `to`.
///
/// Returns the names that were skipped because `to` already had them.
pub fn merge_dir_into(from: &Path, to: &Path) -> Result<Vec<String>> {
    ensure_dir(to)?;
    let mut skipped = Vec::new();

    let mut entries = fs::read_dir(from)
        .with_context(|| format!("failed to read directory: {}", from.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let dst = to.join(entry.file_name());
        if dst.exists() {
            skipped.push(entry.file_name().to_string_lossy().into_owned());
            continue;
        }
        fs::rename(entry.path(), &dst).with_context(|| {
            format!(
                "failed to move {} to {}",
                entry.path().display(),
                dst.display()
            )
        })?;
    }

    Ok(skipped)
}

/// Find files matching glob patterns relative to a base directory.
///
/// A matched directory contributes every file beneath it, so `code/**`
/// selects the whole `code` tree.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) if path.is_file() => results.push(path),
                Ok(path) if path.is_dir() => {
                    for file in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
                        if file.file_type().is_file() {
                            results.push(file.into_path());
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("glob error: {}", e),
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Check whether the current user can create files in a directory.
///
/// Probes with an anonymous temp file, which leaves nothing behind.
pub fn is_writable_dir(path: &Path) -> bool {
    path.is_dir() && tempfile::tempfile_in(path).is_ok()
}
