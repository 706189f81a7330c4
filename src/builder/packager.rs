//! Assemble the package folder: install, header fallback copy, manifest.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use walkdir::WalkDir;

use crate::builder::meson::BuildTool;
use crate::core::consumer::INCLUDE_DIR;
use crate::core::errors::RecipeError;
use crate::core::layout::Layout;
use crate::core::recipe::{HeaderCopy, Recipe};
use crate::util::fs::{copy_if_changed, ensure_dir, write_if_changed, WriteOutcome};
use crate::util::hash::sha256_file;

/// Manifest file name at the root of a package folder.
pub const PACKAGE_MANIFEST: &str = "quay_manifest.json";

/// Outcome of packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageReport {
    /// Headers written by the fallback copy
    pub headers_copied: usize,
    /// Headers already identical in the package folder
    pub headers_unchanged: usize,
    /// Relative path to SHA-256 of every packaged file
    pub manifest: BTreeMap<String, String>,
}

/// Installs a built recipe into its package folder.
pub struct Packager<'a> {
    recipe: &'a Recipe,
    layout: &'a Layout,
    package_folder: &'a Path,
}

impl<'a> Packager<'a> {
    pub fn new(recipe: &'a Recipe, layout: &'a Layout, package_folder: &'a Path) -> Self {
        Packager {
            recipe,
            layout,
            package_folder,
        }
    }

    /// Install with `tool`, copy headers, write the manifest.
    pub fn run<T: BuildTool>(&self, tool: &T) -> Result<PackageReport, RecipeError> {
        ensure_dir(self.package_folder).map_err(|e| RecipeError::packaging(format!("{:#}", e)))?;

        tracing::info!("installing into {}", self.package_folder.display());
        tool.install(&self.layout.build_folder, self.package_folder)
            .map_err(|failure| RecipeError::Packaging {
                message: failure.to_string(),
                output: Some(failure.output),
            })?;

        let mut report = PackageReport::default();
        for rule in self.recipe.headers() {
            self.copy_headers(rule, &mut report)?;
        }

        report.manifest = write_manifest(self.package_folder)?;
        tracing::info!(
            "packaged {} file(s) ({} header(s) copied)",
            report.manifest.len(),
            report.headers_copied
        );
        Ok(report)
    }

    /// Destination directory of a header rule.
    pub fn header_dest(&self, rule: &HeaderCopy) -> PathBuf {
        self.package_folder
            .join(INCLUDE_DIR)
            .join(self.recipe.identity().name())
            .join(&rule.subdir)
    }

    fn copy_headers(&self, rule: &HeaderCopy, report: &mut PackageReport) -> Result<(), RecipeError> {
        let src_dir = self.layout.source_folder.join(&rule.src);
        if !src_dir.is_dir() {
            tracing::warn!(
                "header directory `{}` does not exist; nothing copied",
                src_dir.display()
            );
            return Ok(());
        }

        let pattern = Pattern::new(&rule.pattern).map_err(|e| {
            RecipeError::packaging(format!("invalid header pattern `{}`: {}", rule.pattern, e))
        })?;
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        let dest_dir = self.header_dest(rule);
        let mut matched = 0;

        // The package and build folders usually sit inside the source tree.
        let src_dir = canonical(&src_dir);
        let skipped = [canonical(self.package_folder), canonical(&self.layout.build_folder)];
        let walker = WalkDir::new(&src_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !skipped.iter().any(|dir| e.path() == dir.as_path()));

        for entry in walker {
            let entry = entry.map_err(|e| RecipeError::packaging(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(&src_dir) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            if !pattern.matches_path_with(rel, options) {
                continue;
            }

            matched += 1;
            let outcome = copy_if_changed(entry.path(), &dest_dir.join(rel))
                .map_err(|e| RecipeError::packaging(format!("{:#}", e)))?;
            match outcome {
                WriteOutcome::Unchanged => report.headers_unchanged += 1,
                WriteOutcome::Created | WriteOutcome::Overwritten => report.headers_copied += 1,
            }
        }

        if matched == 0 {
            tracing::warn!(
                "no files under `{}` match `{}`",
                src_dir.display(),
                rule.pattern
            );
        }
        Ok(())
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Hash every file of the package folder into the manifest.
fn write_manifest(package_folder: &Path) -> Result<BTreeMap<String, String>, RecipeError> {
    let mut manifest = BTreeMap::new();

    for entry in WalkDir::new(package_folder).sort_by_file_name() {
        let entry = entry.map_err(|e| RecipeError::packaging(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(package_folder) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if rel == Path::new(PACKAGE_MANIFEST) {
            continue;
        }

        let key = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let hash = sha256_file(entry.path()).map_err(|e| RecipeError::packaging(format!("{:#}", e)))?;
        manifest.insert(key, hash);
    }

    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| RecipeError::packaging(e.to_string()))?;
    write_if_changed(&package_folder.join(PACKAGE_MANIFEST), json.as_bytes())
        .map_err(|e| RecipeError::packaging(format!("{:#}", e)))?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fossil_recipe_at, write_fossil_sources, RecordingTool, FOSSIL_RECIPE};
    use tempfile::TempDir;

    fn layout_for(base: &Path) -> Layout {
        Layout {
            source_folder: base.to_path_buf(),
            build_folder: base.join("builddir"),
        }
    }

    #[test]
    fn test_package_fossil_sys() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        let recipe = fossil_recipe_at(tmp.path());
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");

        let report = Packager::new(&recipe, &layout, &package)
            .run(&RecordingTool::new())
            .unwrap();

        assert!(package.join("lib/libfossil_sys.a").is_file());
        assert!(package.join("include/fossil_sys/sys/sys.h").is_file());
        assert!(package.join("include/fossil_sys/sys/internal/detail.h").is_file());
        assert!(!package.join("include/fossil_sys/sys/sys.c").exists());
        assert_eq!(report.headers_copied, 2);

        assert!(report.manifest.contains_key("lib/libfossil_sys.a"));
        assert!(report.manifest.contains_key("include/fossil_sys/sys/internal/detail.h"));
        assert!(!report.manifest.contains_key(PACKAGE_MANIFEST));
        assert!(package.join(PACKAGE_MANIFEST).is_file());
    }

    #[test]
    fn test_repackage_is_identical() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        let recipe = fossil_recipe_at(tmp.path());
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");
        let tool = RecordingTool::new();
        let packager = Packager::new(&recipe, &layout, &package);

        let first = packager.run(&tool).unwrap();
        let manifest_bytes = std::fs::read(package.join(PACKAGE_MANIFEST)).unwrap();
        let second = packager.run(&tool).unwrap();

        assert_eq!(first.manifest, second.manifest);
        assert_eq!(second.headers_copied, 0);
        assert_eq!(second.headers_unchanged, 2);
        assert_eq!(std::fs::read(package.join(PACKAGE_MANIFEST)).unwrap(), manifest_bytes);
    }

    #[test]
    fn test_changed_header_is_overwritten() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        let recipe = fossil_recipe_at(tmp.path());
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");
        let packager = Packager::new(&recipe, &layout, &package);
        packager.run(&RecordingTool::new()).unwrap();

        let dest = package.join("include/fossil_sys/sys/sys.h");
        std::fs::write(&dest, "stale").unwrap();
        let report = packager.run(&RecordingTool::new()).unwrap();

        assert_eq!(report.headers_copied, 1);
        assert_ne!(std::fs::read_to_string(&dest).unwrap(), "stale");
    }

    #[test]
    fn test_missing_header_dir_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("meson.build"), "project('x', 'c')\n").unwrap();
        let recipe = fossil_recipe_at(tmp.path());
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");

        let report = Packager::new(&recipe, &layout, &package)
            .run(&RecordingTool::new())
            .unwrap();
        assert_eq!(report.headers_copied, 0);
        assert!(!package.join("include").exists());
    }

    #[test]
    fn test_unmatched_pattern_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        let text = FOSSIL_RECIPE.replace("pattern = \"*.h\"", "pattern = \"*.hpp\"");
        let recipe = Recipe::parse(&text, &tmp.path().join("Recipe.toml")).unwrap();
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");

        let report = Packager::new(&recipe, &layout, &package)
            .run(&RecordingTool::new())
            .unwrap();

        assert!(tmp.path().join("code/logic/fossil/sys").is_dir());
        assert_eq!(report.headers_copied, 0);
        assert_eq!(report.headers_unchanged, 0);
        assert!(!package.join("include").exists());
        assert!(report.manifest.contains_key("lib/libfossil_sys.a"));
    }

    #[test]
    fn test_root_header_rule_skips_package_and_build_folders() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        std::fs::create_dir_all(tmp.path().join("builddir")).unwrap();
        std::fs::write(tmp.path().join("builddir/config.h"), "#define X 1\n").unwrap();
        let text = FOSSIL_RECIPE.replace("src = \"code/logic/fossil/sys\"", "src = \".\"");
        let recipe = Recipe::parse(&text, &tmp.path().join("Recipe.toml")).unwrap();
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");
        let tool = RecordingTool::new();
        let packager = Packager::new(&recipe, &layout, &package);

        let first = packager.run(&tool).unwrap();
        let second = packager.run(&tool).unwrap();
        let third = packager.run(&tool).unwrap();

        assert_eq!(first.manifest, second.manifest);
        assert_eq!(second.manifest, third.manifest);
        assert_eq!(third.headers_copied, 0);
        assert!(first
            .manifest
            .contains_key("include/fossil_sys/sys/code/logic/fossil/sys/sys.h"));
        assert!(first.manifest.keys().all(|k| !k.contains("/package/")));
        assert!(first.manifest.keys().all(|k| !k.contains("builddir")));
    }

    #[test]
    fn test_install_failure_is_packaging_error() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());
        let recipe = fossil_recipe_at(tmp.path());
        let layout = layout_for(tmp.path());
        let package = tmp.path().join("package");

        let err = Packager::new(&recipe, &layout, &package)
            .run(&RecordingTool::new().fail_install())
            .unwrap_err();
        assert!(matches!(err, RecipeError::Packaging { output: Some(_), .. }));
        assert!(!package.join(PACKAGE_MANIFEST).exists());
    }
}
