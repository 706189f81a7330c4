//! Consumer metadata: what a downstream build needs to link this package.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::RecipeError;
use crate::core::identity::PackageIdentity;
use crate::core::stage::Stage;

/// Include directory name inside a package folder.
pub const INCLUDE_DIR: &str = "include";

/// Library directory name inside a package folder.
pub const LIB_DIR: &str = "lib";

/// Library names and include paths published to consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerInfo {
    pub libs: Vec<String>,
    pub includedirs: Vec<PathBuf>,
}

/// Describe a packaged recipe for its consumers.
///
/// Depends only on the package name and the fixed folder convention, never
/// on settings or options. A missing package folder means the package stage
/// never ran, which is an ordering bug in the caller.
pub fn describe(identity: &PackageIdentity, package_folder: &Path) -> Result<ConsumerInfo, RecipeError> {
    if !package_folder.is_dir() {
        return Err(RecipeError::Lifecycle {
            stage: Stage::PackageInfo,
            message: format!(
                "package folder `{}` does not exist; `package` must run before `package_info`",
                package_folder.display()
            ),
        });
    }

    Ok(ConsumerInfo {
        libs: vec![identity.name().to_string()],
        includedirs: vec![PathBuf::from(INCLUDE_DIR)],
    })
}

impl ConsumerInfo {
    /// Render a pkg-config file for a package installed at `prefix`.
    pub fn to_pkg_config(&self, identity: &PackageIdentity, prefix: &Path) -> String {
        let mut out = String::new();
        out.push_str(&format!("prefix={}\n", prefix.display()));
        out.push_str(&format!("libdir=${{prefix}}/{}\n", LIB_DIR));
        for (i, dir) in self.includedirs.iter().enumerate() {
            let var = if i == 0 {
                "includedir".to_string()
            } else {
                format!("includedir{}", i + 1)
            };
            out.push_str(&format!("{}=${{prefix}}/{}\n", var, dir.display()));
        }
        out.push('\n');
        out.push_str(&format!("Name: {}\n", identity.name()));
        out.push_str(&format!(
            "Description: {}\n",
            identity.description().unwrap_or("Package generated by quay")
        ));
        out.push_str(&format!("Version: {}\n", identity.version()));

        let libs: Vec<_> = self.libs.iter().map(|l| format!("-l{}", l)).collect();
        out.push_str(&format!("Libs: -L${{libdir}} {}\n", libs.join(" ")));

        let cflags: Vec<_> = (0..self.includedirs.len())
            .map(|i| {
                if i == 0 {
                    "-I${includedir}".to_string()
                } else {
                    format!("-I${{includedir{}}}", i + 1)
                }
            })
            .collect();
        out.push_str(&format!("Cflags: {}\n", cflags.join(" ")));
        out
    }
}
