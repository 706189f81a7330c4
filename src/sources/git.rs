//! Git source - fetch the tagged source tree of a recipe.

use std::path::{Path, PathBuf};

use git2::build::CheckoutBuilder;
use git2::{AutotagOption, FetchOptions, Repository};
use url::Url;

use crate::core::errors::RecipeError;
use crate::core::recipe::Recipe;
use crate::core::stage::Stage;
use crate::sources::FetchStrategy;
use crate::util::fs::{ensure_dir, merge_dir_into};

/// File whose presence marks a source folder as populated.
pub const POPULATED_MARKER: &str = "meson.build";

/// Result of running the acquirer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceStatus {
    /// The source folder already held a source tree; nothing was fetched
    AlreadyPresent,
    /// The tree was fetched and checked out at `commit`
    Fetched { commit: String },
}

/// Fetches a repository at a tag into a source folder.
#[derive(Debug, Clone)]
pub struct SourceAcquirer {
    url: Url,
    reference: String,
    strategy: FetchStrategy,
    expected_commit: Option<String>,
}

impl SourceAcquirer {
    pub fn new(url: Url, reference: impl Into<String>, strategy: FetchStrategy) -> Self {
        SourceAcquirer {
            url,
            reference: reference.into(),
            strategy,
            expected_commit: None,
        }
    }

    /// Acquirer for a recipe's `url` at `v<version>`.
    pub fn for_recipe(recipe: &Recipe, strategy: FetchStrategy) -> Self {
        let identity = recipe.identity();
        SourceAcquirer::new(identity.url().clone(), identity.source_ref(), strategy)
            .with_expected_commit(recipe.source().commit.clone())
    }

    /// Require the tag to resolve to a commit starting with `commit`.
    pub fn with_expected_commit(mut self, commit: Option<String>) -> Self {
        self.expected_commit = commit;
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Whether `source_folder` already holds a source tree.
    pub fn is_populated(source_folder: &Path) -> bool {
        source_folder.join(POPULATED_MARKER).is_file()
    }

    /// Make sure `source_folder` holds the tagged tree.
    pub fn acquire(&self, source_folder: &Path) -> Result<SourceStatus, RecipeError> {
        if Self::is_populated(source_folder) {
            tracing::info!("using local sources in {}", source_folder.display());
            return Ok(SourceStatus::AlreadyPresent);
        }

        ensure_dir(source_folder)
            .map_err(|e| RecipeError::configuration(Stage::Source, format!("{:#}", e)))?;

        // Dropping the staging dir on any error leaves the source folder as it was.
        let staging = tempfile::Builder::new()
            .prefix(".quay-fetch-")
            .tempdir_in(source_folder)
            .map_err(|e| {
                RecipeError::configuration(
                    Stage::Source,
                    format!(
                        "failed to create staging directory in {}: {}",
                        source_folder.display(),
                        e
                    ),
                )
            })?;

        tracing::info!(
            "fetching {} at {} ({})",
            self.url,
            self.reference,
            self.strategy
        );
        let commit = self.fetch_into(staging.path())?;

        if !staging.path().join(POPULATED_MARKER).is_file() {
            return Err(self.fetch_error(format!(
                "tagged tree does not contain `{}`",
                POPULATED_MARKER
            )));
        }

        let skipped = merge_dir_into(staging.path(), source_folder)
            .map_err(|e| self.fetch_error(format!("{:#}", e)))?;
        for name in skipped {
            tracing::debug!("keeping local `{}` over the fetched one", name);
        }

        tracing::info!(
            "checked out {} at {}",
            self.reference,
            commit.get(..12).unwrap_or(&commit)
        );
        Ok(SourceStatus::Fetched { commit })
    }

    fn fetch_into(&self, dir: &Path) -> Result<String, RecipeError> {
        let repo = Repository::init(dir).map_err(|e| self.fetch_error(e.message()))?;

        let tag_ref = format!("refs/tags/{}", self.reference);
        let mut refspecs = vec![format!("+{0}:{0}", tag_ref)];
        let mut fetch_options = FetchOptions::new();
        match self.strategy {
            FetchStrategy::Shallow => {
                fetch_options.depth(1);
                fetch_options.download_tags(AutotagOption::None);
            }
            FetchStrategy::Full => {
                refspecs.push("+refs/heads/*:refs/remotes/origin/*".to_string());
                refspecs.push("+refs/tags/*:refs/tags/*".to_string());
                fetch_options.download_tags(AutotagOption::All);
            }
        }

        {
            let mut remote = repo
                .remote_anonymous(self.url.as_str())
                .map_err(|e| self.fetch_error(e.message()))?;
            remote
                .fetch(&refspecs, Some(&mut fetch_options), None)
                .map_err(|e| self.fetch_error(e.message()))?;
        }

        let commit = repo
            .find_reference(&tag_ref)
            .and_then(|r| r.peel_to_commit())
            .map_err(|_| self.fetch_error(format!("tag `{}` not found", self.reference)))?;
        let id = commit.id().to_string();

        if let Some(expected) = &self.expected_commit {
            if !id.starts_with(&expected.to_ascii_lowercase()) {
                return Err(self.fetch_error(format!(
                    "tag resolves to {} but the recipe expects {}",
                    id, expected
                )));
            }
        }

        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .map_err(|e| self.fetch_error(e.message()))?;
        repo.set_head_detached(commit.id())
            .map_err(|e| self.fetch_error(e.message()))?;

        Ok(id)
    }

    fn fetch_error(&self, message: impl Into<String>) -> RecipeError {
        RecipeError::SourceFetch {
            url: self.url.to_string(),
            reference: self.reference.clone(),
            message: message.into(),
        }
    }
}

/// Entries of `dir` left over from an interrupted fetch.
pub fn stale_staging_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".quay-fetch-"))
        .map(|e| e.path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{git_repo_with_tag, write_fossil_sources};
    use tempfile::TempDir;

    fn file_url(path: &Path) -> Url {
        Url::from_file_path(path).unwrap()
    }

    #[test]
    fn test_populated_folder_is_noop() {
        let tmp = TempDir::new().unwrap();
        write_fossil_sources(tmp.path());

        let acquirer = SourceAcquirer::new(
            Url::parse("https://invalid.example/none.git").unwrap(),
            "v0.1.3",
            FetchStrategy::Shallow,
        );
        assert_eq!(acquirer.acquire(tmp.path()).unwrap(), SourceStatus::AlreadyPresent);
        assert_eq!(acquirer.acquire(tmp.path()).unwrap(), SourceStatus::AlreadyPresent);
    }

    #[test]
    fn test_fetch_tag_into_source_folder() {
        let upstream = TempDir::new().unwrap();
        let tagged = git_repo_with_tag(upstream.path(), "v0.1.3");

        let work = TempDir::new().unwrap();
        std::fs::write(work.path().join("Recipe.toml"), "local").unwrap();

        let acquirer =
            SourceAcquirer::new(file_url(upstream.path()), "v0.1.3", FetchStrategy::Full);
        let status = acquirer.acquire(work.path()).unwrap();

        assert_eq!(status, SourceStatus::Fetched { commit: tagged });
        assert!(work.path().join("meson.build").is_file());
        assert!(work.path().join("code/logic/fossil/sys/sys.h").is_file());
        assert_eq!(std::fs::read_to_string(work.path().join("Recipe.toml")).unwrap(), "local");
        assert!(stale_staging_dirs(work.path()).is_empty());

        // Second run sees a populated folder.
        assert_eq!(acquirer.acquire(work.path()).unwrap(), SourceStatus::AlreadyPresent);
    }

    #[test]
    fn test_missing_tag_leaves_no_partial_tree() {
        let upstream = TempDir::new().unwrap();
        git_repo_with_tag(upstream.path(), "v0.1.2");

        let work = TempDir::new().unwrap();
        let acquirer =
            SourceAcquirer::new(file_url(upstream.path()), "v0.1.3", FetchStrategy::Full);
        let err = acquirer.acquire(work.path()).unwrap_err();

        assert!(matches!(err, RecipeError::SourceFetch { .. }));
        assert!(err.to_string().contains("v0.1.3"));
        assert!(!work.path().join("meson.build").exists());
        assert!(stale_staging_dirs(work.path()).is_empty());
    }

    #[test]
    fn test_commit_mismatch_is_fetch_error() {
        let upstream = TempDir::new().unwrap();
        git_repo_with_tag(upstream.path(), "v0.1.3");

        let work = TempDir::new().unwrap();
        let acquirer =
            SourceAcquirer::new(file_url(upstream.path()), "v0.1.3", FetchStrategy::Full)
                .with_expected_commit(Some("0000000".to_string()));
        let err = acquirer.acquire(work.path()).unwrap_err();

        assert!(err.to_string().contains("expects 0000000"));
        assert!(!work.path().join("meson.build").exists());
    }

    #[test]
    fn test_expected_commit_prefix_matches() {
        let upstream = TempDir::new().unwrap();
        let tagged = git_repo_with_tag(upstream.path(), "v0.1.3");

        let work = TempDir::new().unwrap();
        let acquirer =
            SourceAcquirer::new(file_url(upstream.path()), "v0.1.3", FetchStrategy::Full)
                .with_expected_commit(Some(tagged[..10].to_uppercase()));
        assert!(acquirer.acquire(work.path()).is_ok());
    }

    #[test]
    fn test_unreachable_remote_is_fetch_error() {
        let work = TempDir::new().unwrap();
        let missing = work.path().join("no-such-repo");
        let acquirer = SourceAcquirer::new(
            Url::from_file_path(&missing).unwrap(),
            "v0.1.3",
            FetchStrategy::Full,
        );

        let err = acquirer.acquire(&work.path().join("src")).unwrap_err();
        assert!(err.is_retryable());
    }
}
