// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Repository Locator
//!
//! Finds a repository directory by name under the configured search roots
//! (default `~/Desktop`). Roots are searched in order; within a root the
//! shallowest match wins, and an exact-case name beats a case-insensitive one.
//! The directory walk runs on tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use walkdir::{DirEntry, WalkDir};

use crate::domain::executor::RepositoryLocator;

pub struct DirectoryRepositoryLocator {
    roots: Arc<[PathBuf]>,
    max_depth: usize,
}

impl DirectoryRepositoryLocator {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize) -> Self {
        Self {
            roots: roots.into(),
            max_depth: max_depth.max(1),
        }
    }
}

fn search(roots: &[PathBuf], max_depth: usize, name: &str) -> Option<PathBuf> {
    roots
        .iter()
        .filter(|root| root.is_dir())
        .find_map(|root| search_root(root, max_depth, name))
}

fn search_root(root: &Path, max_depth: usize, name: &str) -> Option<PathBuf> {
    let mut folded: Option<PathBuf> = None;

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    // WalkDir is depth-first; collect per depth to prefer shallow matches.
    let mut by_depth: Vec<Vec<PathBuf>> = vec![Vec::new(); max_depth + 1];
    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if file_name == name {
            by_depth[entry.depth()].push(entry.into_path());
        } else if folded.is_none() && file_name.eq_ignore_ascii_case(name) {
            folded = Some(entry.into_path());
        }
    }

    by_depth
        .into_iter()
        .find_map(|paths| paths.into_iter().next())
        .or(folded)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name == "node_modules" || name == "target")
}

#[async_trait]
impl RepositoryLocator for DirectoryRepositoryLocator {
    async fn locate(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return None;
        }

        let roots = Arc::clone(&self.roots);
        let max_depth = self.max_depth;
        let query = name.to_string();
        let walk = tokio::task::spawn_blocking(move || search(&roots, max_depth, &query));
        let found = match walk.await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(repo = name, error = %e, "repository search task failed");
                None
            }
        };

        match &found {
            Some(path) => tracing::debug!(repo = name, path = %path.display(), "repository located"),
            None => tracing::debug!(repo = name, "repository not found"),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn finds_shallowest_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("archive/lucifer")).unwrap();
        fs::create_dir_all(dir.path().join("lucifer")).unwrap();

        let locator = DirectoryRepositoryLocator::new(vec![dir.path().to_path_buf()], 3);
        assert_eq!(locator.locate("lucifer").await, Some(dir.path().join("lucifer")));
    }

    #[tokio::test]
    async fn finds_nested_and_case_folded() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("work/Solon")).unwrap();

        let locator = DirectoryRepositoryLocator::new(vec![dir.path().to_path_buf()], 3);
        assert_eq!(locator.locate("solon").await, Some(dir.path().join("work/Solon")));
    }

    #[tokio::test]
    async fn respects_depth_and_hidden_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c/deep")).unwrap();
        fs::create_dir_all(dir.path().join(".cache/secret")).unwrap();

        let locator = DirectoryRepositoryLocator::new(vec![dir.path().to_path_buf()], 3);
        assert_eq!(locator.locate("deep").await, None);
        assert_eq!(locator.locate("secret").await, None);
        assert_eq!(locator.locate("").await, None);
    }

    #[tokio::test]
    async fn ignores_plain_files_and_missing_roots() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes"), "not a repo").unwrap();

        let locator = DirectoryRepositoryLocator::new(
            vec![dir.path().join("missing"), dir.path().to_path_buf()],
            2,
        );
        assert_eq!(locator.locate("notes").await, None);
    }

    #[tokio::test]
    async fn concurrent_lookups_resolve_independently() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["alpha", "beta", "gamma"] {
            fs::create_dir_all(dir.path().join("work").join(name)).unwrap();
        }
        let locator = DirectoryRepositoryLocator::new(vec![dir.path().to_path_buf()], 3);

        let (alpha, beta, gamma) = tokio::join!(
            locator.locate("alpha"),
            locator.locate("beta"),
            locator.locate("gamma"),
        );
        assert_eq!(alpha, Some(dir.path().join("work/alpha")));
        assert_eq!(beta, Some(dir.path().join("work/beta")));
        assert_eq!(gamma, Some(dir.path().join("work/gamma")));
    }
}
