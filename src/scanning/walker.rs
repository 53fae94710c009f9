//! Directory traversal for discovering candidate source files.
//!
//! Built on `ignore::WalkBuilder`: `.gitignore`/global-gitignore/
//! `.git/info/exclude` honored, hidden directories pruned, symlinks not
//! followed. Unlike a language-aware walker, this one does not filter by
//! language up front — opaque files still need to be hashed and recorded
//! (they remain eligible for file-level embedding even without a
//! `BlockExtractor`).

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::IndexingConfig;

pub struct FileWalker<'a> {
    config: &'a IndexingConfig,
}

impl<'a> FileWalker<'a> {
    pub fn new(config: &'a IndexingConfig) -> Self {
        Self { config }
    }

    pub fn walk(&self, root: &Path) -> Vec<PathBuf> {
        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false);

        let mut override_builder = ignore::overrides::OverrideBuilder::new(root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = override_builder.add(&format!("!{pattern}")) {
                tracing::warn!("Invalid ignore pattern '{pattern}': {e}");
            }
        }
        if let Ok(overrides) = override_builder.build() {
            builder.overrides(overrides);
        }

        builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walks_plain_files_under_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn lib() {}").unwrap();

        let config = IndexingConfig::default();
        let walker = FileWalker::new(&config);
        let files = walker.walk(root);

        assert_eq!(files.len(), 2);
    }

    #[test]
    fn ignores_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".hidden.rs"), "fn hidden() {}").unwrap();
        fs::write(root.join("visible.rs"), "fn visible() {}").unwrap();

        let config = IndexingConfig::default();
        let walker = FileWalker::new(&config);
        let files = walker.walk(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.rs"));
    }

    #[test]
    fn respects_gitignore_without_requiring_a_git_repo() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "ignored.rs\n").unwrap();
        fs::write(root.join("ignored.rs"), "fn ignored() {}").unwrap();
        fs::write(root.join("included.rs"), "fn included() {}").unwrap();

        let config = IndexingConfig::default();
        let walker = FileWalker::new(&config);
        let files = walker.walk(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("included.rs"));
    }

    #[test]
    fn respects_configured_ignore_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/out.rs"), "fn out() {}").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let config = IndexingConfig::default();
        let walker = FileWalker::new(&config);
        let files = walker.walk(root);

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.rs"));
    }
}
