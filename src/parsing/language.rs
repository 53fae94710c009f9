//! Closed language enumeration and file-to-language dispatch.
//!
//! Per the re-architecture note in the design notes: dispatch is a closed
//! `enum Language` matched exhaustively everywhere, never a string-keyed
//! registry. `from_path` checks a static exact-filename table before
//! falling back to extension matching, so an extensionless name that is
//! unambiguously one of the supported languages can be recognized without
//! adding a new `Language` variant. None of the four current languages
//! have such a name, so the table is empty today.

use serde::{Deserialize, Serialize};

/// Filenames that identify a language on their own, with no extension.
/// Checked before `from_extension` in `from_path`.
const FILENAME_EXACT: &[(&str, Language)] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "rs" => Some(Language::Rust),
            "py" | "pyi" => Some(Language::Python),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Exact filename match (e.g. a name with no extension) takes
    /// precedence over extension-based matching.
    pub fn from_filename(filename: &str) -> Option<Self> {
        FILENAME_EXACT
            .iter()
            .find(|(name, _)| *name == filename)
            .map(|(_, lang)| *lang)
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        if let Some(filename) = path.file_name().and_then(|f| f.to_str()) {
            if let Some(lang) = Self::from_filename(filename) {
                return Some(lang);
            }
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &["rs"],
            Language::Python => &["py", "pyi"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
        }
    }

    pub fn config_key(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript | Language::TypeScript => "typescript",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
        }
    }

    /// Stable, variant-distinguishing tag for persistence. Unlike
    /// `config_key`, JavaScript and TypeScript get distinct tags here so a
    /// stored `FileRecord` round-trips its exact language.
    pub fn db_tag(&self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }

    pub fn from_db_tag(tag: &str) -> Option<Self> {
        match tag {
            "rust" => Some(Language::Rust),
            "python" => Some(Language::Python),
            "javascript" => Some(Language::JavaScript),
            "typescript" => Some(Language::TypeScript),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn from_extension_covers_the_supported_set() {
        assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
        assert_eq!(Language::from_extension("RS"), Some(Language::Rust));
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("pyi"), Some(Language::Python));
        assert_eq!(Language::from_extension("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("jsx"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("txt"), None);
    }

    #[test]
    fn from_path_reads_the_extension() {
        assert_eq!(Language::from_path(Path::new("main.rs")), Some(Language::Rust));
        assert_eq!(
            Language::from_path(Path::new("src/lib.rs")),
            Some(Language::Rust)
        );
        assert_eq!(
            Language::from_path(Path::new("script.py")),
            Some(Language::Python)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
    }
}
