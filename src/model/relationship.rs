use serde::{Deserialize, Serialize};

use crate::types::FileId;

/// Closed relationship kind set. Today the resolver only emits `Import`;
/// the enum stays closed (rather than a free-form string tag) so adding a
/// new kind later is an exhaustive-match compile error everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    Import,
}

/// Which tie-break rule the resolver used to pick `target_id` among several
/// candidate files that could satisfy an import. Recorded for explainability,
/// not consumed by any runtime decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TieBreak {
    SameDirectory,
    ShortestPath,
    Lexicographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMetadata {
    /// The import statement's text, whitespace-normalized (whitespace runs
    /// collapsed to a single space, ends trimmed; case preserved) — this
    /// normalized form is also what `(source_id, target_id, text)`
    /// uniqueness is keyed on.
    pub raw_text: String,
    pub symbols: Vec<String>,
    pub side_effect_only: bool,
    pub tie_break: Option<TieBreak>,
}

/// An edge from one file to another, discovered by resolving an import
/// statement against the project's known file set.
///
/// `target_id` is `None` when no candidate file resolves (an external
/// package import, for example) — the edge is still recorded so C10 can
/// report "this file imports X, unresolved" rather than silently dropping it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    pub source_id: FileId,
    pub target_id: Option<FileId>,
    pub kind: RelationKind,
    pub metadata: ImportMetadata,
}

/// Collapse whitespace runs to a single space and trim both ends. Case is
/// preserved deliberately: import paths can be case-sensitive.
pub fn normalize_import_text(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut last_was_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                normalized.push(' ');
            }
            last_was_space = true;
        } else {
            normalized.push(ch);
            last_was_space = false;
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_internal_whitespace_and_trims() {
        assert_eq!(normalize_import_text("  use   std::io ;  "), "use std::io ;");
    }

    #[test]
    fn normalize_preserves_case() {
        assert_eq!(normalize_import_text("import Foo from './Foo'"), "import Foo from './Foo'");
    }
}
