//! C5 Relationship Resolver.
//!
//! A `RawImport`'s text is turned into a small set of candidate relative
//! file paths using per-language conventions, intersected with the
//! project's known file set, and tie-broken same-directory > shortest-path
//! > lexicographically-smallest.

use std::collections::HashMap;

use crate::model::relationship::{normalize_import_text, ImportMetadata, TieBreak};
use crate::parsing::language::Language;
use crate::parsing::RawImport;
use crate::types::FileId;

pub struct ResolvedImport {
    pub target_id: Option<FileId>,
    pub metadata: ImportMetadata,
}

/// Resolves one import statement against the project's known file set.
/// `source_path` and every key of `known_files` are POSIX-relative to the
/// project root.
pub fn resolve_import(
    source_path: &str,
    language: Language,
    raw: &RawImport,
    known_files: &HashMap<String, FileId>,
) -> ResolvedImport {
    let candidates = candidate_paths(source_path, language, &raw.module_text);
    let matches: Vec<&String> = candidates
        .iter()
        .filter(|candidate| known_files.contains_key(*candidate))
        .collect();

    let (target_path, tie_break) = pick(source_path, matches);
    let target_id = target_path.and_then(|path| known_files.get(&path).copied());

    ResolvedImport {
        target_id,
        metadata: ImportMetadata {
            raw_text: normalize_import_text(&raw.raw_text),
            symbols: raw.symbols.clone(),
            side_effect_only: raw.side_effect_only,
            tie_break,
        },
    }
}

fn pick(source_path: &str, matches: Vec<&String>) -> (Option<String>, Option<TieBreak>) {
    if matches.is_empty() {
        return (None, None);
    }
    if matches.len() == 1 {
        return (Some(matches[0].clone()), None);
    }

    let source_dir = parent_dir(source_path);
    let same_dir: Vec<&String> = matches
        .iter()
        .filter(|m| parent_dir(m) == source_dir)
        .copied()
        .collect();
    if same_dir.len() == 1 {
        return (Some(same_dir[0].clone()), Some(TieBreak::SameDirectory));
    }
    let pool: Vec<&String> = if !same_dir.is_empty() { same_dir } else { matches };

    let min_len = pool.iter().map(|p| p.len()).min().unwrap_or(0);
    let shortest: Vec<&String> = pool.iter().filter(|p| p.len() == min_len).copied().collect();
    if shortest.len() == 1 {
        return (Some(shortest[0].clone()), Some(TieBreak::ShortestPath));
    }

    let mut lexicographic: Vec<&String> = shortest;
    lexicographic.sort();
    (
        lexicographic.first().map(|s| s.to_string()),
        Some(TieBreak::Lexicographic),
    )
}

fn candidate_paths(source_path: &str, language: Language, module_text: &str) -> Vec<String> {
    match language {
        Language::Python => python_candidates(source_path, module_text),
        Language::JavaScript | Language::TypeScript => typescript_candidates(source_path, module_text),
        Language::Rust => rust_candidates(module_text),
    }
}

fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn normalize_join(dir: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };
    for part in relative.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// `module_text` arrives as a leading-dot-counted relative module, e.g.
/// `.b` (one dot, same package) or `..pkg.mod` (two dots, parent package).
fn python_candidates(source_path: &str, module_text: &str) -> Vec<String> {
    let source_dir = parent_dir(source_path);
    let dots = module_text.chars().take_while(|&c| c == '.').count();
    let rest = &module_text[dots..];
    let rel_module_path = rest.replace('.', "/");

    if dots == 0 {
        return vec![format!("{rel_module_path}.py"), format!("{rel_module_path}/__init__.py")];
    }

    let mut base_dir = source_dir;
    for _ in 1..dots {
        base_dir = parent_dir(&base_dir);
    }
    let joined = if rel_module_path.is_empty() {
        base_dir
    } else if base_dir.is_empty() {
        rel_module_path
    } else {
        format!("{base_dir}/{rel_module_path}")
    };

    vec![format!("{joined}.py"), format!("{joined}/__init__.py")]
}

fn typescript_candidates(source_path: &str, module_text: &str) -> Vec<String> {
    if !module_text.starts_with('.') {
        return Vec::new();
    }
    let source_dir = parent_dir(source_path);
    let joined = normalize_join(&source_dir, module_text);

    let mut candidates = Vec::new();
    for ext in ["ts", "tsx", "js", "jsx"] {
        candidates.push(format!("{joined}.{ext}"));
    }
    for ext in ["ts", "tsx", "js", "jsx"] {
        candidates.push(format!("{joined}/index.{ext}"));
    }
    candidates
}

fn rust_candidates(module_text: &str) -> Vec<String> {
    let cleaned = module_text
        .trim_start_matches("crate::")
        .trim_start_matches("self::")
        .trim_start_matches("super::");
    let path = cleaned.replace("::", "/");
    vec![format!("src/{path}.rs"), format!("src/{path}/mod.rs")]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(paths: &[(&str, u32)]) -> HashMap<String, FileId> {
        paths
            .iter()
            .map(|(p, id)| (p.to_string(), FileId::new(*id).unwrap()))
            .collect()
    }

    #[test]
    fn s4_relative_python_import_resolves_sibling_file() {
        let known_files = known(&[("a.py", 1), ("b.py", 2)]);
        let raw = RawImport {
            module_text: ".b".to_string(),
            symbols: vec!["f".to_string()],
            side_effect_only: false,
            raw_text: "from .b import f".to_string(),
            start_line: 1,
        };
        let resolved = resolve_import("a.py", Language::Python, &raw, &known_files);
        assert_eq!(resolved.target_id, FileId::new(2));
        assert_eq!(resolved.metadata.symbols, vec!["f"]);
    }

    #[test]
    fn typescript_relative_import_tries_multiple_extensions() {
        let known_files = known(&[("src/main.ts", 1), ("src/util.tsx", 2)]);
        let raw = RawImport {
            module_text: "./util".to_string(),
            symbols: vec!["helper".to_string()],
            side_effect_only: false,
            raw_text: "import { helper } from './util'".to_string(),
            start_line: 1,
        };
        let resolved = resolve_import("src/main.ts", Language::TypeScript, &raw, &known_files);
        assert_eq!(resolved.target_id, FileId::new(2));
    }

    #[test]
    fn unresolvable_external_package_import_has_no_target() {
        let known_files = known(&[("src/main.ts", 1)]);
        let raw = RawImport {
            module_text: "react".to_string(),
            symbols: vec!["React".to_string()],
            side_effect_only: false,
            raw_text: "import React from 'react'".to_string(),
            start_line: 1,
        };
        let resolved = resolve_import("src/main.ts", Language::TypeScript, &raw, &known_files);
        assert_eq!(resolved.target_id, None);
    }

    #[test]
    fn tie_break_prefers_same_directory_then_shortest_then_lexicographic() {
        let known_files = known(&[
            ("pkg/util.py", 1),
            ("pkg/sub/util.py", 2),
            ("pkg/util/__init__.py", 3),
        ]);
        let raw = RawImport {
            module_text: ".util".to_string(),
            symbols: vec![],
            side_effect_only: true,
            raw_text: "from .util import *".to_string(),
            start_line: 1,
        };
        let resolved = resolve_import("pkg/main.py", Language::Python, &raw, &known_files);
        assert_eq!(resolved.target_id, FileId::new(1));
        assert_eq!(resolved.metadata.tie_break, Some(TieBreak::SameDirectory));
    }
}
