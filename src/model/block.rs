use serde::{Deserialize, Serialize};

use crate::types::{BlockId, FileId, Range};

/// The nine block kinds a block extractor may emit. Closed enum, matched
/// exhaustively wherever storage or query code branches on kind — per the
/// "no string-keyed dispatch" re-architecture note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    Function,
    Class,
    Method,
    Variable,
    Interface,
    Enum,
    Type,
    Import,
    Export,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Function => "function",
            BlockKind::Class => "class",
            BlockKind::Method => "method",
            BlockKind::Variable => "variable",
            BlockKind::Interface => "interface",
            BlockKind::Enum => "enum",
            BlockKind::Type => "type",
            BlockKind::Import => "import",
            BlockKind::Export => "export",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "function" => BlockKind::Function,
            "class" => BlockKind::Class,
            "method" => BlockKind::Method,
            "variable" => BlockKind::Variable,
            "interface" => BlockKind::Interface,
            "enum" => BlockKind::Enum,
            "type" => BlockKind::Type,
            "import" => BlockKind::Import,
            "export" => BlockKind::Export,
            _ => return None,
        })
    }
}

/// A single syntactic entity extracted from one file.
///
/// Invariants:
/// - `start_line <= end_line`, both 1-indexed and inclusive.
/// - if `parent_block_id` is `Some`, the parent belongs to the same `file_id`
///   and its range contains this block's range.
/// - `name` is never empty; extractors synthesize `anonymous_<start_line>`
///   for entities with no syntactic name (e.g. an IIFE).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub id: BlockId,
    pub file_id: FileId,
    pub parent_block_id: Option<BlockId>,
    pub kind: BlockKind,
    pub name: String,
    /// Verbatim source text for this block's range. For a block that
    /// triggered hoisting, nested function bodies are replaced by
    /// `[BLOCK_REF:<id>]` marker lines (see `parsing::hoist`).
    pub content: String,
    pub range: Range,
}

impl CodeBlock {
    pub fn start_line(&self) -> u32 {
        self.range.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.range.end_line
    }

    pub fn synthesize_name(start_line: u32) -> String {
        format!("anonymous_{start_line}")
    }
}
