//! JSON file-ingest unit of exchange: lets tests and external
//! tools hand the indexer a fully-formed file record without a live scan.
//! `IngestFile::into_blocks` / importing this through `storage::graph` must
//! produce the same store state as scanning the same source live.

use serde::{Deserialize, Serialize};

use crate::model::block::BlockKind;
use crate::model::relationship::RelationKind;
use crate::parsing::language::Language;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFile {
    pub project: String,
    pub path: String,
    pub language: Option<Language>,
    pub content_hash: String,
    pub content: String,
    pub blocks: Vec<IngestBlock>,
    pub relationships: Vec<IngestRelationship>,
}

/// Blocks nest their children recursively here; the importer is responsible
/// for flattening this into the `(parent_block_id, ...)` shape `CodeBlock`
/// uses once real `BlockId`s are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestBlock {
    pub kind: BlockKind,
    pub name: String,
    pub content: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    #[serde(default)]
    pub children: Vec<IngestBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRelationship {
    pub target_path: Option<String>,
    pub kind: RelationKind,
    pub raw_text: String,
    pub symbols: Vec<String>,
    pub side_effect_only: bool,
}
