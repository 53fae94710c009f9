//! Imports a `model::exchange::IngestFile` into the relational store (C7).
//!
//! Exists so tests can assert JSON-import/live-scan parity:
//! feed the same source through `ParserFactory` + `Orchestrator` on one
//! side and through this importer on the other, and the resulting
//! `code_blocks`/`relationships` rows must match. Only touches C7 — a
//! caller that also wants the file searchable by `query::semantic_search`
//! still has to run it through an `EmbeddingPipeline` itself.

use std::collections::HashMap;

use crate::error::StorageResult;
use crate::model::block::CodeBlock;
use crate::model::exchange::{IngestBlock, IngestFile};
use crate::model::file::FileRecord;
use crate::model::relationship::{normalize_import_text, ImportMetadata, Relationship};
use crate::storage::GraphStore;
use crate::types::{BlockId, BlockIdCounter, FileId, ProjectId};

/// Flattens `ingest`'s recursive blocks, assigns real `BlockId`s in
/// pre-order, resolves each relationship's `target_path` against
/// `known_files`, and persists the result through `GraphStore::ingest_file`.
pub fn import_file(
    graph: &GraphStore,
    project_id: ProjectId,
    known_files: &HashMap<String, FileId>,
    ingest: &IngestFile,
) -> StorageResult<FileId> {
    let file_id = graph.reserve_file_id(project_id, &ingest.path)?;

    let mut blocks = Vec::new();
    let mut counter = BlockIdCounter::new(file_id);
    flatten_blocks(&ingest.blocks, file_id, None, &mut counter, &mut blocks);

    let file = FileRecord {
        id: file_id,
        project_id,
        file_path: ingest.path.clone(),
        language: ingest.language,
        content: ingest.content.clone(),
        content_hash: ingest.content_hash.clone(),
    };

    let relationships: Vec<(Relationship, Option<FileId>)> = ingest
        .relationships
        .iter()
        .map(|raw| {
            let target_id = raw.target_path.as_ref().and_then(|p| known_files.get(p).copied());
            let relationship = Relationship {
                id: 0,
                source_id: file_id,
                target_id,
                kind: raw.kind,
                metadata: ImportMetadata {
                    raw_text: normalize_import_text(&raw.raw_text),
                    symbols: raw.symbols.clone(),
                    side_effect_only: raw.side_effect_only,
                    tie_break: None,
                },
            };
            (relationship, target_id)
        })
        .collect();

    graph.ingest_file(project_id, &file, &blocks, &relationships)
}

fn flatten_blocks(
    blocks: &[IngestBlock],
    file_id: FileId,
    parent_block_id: Option<BlockId>,
    counter: &mut BlockIdCounter,
    out: &mut Vec<CodeBlock>,
) {
    for ingest_block in blocks {
        let id = counter.next_id();
        out.push(CodeBlock {
            id,
            file_id,
            parent_block_id,
            kind: ingest_block.kind,
            name: ingest_block.name.clone(),
            content: ingest_block.content.clone(),
            range: crate::types::Range::new(
                ingest_block.start_line,
                ingest_block.start_col,
                ingest_block.end_line,
                ingest_block.end_col,
            ),
        });
        flatten_blocks(&ingest_block.children, file_id, Some(id), counter, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::BlockKind;
    use std::path::Path;

    #[test]
    fn imported_file_matches_a_hand_built_extraction() {
        let dir = tempfile::TempDir::new().unwrap();
        let graph = GraphStore::open(&dir.path().join("graph.db")).unwrap();
        let project_id = graph.upsert_project("demo", Path::new("/demo"), None).unwrap();

        let ingest = IngestFile {
            project: "demo".to_string(),
            path: "a.py".to_string(),
            language: Some(crate::parsing::language::Language::Python),
            content_hash: "hash-a".to_string(),
            content: "class Handler:\n    def run(self):\n        pass\n".to_string(),
            blocks: vec![IngestBlock {
                kind: BlockKind::Class,
                name: "Handler".to_string(),
                content: "class Handler:\n    def run(self):\n        pass".to_string(),
                start_line: 1,
                start_col: 0,
                end_line: 3,
                end_col: 12,
                children: vec![IngestBlock {
                    kind: BlockKind::Method,
                    name: "run".to_string(),
                    content: "    def run(self):\n        pass".to_string(),
                    start_line: 2,
                    start_col: 4,
                    end_line: 3,
                    end_col: 12,
                    children: vec![],
                }],
            }],
            relationships: vec![],
        };

        let known_files = HashMap::new();
        let file_id = import_file(&graph, project_id, &known_files, &ingest).unwrap();

        let blocks = graph.blocks_for_file(file_id).unwrap();
        assert_eq!(blocks.len(), 2);
        let class_block = blocks.iter().find(|b| b.name == "Handler").unwrap();
        let method_block = blocks.iter().find(|b| b.name == "run").unwrap();
        assert_eq!(method_block.parent_block_id, Some(class_block.id));
        assert_eq!(class_block.kind, BlockKind::Class);
        assert_eq!(method_block.kind, BlockKind::Method);
    }
}
