//! C10 Query Surface: the fixed set of read operations a downstream agent
//! is allowed to call. Every operation takes `&GraphStore` (and, for
//! semantic search, `&VectorStore` plus an `&mut EmbeddingModel`) rather than
//! a singleton, paginates with `limit`/`offset`, and orders deterministically
//! by file path then start line so repeated calls are stable.
//!
//! Shaped like a tool-handler module: one function per named operation,
//! structured inputs/outputs, no ad hoc SQL leaking past this module.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingModel;
use crate::error::{StorageError, StorageResult};
use crate::model::block::CodeBlock;
use crate::model::file::FileRecord;
use crate::model::project::Project;
use crate::model::relationship::Relationship;
use crate::storage::{GraphStore, SearchHit, VectorStore};
use crate::types::{BlockId, FileId, ProjectId};

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

fn paginate<T>(mut items: Vec<T>, page: Page) -> Vec<T> {
    if page.offset >= items.len() {
        return Vec::new();
    }
    let end = (page.offset + page.limit).min(items.len());
    items.drain(page.offset..end).collect()
}

pub fn get_file_by_path(graph: &GraphStore, project_id: ProjectId, path: &str) -> StorageResult<Option<FileRecord>> {
    graph.get_file_by_path(project_id, path)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileBlockSummary {
    pub file: FileRecord,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockSummary {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub start_line: u32,
    pub end_line: u32,
}

/// One row per top-level block in the file plus its depth-first descendants,
/// in the order the extractor emitted them (pre-order, so parents precede
/// their children).
pub fn get_file_block_summary(
    graph: &GraphStore,
    project_id: ProjectId,
    path: &str,
) -> StorageResult<Option<FileBlockSummary>> {
    let Some(file) = graph.get_file_by_path(project_id, path)? else {
        return Ok(None);
    };
    let blocks = graph.blocks_for_file(file.id)?;
    let summaries = blocks
        .iter()
        .map(|b| BlockSummary {
            id: b.id.to_string(),
            kind: b.kind.as_str().to_string(),
            name: b.name.clone(),
            start_line: b.start_line(),
            end_line: b.end_line(),
        })
        .collect();
    Ok(Some(FileBlockSummary { file, blocks: summaries }))
}

/// Exact name match first; if nothing matches, falls back to a prefix
/// search over the same name column.
pub fn get_blocks_by_name(
    graph: &GraphStore,
    project_id: Option<ProjectId>,
    name: &str,
    page: Page,
) -> StorageResult<Vec<CodeBlock>> {
    let exact = graph.blocks_by_exact_name(project_id, name)?;
    if !exact.is_empty() {
        return Ok(paginate(exact, page));
    }
    let prefix = graph.blocks_by_name_prefix(project_id, name)?;
    Ok(paginate(prefix, page))
}

/// Case-insensitive match over block name and content; name hits are ranked
/// above content hits.
pub fn get_blocks_by_keyword(
    graph: &GraphStore,
    project_id: Option<ProjectId>,
    keyword: &str,
    page: Page,
) -> StorageResult<Vec<CodeBlock>> {
    let matches = graph.blocks_by_keyword(project_id, keyword)?;
    Ok(paginate(matches, page))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockDetails {
    pub block: CodeBlock,
    pub file: FileRecord,
    pub project: Project,
}

/// Joins a block to its owning file and project (C7) so a caller never has
/// to walk `file_id` -> `project_id` itself.
pub fn get_block_details(graph: &GraphStore, block_id: BlockId) -> StorageResult<Option<BlockDetails>> {
    let Some(block) = graph.get_block(block_id)? else {
        return Ok(None);
    };
    let Some((project_id, file)) = graph.get_file(block.file_id)? else {
        return Ok(None);
    };
    let Some(project) = graph.get_project(project_id)? else {
        return Ok(None);
    };
    Ok(Some(BlockDetails { block, file, project }))
}

pub fn get_file_imports(graph: &GraphStore, file_id: FileId) -> StorageResult<Vec<Relationship>> {
    graph.relationships_for_source(file_id)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DependencyStep {
    pub file_id: FileId,
    pub depth: usize,
}

/// Walks the import graph outward from `file_id` up to `max_hops`,
/// breadth-first, breaking cycles by never revisiting a file id. The start
/// file itself is not included in the result.
pub fn get_dependency_chain(graph: &GraphStore, file_id: FileId, max_hops: usize) -> StorageResult<Vec<DependencyStep>> {
    let mut visited: HashSet<FileId> = HashSet::from([file_id]);
    let mut queue: VecDeque<(FileId, usize)> = VecDeque::from([(file_id, 0)]);
    let mut result = Vec::new();

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_hops {
            continue;
        }
        for relationship in graph.relationships_for_source(current)? {
            let Some(target) = relationship.target_id else { continue };
            if !visited.insert(target) {
                continue;
            }
            result.push(DependencyStep {
                file_id: target,
                depth: depth + 1,
            });
            queue.push_back((target, depth + 1));
        }
    }

    Ok(result)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SemanticHit {
    pub owner_key: String,
    pub chunk_start_line: u32,
    pub chunk_end_line: u32,
    pub similarity: f32,
    /// Present when `owner_key` names a block (`"block_<id>"`) and the
    /// block still exists.
    pub block: Option<CodeBlock>,
    /// The owning file, whether `owner_key` names the file directly or a
    /// block within it. Absent if the owner has since been deleted.
    pub file: Option<FileRecord>,
}

/// Parses `owner_key`'s `"file_<id>"`/`"block_<id>"` prefix and fans out to
/// C7 to recover the block (if any) and its owning file, so a hit never
/// reaches the caller as a bare key plus a score.
fn resolve_owner(graph: &GraphStore, owner_key: &str) -> StorageResult<(Option<CodeBlock>, Option<FileRecord>)> {
    if let Some(raw_id) = owner_key.strip_prefix("block_") {
        let Ok(raw_id) = raw_id.parse::<u64>() else {
            return Ok((None, None));
        };
        let Some(block) = graph.get_block(BlockId::from_u64(raw_id))? else {
            return Ok((None, None));
        };
        let file = graph.get_file(block.file_id)?.map(|(_, file)| file);
        return Ok((Some(block), file));
    }
    if let Some(raw_id) = owner_key.strip_prefix("file_") {
        let Some(file_id) = raw_id.parse::<u32>().ok().and_then(FileId::new) else {
            return Ok((None, None));
        };
        let file = graph.get_file(file_id)?.map(|(_, file)| file);
        return Ok((None, file));
    }
    Ok((None, None))
}

/// Embeds `query_text`, searches C8, and enriches each hit with its C7
/// block/file context. Hits are ordered by similarity descending (the
/// vector store already orders by ascending distance).
pub fn semantic_search(
    graph: &GraphStore,
    vectors: &VectorStore,
    model: &mut EmbeddingModel,
    query_text: &str,
    limit: usize,
    threshold: f32,
) -> StorageResult<Vec<SemanticHit>> {
    let mut embedded = model
        .embed_batch(std::slice::from_ref(&query_text.to_string()))
        .map_err(|e| StorageError::IntegrityViolation {
            reason: format!("failed to embed query: {e}"),
        })?;
    let query_vector = embedded.pop().ok_or_else(|| StorageError::IntegrityViolation {
        reason: "embedding the query produced no vector".to_string(),
    })?;

    let hits: Vec<SearchHit> = vectors.search(&query_vector, limit, threshold)?;
    let mut enriched = Vec::with_capacity(hits.len());
    for hit in hits {
        let (block, file) = resolve_owner(graph, &hit.owner_key)?;
        enriched.push(SemanticHit {
            owner_key: hit.owner_key,
            chunk_start_line: hit.chunk_start_line,
            chunk_end_line: hit.chunk_end_line,
            similarity: hit.similarity,
            block,
            file,
        });
    }
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::BlockKind;
    use crate::parsing::language::Language;
    use crate::types::Range;
    use std::path::Path;
    use tempfile::TempDir;

    fn store() -> (TempDir, GraphStore) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(&dir.path().join("graph.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn get_blocks_by_name_falls_back_to_prefix_when_no_exact_match() {
        let (_dir, graph) = store();
        let project_id = graph.upsert_project("demo", Path::new("/demo"), None).unwrap();
        let file = FileRecord {
            id: FileId::new(1).unwrap(),
            project_id,
            file_path: "a.py".to_string(),
            language: Some(Language::Python),
            content: "class Handler:\n    pass\n".to_string(),
            content_hash: "h1".to_string(),
        };
        let block = CodeBlock {
            id: BlockId::new(FileId::new(1).unwrap(), 1),
            file_id: FileId::new(1).unwrap(),
            parent_block_id: None,
            kind: BlockKind::Class,
            name: "HandlerImpl".to_string(),
            content: "class Handler:\n    pass".to_string(),
            range: Range::new(1, 0, 2, 8),
        };
        graph.ingest_file(project_id, &file, &[block], &[]).unwrap();

        let exact = get_blocks_by_name(&graph, Some(project_id), "HandlerImpl", Page::new(10, 0)).unwrap();
        assert_eq!(exact.len(), 1);

        let prefix = get_blocks_by_name(&graph, Some(project_id), "Handler", Page::new(10, 0)).unwrap();
        assert_eq!(prefix.len(), 1);
        assert_eq!(prefix[0].name, "HandlerImpl");
    }

    #[test]
    fn get_block_details_joins_block_file_and_project() {
        let (_dir, graph) = store();
        let project_id = graph.upsert_project("demo", Path::new("/demo"), None).unwrap();
        let file = FileRecord {
            id: FileId::new(1).unwrap(),
            project_id,
            file_path: "a.py".to_string(),
            language: Some(Language::Python),
            content: "class C:\n    pass\n".to_string(),
            content_hash: "h1".to_string(),
        };
        let block = CodeBlock {
            id: BlockId::new(FileId::new(1).unwrap(), 1),
            file_id: FileId::new(1).unwrap(),
            parent_block_id: None,
            kind: BlockKind::Class,
            name: "C".to_string(),
            content: "class C:\n    pass".to_string(),
            range: Range::new(1, 0, 2, 8),
        };
        graph.ingest_file(project_id, &file, &[block.clone()], &[]).unwrap();

        let details = get_block_details(&graph, block.id).unwrap().unwrap();
        assert_eq!(details.block.name, "C");
        assert_eq!(details.file.file_path, "a.py");
        assert_eq!(details.project.name, "demo");
    }

    #[test]
    fn get_block_details_returns_none_for_an_unknown_block() {
        let (_dir, graph) = store();
        let missing = BlockId::new(FileId::new(1).unwrap(), 1);
        assert!(get_block_details(&graph, missing).unwrap().is_none());
    }

    #[test]
    fn get_dependency_chain_stops_at_max_hops_and_breaks_cycles() {
        let (_dir, graph) = store();
        let project_id = graph.upsert_project("demo", Path::new("/demo"), None).unwrap();

        for (path, id) in [("a.py", 1u32), ("b.py", 2), ("c.py", 3)] {
            let file = FileRecord {
                id: FileId::new(id).unwrap(),
                project_id,
                file_path: path.to_string(),
                language: Some(Language::Python),
                content: "x = 1\n".to_string(),
                content_hash: format!("hash{id}"),
            };
            graph.ingest_file(project_id, &file, &[], &[]).unwrap();
        }

        let a_id = graph.get_file_by_path(project_id, "a.py").unwrap().unwrap().id;
        let b_id = graph.get_file_by_path(project_id, "b.py").unwrap().unwrap().id;
        let c_id = graph.get_file_by_path(project_id, "c.py").unwrap().unwrap().id;

        let a_to_b = Relationship {
            id: 0,
            source_id: a_id,
            target_id: Some(b_id),
            kind: crate::model::relationship::RelationKind::Import,
            metadata: crate::model::relationship::ImportMetadata {
                raw_text: "from .b import f".to_string(),
                symbols: vec!["f".to_string()],
                side_effect_only: false,
                tie_break: None,
            },
        };
        let b_to_c = Relationship {
            id: 0,
            source_id: b_id,
            target_id: Some(c_id),
            kind: crate::model::relationship::RelationKind::Import,
            metadata: crate::model::relationship::ImportMetadata {
                raw_text: "from .c import g".to_string(),
                symbols: vec!["g".to_string()],
                side_effect_only: false,
                tie_break: None,
            },
        };
        let c_to_a = Relationship {
            id: 0,
            source_id: c_id,
            target_id: Some(a_id),
            kind: crate::model::relationship::RelationKind::Import,
            metadata: crate::model::relationship::ImportMetadata {
                raw_text: "from .a import h".to_string(),
                symbols: vec!["h".to_string()],
                side_effect_only: false,
                tie_break: None,
            },
        };

        let file_a = graph.get_file_by_path(project_id, "a.py").unwrap().unwrap();
        graph
            .ingest_file(project_id, &file_a, &[], &[(a_to_b, Some(b_id))])
            .unwrap();
        let file_b = graph.get_file_by_path(project_id, "b.py").unwrap().unwrap();
        graph
            .ingest_file(project_id, &file_b, &[], &[(b_to_c, Some(c_id))])
            .unwrap();
        let file_c = graph.get_file_by_path(project_id, "c.py").unwrap().unwrap();
        graph
            .ingest_file(project_id, &file_c, &[], &[(c_to_a, Some(a_id))])
            .unwrap();

        let chain = get_dependency_chain(&graph, a_id, 10).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].file_id, b_id);
        assert_eq!(chain[1].file_id, c_id);

        let shallow = get_dependency_chain(&graph, a_id, 1).unwrap();
        assert_eq!(shallow.len(), 1);
        assert_eq!(shallow[0].file_id, b_id);
    }
}
