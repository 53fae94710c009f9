//! Nested-function hoisting (C4).
//!
//! A block extractor always emits nested function/method declarations as
//! child blocks, regardless of size (`hoist_blocks` is not what decides
//! *whether* a nested function becomes a block — the extractor does). What
//! hoisting decides is whether the *parent's* stored content keeps the
//! nested body inline or replaces it with a `[BLOCK_REF:<id>]` marker line:
//! only parents whose own span exceeds `threshold` lines get rewritten, and
//! only their *immediate* function/method children are substituted — a
//! grandchild nested two levels deep is left for its own immediate parent
//! to decide.
//!
//! Grounded in `indexer/demo_nested_extraction.py` (original_source/), which
//! is also the source of this crate's S2/S3 seed tests.

use std::collections::HashMap;

use crate::model::block::{BlockKind, CodeBlock};
use crate::types::BlockId;

fn leading_whitespace(line: &str) -> String {
    line.chars().take_while(|c| c.is_whitespace()).collect()
}

fn block_ref_marker(id: BlockId) -> String {
    format!("[BLOCK_REF:{id}]")
}

/// Rewrites `blocks` in place. `source` is the file's full original text,
/// used to rebuild an oversized parent's content line by line with nested
/// function bodies collapsed to marker lines.
pub fn hoist_blocks(source: &str, blocks: &mut [CodeBlock], threshold: u32) {
    let source_lines: Vec<&str> = source.lines().collect();

    let mut children_by_parent: HashMap<BlockId, Vec<usize>> = HashMap::new();
    for (i, block) in blocks.iter().enumerate() {
        if let Some(parent_id) = block.parent_block_id {
            children_by_parent.entry(parent_id).or_default().push(i);
        }
    }

    for i in 0..blocks.len() {
        let block = &blocks[i];
        if !matches!(block.kind, BlockKind::Function | BlockKind::Method) {
            continue;
        }
        if block.range.line_span() <= threshold {
            continue;
        }

        let mut candidates: Vec<usize> = children_by_parent
            .get(&block.id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|&ci| matches!(blocks[ci].kind, BlockKind::Function | BlockKind::Method))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        candidates.sort_by_key(|&ci| blocks[ci].range.start_line);

        // Idempotence: if every candidate is already marked, leave content alone.
        let already_hoisted = candidates
            .iter()
            .all(|&ci| blocks[i].content.contains(&block_ref_marker(blocks[ci].id)));
        if already_hoisted {
            continue;
        }

        let start_line = blocks[i].range.start_line;
        let end_line = blocks[i].range.end_line;
        let mut new_lines: Vec<String> = Vec::new();
        let mut line_no = start_line;
        let mut next_candidate = 0;

        while line_no <= end_line {
            if let Some(&ci) = candidates.get(next_candidate) {
                let child = &blocks[ci];
                if line_no == child.range.start_line {
                    let indent = leading_whitespace(
                        source_lines.get((line_no - 1) as usize).copied().unwrap_or(""),
                    );
                    new_lines.push(format!("{indent}{}", block_ref_marker(child.id)));
                    line_no = child.range.end_line + 1;
                    next_candidate += 1;
                    continue;
                }
            }
            new_lines.push(
                source_lines
                    .get((line_no - 1) as usize)
                    .copied()
                    .unwrap_or("")
                    .to_string(),
            );
            line_no += 1;
        }

        blocks[i].content = new_lines.join("\n");
    }
}
