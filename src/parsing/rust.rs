//! Rust block extractor: tree-sitter cursor recursion with field-based
//! child lookup, emitting `CodeBlock`s for struct/enum/trait declarations
//! and their methods.
//!
//! `struct`/`enum` become `Class`/`Enum`; `trait` becomes `Interface`;
//! `impl` is not itself a block — its methods attach as `Method` children
//! of the matching type block when one was seen earlier in the same file,
//! or fall back to a top-level `Function` named `Type::method` for impls
//! of external types (recorded as an open-question resolution in the
//! grounding ledger).

use std::collections::HashMap;

use tree_sitter::Node;

use crate::error::{ParseError, ParseResult};
use crate::model::block::{BlockKind, CodeBlock};
use crate::parsing::import::RawImport;
use crate::parsing::language::Language;
use crate::parsing::parser::{check_recursion_depth, BlockExtractor, ExtractionResult};
use crate::types::{BlockIdCounter, FileId, Range};

pub struct RustExtractor;

impl RustExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor for RustExtractor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extract(
        &self,
        source: &str,
        file_id: FileId,
        counter: &mut BlockIdCounter,
    ) -> ParseResult<ExtractionResult> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: "rust".to_string(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::SyntaxError {
                path: std::path::PathBuf::new(),
            })?;

        let mut blocks = Vec::new();
        let mut imports = Vec::new();
        let mut type_blocks: HashMap<String, crate::types::BlockId> = HashMap::new();

        walk_container(
            tree.root_node(),
            None,
            source,
            file_id,
            counter,
            &mut blocks,
            &mut type_blocks,
            &mut imports,
            0,
        )?;

        Ok(ExtractionResult { blocks, imports })
    }
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn node_range(node: Node) -> Range {
    let start = node.start_position();
    let end = node.end_position();
    Range::new(
        start.row as u32 + 1,
        start.column as u32,
        end.row as u32 + 1,
        end.column as u32,
    )
}

fn field_name_text(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
}

#[allow(clippy::too_many_arguments)]
fn walk_container(
    container: Node,
    parent_id: Option<crate::types::BlockId>,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    type_blocks: &mut HashMap<String, crate::types::BlockId>,
    imports: &mut Vec<RawImport>,
    depth: usize,
) -> ParseResult<()> {
    check_recursion_depth(depth, std::path::Path::new(""))?;

    let mut cursor = container.walk();
    for child in container.children(&mut cursor) {
        match child.kind() {
            "function_item" => {
                let range = node_range(child);
                let name =
                    field_name_text(child, source).unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Function,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
                if let Some(body) = child.child_by_field_name("body") {
                    walk_container(
                        body, Some(id), source, file_id, counter, blocks, type_blocks, imports,
                        depth + 1,
                    )?;
                }
            }
            "struct_item" | "enum_item" => {
                let range = node_range(child);
                let name =
                    field_name_text(child, source).unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                let kind = if child.kind() == "struct_item" {
                    BlockKind::Class
                } else {
                    BlockKind::Enum
                };
                type_blocks.insert(name.clone(), id);
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
            }
            "trait_item" => {
                let range = node_range(child);
                let name =
                    field_name_text(child, source).unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                type_blocks.insert(name.clone(), id);
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Interface,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
                if let Some(body) = child.child_by_field_name("body") {
                    walk_impl_like_body(body, Some(id), None, source, file_id, counter, blocks, depth + 1)?;
                }
            }
            "impl_item" => {
                let type_name = child
                    .child_by_field_name("type")
                    .map(|n| node_text(n, source).to_string());
                let target = type_name.as_ref().and_then(|n| type_blocks.get(n).copied());
                if let Some(body) = child.child_by_field_name("body") {
                    walk_impl_like_body(
                        body,
                        target,
                        type_name.as_deref(),
                        source,
                        file_id,
                        counter,
                        blocks,
                        depth + 1,
                    )?;
                }
            }
            "const_item" | "static_item" => {
                let range = node_range(child);
                let name =
                    field_name_text(child, source).unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Variable,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
            }
            "use_declaration" => {
                let range = node_range(child);
                let raw_text = node_text(child, source).to_string();
                let name = format!("use_{}", range.start_line);
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Import,
                    name,
                    content: raw_text.clone(),
                    range,
                });
                imports.push(parse_use_statement(&raw_text, range.start_line));
            }
            "mod_item" => {
                if let Some(body) = child.child_by_field_name("body") {
                    walk_container(
                        body, parent_id, source, file_id, counter, blocks, type_blocks, imports,
                        depth + 1,
                    )?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn walk_impl_like_body(
    body: Node,
    target: Option<crate::types::BlockId>,
    type_name: Option<&str>,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    depth: usize,
) -> ParseResult<()> {
    check_recursion_depth(depth, std::path::Path::new(""))?;
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if child.kind() != "function_item" {
            continue;
        }
        let range = node_range(child);
        let method_name =
            field_name_text(child, source).unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
        let name = match (target, type_name) {
            (None, Some(type_name)) => format!("{type_name}::{method_name}"),
            _ => method_name,
        };
        let id = counter.next_id();
        blocks.push(CodeBlock {
            id,
            file_id,
            parent_block_id: target,
            kind: BlockKind::Method,
            name,
            content: node_text(child, source).to_string(),
            range,
        });
        if let Some(fn_body) = child.child_by_field_name("body") {
            let mut dummy_imports = Vec::new();
            let mut dummy_types = HashMap::new();
            walk_container(
                fn_body,
                Some(id),
                source,
                file_id,
                counter,
                blocks,
                &mut dummy_types,
                &mut dummy_imports,
                depth + 1,
            )?;
        }
    }
    Ok(())
}

/// Lightweight textual parse of a `use` statement: works from the
/// statement text rather than a full AST walk of the path expression.
fn parse_use_statement(raw_text: &str, start_line: u32) -> RawImport {
    let body = raw_text
        .trim()
        .trim_start_matches("use ")
        .trim_end_matches(';')
        .trim();

    if let Some(brace_start) = body.find('{') {
        let prefix = body[..brace_start].trim_end_matches("::").trim().to_string();
        let inner = body[brace_start + 1..body.rfind('}').unwrap_or(body.len())].to_string();
        let symbols: Vec<String> = inner
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.split(" as ").last().unwrap_or(s).trim().to_string())
            .collect();
        return RawImport {
            module_text: prefix,
            symbols,
            side_effect_only: false,
            raw_text: raw_text.to_string(),
            start_line,
        };
    }

    if let Some(stripped) = body.strip_suffix("::*") {
        return RawImport {
            module_text: stripped.to_string(),
            symbols: vec!["*".to_string()],
            side_effect_only: false,
            raw_text: raw_text.to_string(),
            start_line,
        };
    }

    let (path, bound_name) = match body.split_once(" as ") {
        Some((path, alias)) => (path.trim().to_string(), alias.trim().to_string()),
        None => {
            let last = body.rsplit("::").next().unwrap_or(body).to_string();
            (body.to_string(), last)
        }
    };

    RawImport {
        module_text: path,
        symbols: vec![bound_name],
        side_effect_only: false,
        raw_text: raw_text.to_string(),
        start_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> ExtractionResult {
        let extractor = RustExtractor::new();
        let file_id = FileId::new(1).unwrap();
        let mut counter = BlockIdCounter::new(file_id);
        extractor.extract(source, file_id, &mut counter).unwrap()
    }

    #[test]
    fn extracts_top_level_function() {
        let result = extract("fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n");
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].kind, BlockKind::Function);
        assert_eq!(result.blocks[0].name, "add");
    }

    #[test]
    fn impl_methods_attach_to_their_struct() {
        let source = "struct Counter { value: i32 }\n\nimpl Counter {\n    fn increment(&mut self) {\n        self.value += 1;\n    }\n}\n";
        let result = extract(source);
        let struct_block = result.blocks.iter().find(|b| b.kind == BlockKind::Class).unwrap();
        let method_block = result.blocks.iter().find(|b| b.kind == BlockKind::Method).unwrap();
        assert_eq!(method_block.name, "increment");
        assert_eq!(method_block.parent_block_id, Some(struct_block.id));
    }

    #[test]
    fn use_declaration_becomes_import_block_with_parsed_symbols() {
        let result = extract("use std::collections::{HashMap, HashSet};\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module_text, "std::collections");
        assert_eq!(result.imports[0].symbols, vec!["HashMap", "HashSet"]);
    }
}
