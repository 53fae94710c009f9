//! Python block extractor — the dynamically-typed scripting archetype of
//! Class-body assignments become `variable` children, but
//! assignments local to a method or function body are not extracted as
//! blocks at all (S1 seed scenario).

use tree_sitter::Node;

use crate::error::{ParseError, ParseResult};
use crate::model::block::{BlockKind, CodeBlock};
use crate::parsing::import::RawImport;
use crate::parsing::language::Language;
use crate::parsing::parser::{check_recursion_depth, BlockExtractor, ExtractionResult};
use crate::types::{BlockId, BlockIdCounter, FileId, Range};

pub struct PythonExtractor;

impl PythonExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(
        &self,
        source: &str,
        file_id: FileId,
        counter: &mut BlockIdCounter,
    ) -> ParseResult<ExtractionResult> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: "python".to_string(),
                reason: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::SyntaxError {
                path: std::path::PathBuf::new(),
            })?;

        let mut blocks = Vec::new();
        let mut imports = Vec::new();

        walk_scope(
            tree.root_node(),
            None,
            true,
            source,
            file_id,
            counter,
            &mut blocks,
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

fn unwrap_decorated(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn field_name_text(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
}

/// Extracts an assignment's left-hand identifier from an
/// `expression_statement` wrapping an `assignment`. Returns `None` for
/// anything other than a plain `name = value` (tuple unpacking, attribute
/// targets, augmented assignment are left unextracted).
fn assignment_name<'a>(stmt: Node, source: &'a str) -> Option<(&'a str, Node<'a>)> {
    let assignment = stmt.child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    Some((node_text(left, source), assignment))
}

#[allow(clippy::too_many_arguments)]
fn walk_scope(
    container: Node,
    parent_id: Option<BlockId>,
    emit_variables: bool,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    imports: &mut Vec<RawImport>,
    depth: usize,
) -> ParseResult<()> {
    check_recursion_depth(depth, std::path::Path::new(""))?;

    let mut cursor = container.walk();
    for raw_child in container.children(&mut cursor) {
        let child = unwrap_decorated(raw_child);
        match child.kind() {
            "function_definition" => {
                let range = node_range(raw_child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Function,
                    name,
                    content: node_text(raw_child, source).to_string(),
                    range,
                });
                if let Some(body) = child.child_by_field_name("body") {
                    walk_scope(
                        body, Some(id), false, source, file_id, counter, blocks, imports,
                        depth + 1,
                    )?;
                }
            }
            "class_definition" => {
                let range = node_range(raw_child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: parent_id,
                    kind: BlockKind::Class,
                    name,
                    content: node_text(raw_child, source).to_string(),
                    range,
                });
                if let Some(body) = child.child_by_field_name("body") {
                    walk_class_body(body, id, source, file_id, counter, blocks, imports, depth + 1)?;
                }
            }
            "import_statement" | "import_from_statement" => {
                let range = node_range(child);
                let raw_text = node_text(child, source).to_string();
                let name = format!("import_{}", range.start_line);
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
                imports.push(parse_import_statement(&raw_text, range.start_line));
            }
            "expression_statement" if emit_variables => {
                if let Some((var_name, _)) = assignment_name(child, source) {
                    let range = node_range(child);
                    let id = counter.next_id();
                    blocks.push(CodeBlock {
                        id,
                        file_id,
                        parent_block_id: parent_id,
                        kind: BlockKind::Variable,
                        name: var_name.to_string(),
                        content: node_text(child, source).to_string(),
                        range,
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn walk_class_body(
    body: Node,
    class_id: BlockId,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    imports: &mut Vec<RawImport>,
    depth: usize,
) -> ParseResult<()> {
    check_recursion_depth(depth, std::path::Path::new(""))?;

    let mut cursor = body.walk();
    for raw_child in body.children(&mut cursor) {
        let child = unwrap_decorated(raw_child);
        match child.kind() {
            "function_definition" => {
                let range = node_range(raw_child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: Some(class_id),
                    kind: BlockKind::Method,
                    name,
                    content: node_text(raw_child, source).to_string(),
                    range,
                });
                if let Some(fn_body) = child.child_by_field_name("body") {
                    walk_scope(
                        fn_body, Some(id), false, source, file_id, counter, blocks, imports,
                        depth + 1,
                    )?;
                }
            }
            "class_definition" => {
                let range = node_range(raw_child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: Some(class_id),
                    kind: BlockKind::Class,
                    name,
                    content: node_text(raw_child, source).to_string(),
                    range,
                });
                walk_class_body(child, id, source, file_id, counter, blocks, imports, depth + 1)?;
            }
            "expression_statement" => {
                if let Some((var_name, _)) = assignment_name(child, source) {
                    let range = node_range(child);
                    let id = counter.next_id();
                    blocks.push(CodeBlock {
                        id,
                        file_id,
                        parent_block_id: Some(class_id),
                        kind: BlockKind::Variable,
                        name: var_name.to_string(),
                        content: node_text(child, source).to_string(),
                        range,
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Textual parse of `import x` / `from .b import f, g as h` / `from x import *`.
fn parse_import_statement(raw_text: &str, start_line: u32) -> RawImport {
    let trimmed = raw_text.trim();

    if let Some(rest) = trimmed.strip_prefix("from ") {
        let (module_part, symbols_part) = rest.split_once(" import ").unwrap_or((rest, ""));
        let symbols_part = symbols_part.trim();
        if symbols_part == "*" {
            return RawImport {
                module_text: module_part.trim().to_string(),
                symbols: vec!["*".to_string()],
                side_effect_only: false,
                raw_text: raw_text.to_string(),
                start_line,
            };
        }
        let symbols: Vec<String> = symbols_part
            .trim_matches(|c| c == '(' || c == ')')
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.split(" as ").last().unwrap_or(s).trim().to_string())
            .collect();
        return RawImport {
            module_text: module_part.trim().to_string(),
            symbols,
            side_effect_only: false,
            raw_text: raw_text.to_string(),
            start_line,
        };
    }

    let rest = trimmed.trim_start_matches("import ");
    let first = rest.split(',').next().unwrap_or(rest).trim();
    let (module_text, bound_name) = match first.split_once(" as ") {
        Some((path, alias)) => (path.trim().to_string(), alias.trim().to_string()),
        None => (first.to_string(), first.to_string()),
    };

    RawImport {
        module_text,
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
        let extractor = PythonExtractor::new();
        let file_id = FileId::new(1).unwrap();
        let mut counter = BlockIdCounter::new(file_id);
        extractor.extract(source, file_id, &mut counter).unwrap()
    }

    #[test]
    fn s1_single_class_with_variable_and_method() {
        let source = "class C:\n    X = 1\n    def f(self):\n        return self.X\n";
        let result = extract(source);

        let class_block = result.blocks.iter().find(|b| b.kind == BlockKind::Class).unwrap();
        assert_eq!(class_block.name, "C");

        let children: Vec<_> = result
            .blocks
            .iter()
            .filter(|b| b.parent_block_id == Some(class_block.id))
            .collect();
        assert_eq!(children.len(), 2);

        let variable = children.iter().find(|b| b.kind == BlockKind::Variable).unwrap();
        assert_eq!(variable.name, "X");
        assert_eq!(variable.range.start_line, 2);
        assert_eq!(variable.range.end_line, 2);

        let method = children.iter().find(|b| b.kind == BlockKind::Method).unwrap();
        assert_eq!(method.name, "f");
        assert_eq!(method.range.start_line, 3);
        assert_eq!(method.range.end_line, 4);

        assert!(result.imports.is_empty());
        assert!(result.blocks.iter().all(|b| b.kind != BlockKind::Import));
    }

    #[test]
    fn method_local_assignment_is_not_extracted() {
        let source = "class C:\n    def f(self):\n        local = 1\n        return local\n";
        let result = extract(source);
        assert!(result.blocks.iter().all(|b| b.kind != BlockKind::Variable));
    }

    #[test]
    fn s4_relative_from_import_parses_module_and_symbol() {
        let result = extract("from .b import f\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module_text, ".b");
        assert_eq!(result.imports[0].symbols, vec!["f"]);
    }
}
