//! JavaScript/TypeScript block extractor — the statically-typed
//! curly-brace extractor archetype (TypeScript adds `interface`/`enum`/
//! `type` alias declarations as first-class blocks; both languages share
//! everything else). One shared AST walk, two thin wrapper types
//! selecting the tree-sitter grammar, since the node-kind differences
//! are additive (TS-only kinds simply never appear in a JavaScript AST).

use tree_sitter::{Language as TsLanguage, Node};

use crate::error::{ParseError, ParseResult};
use crate::model::block::{BlockKind, CodeBlock};
use crate::parsing::import::RawImport;
use crate::parsing::language::Language;
use crate::parsing::parser::{check_recursion_depth, BlockExtractor, ExtractionResult};
use crate::types::{BlockId, BlockIdCounter, FileId, Range};

pub struct JavaScriptExtractor;

impl JavaScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JavaScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(
        &self,
        source: &str,
        file_id: FileId,
        counter: &mut BlockIdCounter,
    ) -> ParseResult<ExtractionResult> {
        extract_curly_brace(source, file_id, counter, "javascript", tree_sitter_javascript::LANGUAGE.into())
    }
}

pub struct TypeScriptExtractor;

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockExtractor for TypeScriptExtractor {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract(
        &self,
        source: &str,
        file_id: FileId,
        counter: &mut BlockIdCounter,
    ) -> ParseResult<ExtractionResult> {
        extract_curly_brace(
            source,
            file_id,
            counter,
            "typescript",
            tree_sitter_typescript::LANGUAGE_TSX.into(),
        )
    }
}

fn extract_curly_brace(
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    language_name: &str,
    ts_language: TsLanguage,
) -> ParseResult<ExtractionResult> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&ts_language)
        .map_err(|e| ParseError::ParserInit {
            language: language_name.to_string(),
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

fn is_function_value(kind: &str) -> bool {
    matches!(kind, "arrow_function" | "function_expression" | "function")
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
    for child in container.children(&mut cursor) {
        if child.kind() == "export_statement" {
            if let Some(declaration) = child.child_by_field_name("declaration") {
                handle_declaration(
                    declaration, child, parent_id, emit_variables, source, file_id, counter,
                    blocks, imports, depth,
                )?;
            } else {
                push_export_block(child, parent_id, source, file_id, counter, blocks, imports);
            }
            continue;
        }

        handle_declaration(
            child, child, parent_id, emit_variables, source, file_id, counter, blocks, imports,
            depth,
        )?;
    }
    Ok(())
}

/// `declaration` is the statement actually declaring something
/// (`function_declaration`, `lexical_declaration`, ...); `outer` is the
/// node whose text/range should be stored (equal to `declaration` unless
/// wrapped in `export ...`).
#[allow(clippy::too_many_arguments)]
fn handle_declaration(
    declaration: Node,
    outer: Node,
    parent_id: Option<BlockId>,
    emit_variables: bool,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    imports: &mut Vec<RawImport>,
    depth: usize,
) -> ParseResult<()> {
    match declaration.kind() {
        "function_declaration" => {
            let range = node_range(outer);
            let name = field_name_text(declaration, source)
                .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Function,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
            if let Some(body) = declaration.child_by_field_name("body") {
                walk_scope(body, Some(id), false, source, file_id, counter, blocks, imports, depth + 1)?;
            }
        }
        "class_declaration" => {
            let range = node_range(outer);
            let name = field_name_text(declaration, source)
                .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Class,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
            if let Some(body) = declaration.child_by_field_name("body") {
                walk_class_body(body, id, source, file_id, counter, blocks, imports, depth + 1)?;
            }
        }
        "interface_declaration" => {
            let range = node_range(outer);
            let name = field_name_text(declaration, source)
                .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Interface,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
        }
        "enum_declaration" => {
            let range = node_range(outer);
            let name = field_name_text(declaration, source)
                .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Enum,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
        }
        "type_alias_declaration" => {
            let range = node_range(outer);
            let name = field_name_text(declaration, source)
                .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Type,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
        }
        "import_statement" => {
            let range = node_range(outer);
            let raw_text = node_text(outer, source).to_string();
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
        "lexical_declaration" | "variable_declaration" => {
            handle_lexical_declaration(
                declaration, outer, parent_id, emit_variables, source, file_id, counter, blocks,
                imports, depth,
            )?;
        }
        _ => {}
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_lexical_declaration(
    declaration: Node,
    outer: Node,
    parent_id: Option<BlockId>,
    emit_variables: bool,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    imports: &mut Vec<RawImport>,
    depth: usize,
) -> ParseResult<()> {
    let Some(declarator) = declaration.named_child(0) else {
        return Ok(());
    };
    let Some(name_node) = declarator.child_by_field_name("name") else {
        return Ok(());
    };
    let name = node_text(name_node, source).to_string();
    let range = node_range(outer);

    if let Some(value) = declarator.child_by_field_name("value") {
        if is_function_value(value.kind()) {
            let id = counter.next_id();
            blocks.push(CodeBlock {
                id,
                file_id,
                parent_block_id: parent_id,
                kind: BlockKind::Function,
                name,
                content: node_text(outer, source).to_string(),
                range,
            });
            if let Some(body) = value.child_by_field_name("body") {
                if body.kind() == "statement_block" {
                    walk_scope(body, Some(id), false, source, file_id, counter, blocks, imports, depth + 1)?;
                }
            }
            return Ok(());
        }
    }

    if emit_variables {
        let id = counter.next_id();
        blocks.push(CodeBlock {
            id,
            file_id,
            parent_block_id: parent_id,
            kind: BlockKind::Variable,
            name,
            content: node_text(outer, source).to_string(),
            range,
        });
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
    for child in body.children(&mut cursor) {
        match child.kind() {
            "method_definition" => {
                let range = node_range(child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: Some(class_id),
                    kind: BlockKind::Method,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
                if let Some(fn_body) = child.child_by_field_name("body") {
                    walk_scope(
                        fn_body, Some(id), false, source, file_id, counter, blocks, imports,
                        depth + 1,
                    )?;
                }
            }
            "public_field_definition" | "field_definition" => {
                let range = node_range(child);
                let name = field_name_text(child, source)
                    .or_else(|| child.child_by_field_name("property").map(|n| node_text(n, source).to_string()))
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: Some(class_id),
                    kind: BlockKind::Variable,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
            }
            "class_declaration" => {
                let range = node_range(child);
                let name = field_name_text(child, source)
                    .unwrap_or_else(|| CodeBlock::synthesize_name(range.start_line));
                let id = counter.next_id();
                blocks.push(CodeBlock {
                    id,
                    file_id,
                    parent_block_id: Some(class_id),
                    kind: BlockKind::Class,
                    name,
                    content: node_text(child, source).to_string(),
                    range,
                });
                if let Some(nested_body) = child.child_by_field_name("body") {
                    walk_class_body(nested_body, id, source, file_id, counter, blocks, imports, depth + 1)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn push_export_block(
    node: Node,
    parent_id: Option<BlockId>,
    source: &str,
    file_id: FileId,
    counter: &mut BlockIdCounter,
    blocks: &mut Vec<CodeBlock>,
    imports: &mut Vec<RawImport>,
) {
    let range = node_range(node);
    let raw_text = node_text(node, source).to_string();
    let name = if raw_text.contains("default") {
        "default".to_string()
    } else {
        format!("export_{}", range.start_line)
    };
    let id = counter.next_id();
    blocks.push(CodeBlock {
        id,
        file_id,
        parent_block_id: parent_id,
        kind: BlockKind::Export,
        name,
        content: raw_text.clone(),
        range,
    });
    if let Some(import) = parse_reexport_statement(&raw_text, range.start_line) {
        imports.push(import);
    }
}

/// `import ... from '...'` textual parse, grounded in the same
/// lightweight-path-text approach as the Rust/Python extractors.
fn parse_import_statement(raw_text: &str, start_line: u32) -> RawImport {
    let module_text = extract_quoted_path(raw_text).unwrap_or_default();
    let side_effect_only = !raw_text.contains(" from ") || !raw_text.contains("import ");

    let symbols = if let Some(brace_start) = raw_text.find('{') {
        let brace_end = raw_text.find('}').unwrap_or(raw_text.len());
        raw_text[brace_start + 1..brace_end]
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.split(" as ").last().unwrap_or(s).trim().to_string())
            .collect()
    } else if let Some(default_name) = raw_text
        .trim_start_matches("import ")
        .split(|c| c == ',' || c == ' ')
        .next()
        .filter(|s| !s.is_empty() && *s != "*")
    {
        vec![default_name.to_string()]
    } else {
        Vec::new()
    };

    RawImport {
        module_text,
        symbols,
        side_effect_only,
        raw_text: raw_text.to_string(),
        start_line,
    }
}

fn parse_reexport_statement(raw_text: &str, start_line: u32) -> Option<RawImport> {
    if !raw_text.contains(" from ") {
        return None;
    }
    let module_text = extract_quoted_path(raw_text)?;
    let symbols = if let Some(brace_start) = raw_text.find('{') {
        let brace_end = raw_text.find('}').unwrap_or(raw_text.len());
        raw_text[brace_start + 1..brace_end]
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    } else {
        vec!["*".to_string()]
    };
    Some(RawImport {
        module_text,
        symbols,
        side_effect_only: false,
        raw_text: raw_text.to_string(),
        start_line,
    })
}

fn extract_quoted_path(text: &str) -> Option<String> {
    for quote in ['\'', '"', '`'] {
        if let Some(start) = text.find(quote) {
            if let Some(end_offset) = text[start + 1..].find(quote) {
                return Some(text[start + 1..start + 1 + end_offset].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_ts(source: &str) -> ExtractionResult {
        let extractor = TypeScriptExtractor::new();
        let file_id = FileId::new(1).unwrap();
        let mut counter = BlockIdCounter::new(file_id);
        extractor.extract(source, file_id, &mut counter).unwrap()
    }

    #[test]
    fn extracts_interface_and_enum_as_first_class_blocks() {
        let source = "interface Point {\n    x: number;\n    y: number;\n}\n\nenum Color {\n    Red,\n    Green,\n}\n";
        let result = extract_ts(source);
        assert!(result.blocks.iter().any(|b| b.kind == BlockKind::Interface && b.name == "Point"));
        assert!(result.blocks.iter().any(|b| b.kind == BlockKind::Enum && b.name == "Color"));
    }

    #[test]
    fn type_alias_becomes_a_type_block() {
        let source = "type Point = {\n    x: number;\n    y: number;\n};\n";
        let result = extract_ts(source);
        assert!(result.blocks.iter().any(|b| b.kind == BlockKind::Type && b.name == "Point"));
    }

    #[test]
    fn const_arrow_function_becomes_named_function_block() {
        let source = "const add = (a: number, b: number) => {\n    return a + b;\n};\n";
        let result = extract_ts(source);
        let function = result.blocks.iter().find(|b| b.kind == BlockKind::Function).unwrap();
        assert_eq!(function.name, "add");
    }

    #[test]
    fn class_fields_become_variable_children() {
        let source = "class Widget {\n    count: number = 0;\n\n    increment() {\n        this.count += 1;\n    }\n}\n";
        let result = extract_ts(source);
        let class_block = result.blocks.iter().find(|b| b.kind == BlockKind::Class).unwrap();
        let field = result
            .blocks
            .iter()
            .find(|b| b.kind == BlockKind::Variable && b.parent_block_id == Some(class_block.id))
            .unwrap();
        assert_eq!(field.name, "count");
    }

    #[test]
    fn import_statement_extracts_named_symbols_and_path() {
        let result = extract_ts("import { foo, bar } from './util';\n");
        assert_eq!(result.imports.len(), 1);
        assert_eq!(result.imports[0].module_text, "./util");
        assert_eq!(result.imports[0].symbols, vec!["foo", "bar"]);
    }
}
