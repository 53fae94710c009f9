//! The extractor-facing import representation, before resolution.
//!
//! An extractor emits one `RawImport` per syntactic import statement; the
//! relationship resolver (`indexing::resolver`) turns these into resolved
//! `Relationship` rows once the project's file set is known.

#[derive(Debug, Clone, PartialEq)]
pub struct RawImport {
    /// The literal module/path text as written (`"./b"`, `"std::io"`, `.b`).
    pub module_text: String,
    /// Named symbols pulled in (`from .b import f, g` -> `["f", "g"]`).
    /// Empty for a bare `import foo` / `use foo;` with no explicit symbol list.
    pub symbols: Vec<String>,
    /// `import "./module"` / `use foo;` with no bound name — the import
    /// exists purely for its side effects.
    pub side_effect_only: bool,
    /// Whole statement text, used for dedup and the stored metadata.
    pub raw_text: String,
    pub start_line: u32,
}
