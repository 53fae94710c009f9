//! AST parsing and block extraction: the closed `Language` enum, the
//! `BlockExtractor` trait and its three concrete implementations, the
//! nested-function hoister, and the import representation the
//! relationship resolver consumes.

pub mod factory;
pub mod hoist;
pub mod import;
pub mod language;
pub mod parser;
pub mod python;
pub mod rust;
pub mod typescript;

pub use factory::ParserFactory;
pub use hoist::hoist_blocks;
pub use import::RawImport;
pub use language::Language;
pub use parser::{BlockExtractor, ExtractionResult};
