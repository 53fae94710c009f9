//! Dispatches a `Language` to its `BlockExtractor`, a closed-enum match
//! the re-architecture notes require instead of a string-keyed registry.

use std::sync::Arc;

use crate::parsing::language::Language;
use crate::parsing::parser::BlockExtractor;
use crate::parsing::{python, rust, typescript};

#[derive(Default)]
pub struct ParserFactory;

impl ParserFactory {
    pub fn new() -> Self {
        Self
    }

    /// Each call returns a fresh extractor instance; extractors are
    /// stateless and cheap, so no caching is needed beyond what the caller
    /// chooses to do (e.g. building one per worker thread).
    pub fn create_extractor(&self, language: Language) -> Arc<dyn BlockExtractor> {
        match language {
            Language::Rust => Arc::new(rust::RustExtractor::new()),
            Language::Python => Arc::new(python::PythonExtractor::new()),
            Language::JavaScript => Arc::new(typescript::JavaScriptExtractor::new()),
            Language::TypeScript => Arc::new(typescript::TypeScriptExtractor::new()),
        }
    }
}
