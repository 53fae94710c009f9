//! C5 Relationship Resolver and the C9 orchestrator that drives the rest of
//! the pipeline (C1 scan, C2-C4 parse/extract/hoist, C6-C8 embed/persist)
//! end to end.

pub mod import;
pub mod incremental;
pub mod resolver;

pub use import::import_file;
pub use incremental::{Orchestrator, RunReport};
pub use resolver::{resolve_import, ResolvedImport};
