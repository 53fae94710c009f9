//! Domain entities stored by the relational store and exchanged at the
//! crate's external boundaries (JSON file-ingest, query results).

pub mod block;
pub mod exchange;
pub mod file;
pub mod project;
pub mod relationship;

pub use block::{BlockKind, CodeBlock};
pub use file::FileRecord;
pub use project::Project;
pub use relationship::{ImportMetadata, RelationKind, Relationship, TieBreak};
