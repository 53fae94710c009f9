//! A code intelligence index: scans a repository, extracts a block-level
//! AST summary per file, resolves its import graph, embeds files and
//! blocks for semantic search, and exposes a fixed, paginated query surface
//! over the result.

pub mod config;
pub mod embedding;
pub mod error;
pub mod indexing;
pub mod logging;
pub mod model;
pub mod parsing;
pub mod query;
pub mod scanning;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use error::{IndexError, IndexResult};
pub use indexing::{Orchestrator, RunReport};
pub use storage::{GraphStore, VectorStore};
pub use types::{BlockId, FileId, ProjectId};
