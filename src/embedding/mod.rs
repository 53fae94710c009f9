//! C6: turns file and block content into vectors, chunked and pooled the
//! same way regardless of source language.

pub mod chunk;
pub mod model;
pub mod pipeline;

pub use chunk::{chunk_content, owner_header, Chunk};
pub use model::{missing_model_file, model_dir_is_complete, EmbeddingModel};
pub use pipeline::EmbeddingPipeline;
