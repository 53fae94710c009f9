//! Batched-per-owner embedding with per-chunk fallback, grounded in the
//! pipeline-stage shape of `indexing/pipeline/stages/embed.rs`: one unit
//! of work (here, one owner key) in, embeddings persisted out, failures
//! degraded rather than propagated.

use crate::embedding::chunk::chunk_content;
use crate::embedding::model::EmbeddingModel;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::storage::vector::{EmbeddingRow, VectorStore};

pub struct EmbeddingPipeline<'a> {
    model: EmbeddingModel,
    vector_store: &'a VectorStore,
    chunk_lines: u32,
}

impl<'a> EmbeddingPipeline<'a> {
    pub fn new(model: EmbeddingModel, vector_store: &'a VectorStore, chunk_lines: u32) -> Self {
        Self {
            model,
            vector_store,
            chunk_lines,
        }
    }

    /// Chunks `content`, embeds every chunk, and replaces `owner_key`'s
    /// rows in the vector store within the store's own single transaction
    /// per `VectorStore::insert_batch`'s contract.
    pub fn embed_owner(
        &mut self,
        owner_key: &str,
        project_id: i64,
        content: &str,
        header: Option<&str>,
    ) -> EmbeddingResult<usize> {
        let chunks = chunk_content(content, self.chunk_lines, header);
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text_for_embedding.clone()).collect();
        let vectors = self.embed_with_fallback(&texts);

        let rows: Vec<EmbeddingRow> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| EmbeddingRow {
                owner_key: owner_key.to_string(),
                project_id,
                chunk_index: chunk.index,
                chunk_start_line: chunk.start_line,
                chunk_end_line: chunk.end_line,
                vector,
            })
            .collect();
        let count = rows.len();

        self.vector_store
            .delete_by_owner(owner_key)
            .map_err(|e| EmbeddingError::InferenceFailed {
                batch_size: count,
                reason: e.to_string(),
            })?;
        self.vector_store
            .insert_batch(&rows)
            .map_err(|e| EmbeddingError::InferenceFailed {
                batch_size: count,
                reason: e.to_string(),
            })?;

        Ok(count)
    }

    /// A batch failure retries per-chunk; a per-chunk failure produces a
    /// zero vector and a warning rather than aborting the owner's ingest
    /// (embedding failures never drop the file).
    fn embed_with_fallback(&mut self, texts: &[String]) -> Vec<Vec<f32>> {
        match self.model.embed_batch(texts) {
            Ok(vectors) => vectors,
            Err(e) => {
                tracing::warn!(error = %e, batch_size = texts.len(), "batch embedding failed, retrying per-chunk");
                texts
                    .iter()
                    .map(|text| match self.model.embed_batch(std::slice::from_ref(text)) {
                        Ok(mut vectors) => vectors.pop().unwrap_or_else(|| vec![0.0; self.model.dimension()]),
                        Err(e) => {
                            tracing::warn!(error = %e, "embedding failed for chunk, storing zero vector");
                            vec![0.0; self.model.dimension()]
                        }
                    })
                    .collect()
            }
        }
    }
}
