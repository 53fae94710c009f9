//! Vector store (C8): a `sqlite-vec` `vec0` virtual table for brute-force
//! KNN search over chunk embeddings.
//!
//! Grounded directly in `original_source/src/embeddings/vector_store.py`'s
//! `_setup_vector_tables` for the column list, and in the pack's
//! `sqlite_vec.rs` retrieval stores for the `rusqlite::ffi::sqlite3_auto_extension`
//! registration pattern and `MATCH`-based KNN query shape.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use zerocopy::IntoBytes;

use crate::error::{StorageError, StorageResult};

pub struct EmbeddingRow {
    pub owner_key: String,
    pub project_id: i64,
    pub chunk_index: u32,
    pub chunk_start_line: u32,
    pub chunk_end_line: u32,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub owner_key: String,
    pub chunk_index: u32,
    pub chunk_start_line: u32,
    pub chunk_end_line: u32,
    pub similarity: f32,
}

pub struct VectorStore {
    conn: Mutex<Connection>,
    path: PathBuf,
    dimension: usize,
}

impl VectorStore {
    pub fn open(path: &Path, dimension: usize) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::IntegrityViolation {
                reason: format!("failed to create vector store directory: {e}"),
            })?;
        }

        // SAFETY: `sqlite3_vec_init` is the extension entry point documented
        // by the sqlite-vec crate; `sqlite3_auto_extension` requires the
        // transmute to its `unsafe extern "C" fn()` FFI signature.
        unsafe {
            rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
                sqlite_vec::sqlite3_vec_init as *const (),
            )));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;",
        )?;

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS chunk_owners (
                rowid INTEGER PRIMARY KEY,
                owner_key TEXT NOT NULL,
                project_id INTEGER NOT NULL,
                chunk_index INTEGER NOT NULL,
                chunk_start_line INTEGER NOT NULL,
                chunk_end_line INTEGER NOT NULL,
                UNIQUE(owner_key, chunk_index)
            );
            CREATE INDEX IF NOT EXISTS idx_chunk_owners_key ON chunk_owners(owner_key);
            CREATE INDEX IF NOT EXISTS idx_chunk_owners_project ON chunk_owners(project_id);

            CREATE VIRTUAL TABLE IF NOT EXISTS chunk_vectors USING vec0(
                node_id TEXT PRIMARY KEY,
                embedding float[{dimension}]
            );"
        ))?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
            dimension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Single transaction per call.
    pub fn insert_batch(&self, rows: &[EmbeddingRow]) -> StorageResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for row in rows {
            if row.vector.len() != self.dimension {
                return Err(StorageError::IntegrityViolation {
                    reason: format!(
                        "embedding for '{}' chunk {} has {} dims, expected {}",
                        row.owner_key,
                        row.chunk_index,
                        row.vector.len(),
                        self.dimension
                    ),
                });
            }
            let node_id = format!("{}#{}", row.owner_key, row.chunk_index);
            tx.execute(
                "INSERT INTO chunk_owners (owner_key, project_id, chunk_index, chunk_start_line, chunk_end_line)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(owner_key, chunk_index) DO UPDATE SET
                    chunk_start_line = excluded.chunk_start_line,
                    chunk_end_line = excluded.chunk_end_line",
                params![
                    row.owner_key,
                    row.project_id,
                    row.chunk_index,
                    row.chunk_start_line,
                    row.chunk_end_line
                ],
            )?;
            tx.execute(
                "INSERT OR REPLACE INTO chunk_vectors (node_id, embedding) VALUES (?1, ?2)",
                params![node_id, row.vector.as_bytes()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// `similarity = 1 / (1 + distance)`; results below `threshold` are
    /// dropped; ordering is by distance ascending (similarity descending).
    pub fn search(&self, query: &[f32], limit: usize, threshold: f32) -> StorageResult<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(StorageError::IntegrityViolation {
                reason: format!("query vector has {} dims, expected {}", query.len(), self.dimension),
            });
        }
        let conn = self.conn.lock();

        let has_vectors: bool =
            conn.query_row("SELECT EXISTS(SELECT 1 FROM chunk_vectors LIMIT 1)", [], |r| r.get(0))?;
        if !has_vectors {
            return Ok(Vec::new());
        }

        let mut stmt = conn.prepare(
            "SELECT v.node_id, v.distance, o.owner_key, o.chunk_index, o.chunk_start_line, o.chunk_end_line
             FROM chunk_vectors v
             JOIN chunk_owners o ON o.owner_key || '#' || o.chunk_index = v.node_id
             WHERE v.embedding MATCH ?1 AND k = ?2
             ORDER BY v.distance ASC",
        )?;
        let rows = stmt.query_map(params![query.as_bytes(), limit as i64], |row| {
            let distance: f64 = row.get(1)?;
            Ok((
                distance,
                SearchHit {
                    owner_key: row.get(2)?,
                    chunk_index: row.get(3)?,
                    chunk_start_line: row.get(4)?,
                    chunk_end_line: row.get(5)?,
                    similarity: 0.0,
                },
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (distance, mut hit) = row?;
            let similarity = (1.0 / (1.0 + distance)) as f32;
            if similarity < threshold {
                continue;
            }
            hit.similarity = similarity;
            hits.push(hit);
        }
        Ok(hits)
    }

    pub fn delete_by_owner(&self, owner_key: &str) -> StorageResult<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT chunk_index FROM chunk_owners WHERE owner_key = ?1")?;
        let node_ids: Vec<String> = stmt
            .query_map(params![owner_key], |row| {
                let chunk_index: u32 = row.get(0)?;
                Ok(format!("{owner_key}#{chunk_index}"))
            })?
            .collect::<Result<_, _>>()?;
        drop(stmt);

        for node_id in node_ids {
            conn.execute("DELETE FROM chunk_vectors WHERE node_id = ?1", params![node_id])?;
        }
        conn.execute("DELETE FROM chunk_owners WHERE owner_key = ?1", params![owner_key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dimension: usize) -> (TempDir, VectorStore) {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(&dir.path().join("vectors.db"), dimension).unwrap();
        (dir, store)
    }

    #[test]
    fn insert_batch_rejects_wrong_dimension() {
        let (_dir, store) = store(4);
        let rows = vec![EmbeddingRow {
            owner_key: "file_1".to_string(),
            project_id: 1,
            chunk_index: 0,
            chunk_start_line: 1,
            chunk_end_line: 20,
            vector: vec![0.1, 0.2, 0.3],
        }];
        assert!(store.insert_batch(&rows).is_err());
    }

    #[test]
    fn search_on_empty_store_returns_no_hits() {
        let (_dir, store) = store(4);
        let hits = store.search(&[0.1, 0.2, 0.3, 0.4], 5, 0.0).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn insert_then_search_finds_the_nearest_chunk() {
        let (_dir, store) = store(4);
        let rows = vec![
            EmbeddingRow {
                owner_key: "block_1".to_string(),
                project_id: 1,
                chunk_index: 0,
                chunk_start_line: 1,
                chunk_end_line: 20,
                vector: vec![1.0, 0.0, 0.0, 0.0],
            },
            EmbeddingRow {
                owner_key: "block_2".to_string(),
                project_id: 1,
                chunk_index: 0,
                chunk_start_line: 1,
                chunk_end_line: 20,
                vector: vec![0.0, 1.0, 0.0, 0.0],
            },
        ];
        store.insert_batch(&rows).unwrap();
        let hits = store.search(&[1.0, 0.0, 0.0, 0.0], 1, 0.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].owner_key, "block_1");
    }

    #[test]
    fn delete_by_owner_removes_its_vectors() {
        let (_dir, store) = store(4);
        store
            .insert_batch(&[EmbeddingRow {
                owner_key: "block_1".to_string(),
                project_id: 1,
                chunk_index: 0,
                chunk_start_line: 1,
                chunk_end_line: 20,
                vector: vec![1.0, 0.0, 0.0, 0.0],
            }])
            .unwrap();
        store.delete_by_owner("block_1").unwrap();
        let hits = store.search(&[1.0, 0.0, 0.0, 0.0], 5, 0.0).unwrap();
        assert!(hits.is_empty());
    }
}
