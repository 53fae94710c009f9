//! Relational store (C7): projects, files, code blocks, and relationships.
//!
//! Grounded in `other_examples`' `n01e0-dimpact` `cache.rs` (WAL pragmas,
//! `CREATE TABLE IF NOT EXISTS`, `ON DELETE CASCADE`, per-file transaction)
//! with one writer connection guarded by a mutex. Not a singleton: callers
//! construct a `GraphStore` and pass `&GraphStore` into the indexer and
//! query layer.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{StorageError, StorageResult};
use crate::model::block::{BlockKind, CodeBlock};
use crate::model::file::FileRecord;
use crate::model::project::Project;
use crate::model::relationship::{ImportMetadata, RelationKind, Relationship, TieBreak};
use crate::parsing::language::Language;
use crate::types::{BlockId, FileId, ProjectId, Range};

const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    path TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    file_path TEXT NOT NULL,
    language TEXT,
    content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    UNIQUE(project_id, file_path)
);
CREATE INDEX IF NOT EXISTS idx_files_project ON files(project_id);

CREATE TABLE IF NOT EXISTS code_blocks (
    id INTEGER PRIMARY KEY,
    file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    parent_block_id INTEGER,
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    start_line INTEGER NOT NULL,
    start_col INTEGER NOT NULL,
    end_line INTEGER NOT NULL,
    end_col INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_blocks_file ON code_blocks(file_id);
CREATE INDEX IF NOT EXISTS idx_blocks_parent ON code_blocks(parent_block_id);
CREATE INDEX IF NOT EXISTS idx_blocks_name ON code_blocks(name);

CREATE TABLE IF NOT EXISTS relationships (
    id INTEGER PRIMARY KEY,
    source_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
    target_id INTEGER REFERENCES files(id) ON DELETE SET NULL,
    kind TEXT NOT NULL,
    raw_text TEXT NOT NULL,
    symbols TEXT NOT NULL,
    side_effect_only INTEGER NOT NULL,
    tie_break TEXT,
    UNIQUE(source_id, target_id, raw_text)
);
CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_id);
CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_id);

CREATE TABLE IF NOT EXISTS file_hashes (
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    file_path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    PRIMARY KEY (project_id, file_path)
);
";

/// One writer connection, guarded by a mutex (C7/C8 serialize
/// writes through a single handle; C10 readers use their own connections).
pub struct GraphStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl GraphStore {
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(rusqlite_io_err)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A reader connection to the same file, for concurrent C10 queries.
    pub fn open_reader(&self) -> StorageResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA query_only = ON;")?;
        Ok(conn)
    }

    pub fn upsert_project(&self, name: &str, path: &Path, description: Option<&str>) -> StorageResult<ProjectId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO projects (name, path, description) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET path = excluded.path, description = excluded.description",
            params![name, path.to_string_lossy(), description],
        )?;
        let id: i64 = conn.query_row("SELECT id FROM projects WHERE name = ?1", params![name], |r| r.get(0))?;
        Ok(ProjectId::new(id as u32).expect("project id is assigned by AUTOINCREMENT, always positive"))
    }

    pub fn get_project_by_name(&self, name: &str) -> StorageResult<Option<Project>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, path, description FROM projects WHERE name = ?1",
            params![name],
            |row| {
                let id: i64 = row.get(0)?;
                let path: String = row.get(2)?;
                Ok(Project {
                    id: ProjectId::new(id as u32).expect("stored project id is always positive"),
                    name: row.get(1)?,
                    path: PathBuf::from(path),
                    description: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn get_project(&self, project_id: ProjectId) -> StorageResult<Option<Project>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, path, description FROM projects WHERE id = ?1",
            params![project_id.value()],
            |row| {
                let id: i64 = row.get(0)?;
                let path: String = row.get(2)?;
                Ok(Project {
                    id: ProjectId::new(id as u32).expect("stored project id is always positive"),
                    name: row.get(1)?,
                    path: PathBuf::from(path),
                    description: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(StorageError::from)
    }

    /// Assigns (or recovers) the stable `FileId` for `file_path` before its
    /// content is parsed, since a block's id packs its owning file's id and
    /// must be known before block extraction runs. Safe to call again later
    /// with the real content via `ingest_file`, which updates this same row.
    pub fn reserve_file_id(&self, project_id: ProjectId, file_path: &str) -> StorageResult<FileId> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO files (project_id, file_path, language, content, content_hash)
             VALUES (?1, ?2, NULL, '', '')
             ON CONFLICT(project_id, file_path) DO NOTHING",
            params![project_id.value(), file_path],
        )?;
        let id: i64 = conn.query_row(
            "SELECT id FROM files WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file_path],
            |r| r.get(0),
        )?;
        Ok(FileId::new(id as u32).expect("stored file id is always positive"))
    }

    /// Known-file set used by the relationship resolver: relative path ->
    /// `FileId`, scoped to one project.
    pub fn known_files(&self, project_id: ProjectId) -> StorageResult<std::collections::HashMap<String, FileId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, file_path FROM files WHERE project_id = ?1")?;
        let rows = stmt.query_map(params![project_id.value()], |row| {
            let id: i64 = row.get(0)?;
            let path: String = row.get(1)?;
            Ok((path, id))
        })?;
        let mut map = std::collections::HashMap::new();
        for row in rows {
            let (path, id) = row?;
            map.insert(path, FileId::new(id as u32).expect("stored file id is always positive"));
        }
        Ok(map)
    }

    pub fn get_file_hash(&self, project_id: ProjectId, file_path: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT content_hash FROM file_hashes WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file_path],
            |row| row.get(0),
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn get_file_by_path(&self, project_id: ProjectId, file_path: &str) -> StorageResult<Option<FileRecord>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, file_path, language, content, content_hash FROM files
             WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file_path],
            |row| row_to_file_record(row, project_id),
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn get_file(&self, file_id: FileId) -> StorageResult<Option<(ProjectId, FileRecord)>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, project_id, file_path, language, content, content_hash FROM files WHERE id = ?1",
            params![file_id.value()],
            |row| {
                let project_id: i64 = row.get(1)?;
                let project_id = ProjectId::new(project_id as u32).expect("stored project id is always positive");
                let record = row_to_file_record_shifted(row, project_id)?;
                Ok((project_id, record))
            },
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn blocks_for_file(&self, file_id: FileId) -> StorageResult<Vec<CodeBlock>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
             FROM code_blocks WHERE file_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![file_id.value()], row_to_code_block)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    pub fn get_block(&self, block_id: BlockId) -> StorageResult<Option<CodeBlock>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
             FROM code_blocks WHERE id = ?1",
            params![block_id.as_u64() as i64],
            row_to_code_block,
        )
        .optional()
        .map_err(StorageError::from)
    }

    pub fn blocks_by_exact_name(&self, project_id: Option<ProjectId>, name: &str) -> StorageResult<Vec<CodeBlock>> {
        let conn = self.conn.lock();
        let sql = match project_id {
            Some(_) => {
                "SELECT b.id, b.file_id, b.parent_block_id, b.kind, b.name, b.content,
                        b.start_line, b.start_col, b.end_line, b.end_col
                 FROM code_blocks b JOIN files f ON f.id = b.file_id
                 WHERE f.project_id = ?1 AND b.name = ?2 ORDER BY f.file_path, b.start_line"
            }
            None => {
                "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
                 FROM code_blocks WHERE name = ?2 ORDER BY file_id, start_line"
            }
        };
        let mut stmt = conn.prepare(sql)?;
        let project_param: i64 = project_id.map(|p| p.value() as i64).unwrap_or(0);
        let rows = stmt.query_map(params![project_param, name], row_to_code_block)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    pub fn blocks_by_name_prefix(&self, project_id: Option<ProjectId>, prefix: &str) -> StorageResult<Vec<CodeBlock>> {
        let conn = self.conn.lock();
        let pattern = format!("{prefix}%");
        let sql = match project_id {
            Some(_) => {
                "SELECT b.id, b.file_id, b.parent_block_id, b.kind, b.name, b.content,
                        b.start_line, b.start_col, b.end_line, b.end_col
                 FROM code_blocks b JOIN files f ON f.id = b.file_id
                 WHERE f.project_id = ?1 AND b.name LIKE ?2 ORDER BY f.file_path, b.start_line"
            }
            None => {
                "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
                 FROM code_blocks WHERE name LIKE ?2 ORDER BY file_id, start_line"
            }
        };
        let mut stmt = conn.prepare(sql)?;
        let project_param: i64 = project_id.map(|p| p.value() as i64).unwrap_or(0);
        let rows = stmt.query_map(params![project_param, pattern], row_to_code_block)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Case-insensitive match over `name` and `content`, name matches ranked
    /// first. Two queries rather than one `UNION` so ranking is explicit.
    pub fn blocks_by_keyword(&self, project_id: Option<ProjectId>, keyword: &str) -> StorageResult<Vec<CodeBlock>> {
        let conn = self.conn.lock();
        let pattern = format!("%{}%", keyword.to_lowercase());
        let project_param: i64 = project_id.map(|p| p.value() as i64).unwrap_or(0);

        let name_sql = if project_id.is_some() {
            "SELECT b.id, b.file_id, b.parent_block_id, b.kind, b.name, b.content,
                    b.start_line, b.start_col, b.end_line, b.end_col
             FROM code_blocks b JOIN files f ON f.id = b.file_id
             WHERE f.project_id = ?1 AND LOWER(b.name) LIKE ?2 ORDER BY f.file_path, b.start_line"
        } else {
            "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
             FROM code_blocks WHERE LOWER(name) LIKE ?2 ORDER BY file_id, start_line"
        };
        let content_sql = if project_id.is_some() {
            "SELECT b.id, b.file_id, b.parent_block_id, b.kind, b.name, b.content,
                    b.start_line, b.start_col, b.end_line, b.end_col
             FROM code_blocks b JOIN files f ON f.id = b.file_id
             WHERE f.project_id = ?1 AND LOWER(b.content) LIKE ?2 AND LOWER(b.name) NOT LIKE ?2
             ORDER BY f.file_path, b.start_line"
        } else {
            "SELECT id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col
             FROM code_blocks WHERE LOWER(content) LIKE ?2 AND LOWER(name) NOT LIKE ?2 ORDER BY file_id, start_line"
        };

        let mut by_name = Vec::new();
        {
            let mut stmt = conn.prepare(name_sql)?;
            let rows = stmt.query_map(params![project_param, pattern], row_to_code_block)?;
            for row in rows {
                by_name.push(row?);
            }
        }
        let mut by_content = Vec::new();
        {
            let mut stmt = conn.prepare(content_sql)?;
            let rows = stmt.query_map(params![project_param, pattern], row_to_code_block)?;
            for row in rows {
                by_content.push(row?);
            }
        }
        by_name.extend(by_content);
        Ok(by_name)
    }

    pub fn relationships_for_source(&self, source_id: FileId) -> StorageResult<Vec<Relationship>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, source_id, target_id, kind, raw_text, symbols, side_effect_only, tie_break
             FROM relationships WHERE source_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![source_id.value()], row_to_relationship)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StorageError::from)
    }

    /// Atomic per-file ingest: delete the file's prior blocks and
    /// relationships, then insert the new ones, then record the hash — all
    /// or nothing (testable property: integrity violation rolls back to the
    /// file's prior state).
    pub fn ingest_file(
        &self,
        project_id: ProjectId,
        file: &FileRecord,
        blocks: &[CodeBlock],
        relationships: &[(Relationship, Option<FileId>)],
    ) -> StorageResult<FileId> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO files (project_id, file_path, language, content, content_hash)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(project_id, file_path) DO UPDATE SET
                language = excluded.language, content = excluded.content, content_hash = excluded.content_hash",
            params![
                project_id.value(),
                file.file_path,
                file.language.map(|l| l.db_tag()),
                file.content,
                file.content_hash,
            ],
        )?;
        let file_id: i64 = tx.query_row(
            "SELECT id FROM files WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file.file_path],
            |r| r.get(0),
        )?;
        let file_id = FileId::new(file_id as u32).expect("stored file id is always positive");

        tx.execute("DELETE FROM code_blocks WHERE file_id = ?1", params![file_id.value()])?;
        tx.execute("DELETE FROM relationships WHERE source_id = ?1", params![file_id.value()])?;

        for block in blocks {
            tx.execute(
                "INSERT INTO code_blocks
                    (id, file_id, parent_block_id, kind, name, content, start_line, start_col, end_line, end_col)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    block.id.as_u64() as i64,
                    block.file_id.value(),
                    block.parent_block_id.map(|p| p.as_u64() as i64),
                    block.kind.as_str(),
                    block.name,
                    block.content,
                    block.range.start_line,
                    block.range.start_col,
                    block.range.end_line,
                    block.range.end_col,
                ],
            )?;
        }

        for (relationship, target_id) in relationships {
            tx.execute(
                "INSERT OR IGNORE INTO relationships
                    (source_id, target_id, kind, raw_text, symbols, side_effect_only, tie_break)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    file_id.value(),
                    target_id.map(|t| t.value()),
                    relation_kind_str(&relationship.kind),
                    relationship.metadata.raw_text,
                    serde_json::to_string(&relationship.metadata.symbols).unwrap_or_default(),
                    relationship.metadata.side_effect_only as i64,
                    relationship.metadata.tie_break.map(tie_break_str),
                ],
            )?;
        }

        tx.execute(
            "INSERT INTO file_hashes (project_id, file_path, content_hash) VALUES (?1, ?2, ?3)
             ON CONFLICT(project_id, file_path) DO UPDATE SET content_hash = excluded.content_hash",
            params![project_id.value(), file.file_path, file.content_hash],
        )?;

        tx.commit()?;
        Ok(file_id)
    }

    /// Deletes a file and, via `ON DELETE CASCADE`, its blocks and the
    /// relationships sourced from it.
    pub fn delete_file(&self, project_id: ProjectId, file_path: &str) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM files WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file_path],
        )?;
        conn.execute(
            "DELETE FROM file_hashes WHERE project_id = ?1 AND file_path = ?2",
            params![project_id.value(), file_path],
        )?;
        Ok(())
    }
}

fn relation_kind_str(kind: &RelationKind) -> &'static str {
    match kind {
        RelationKind::Import => "import",
    }
}

fn tie_break_str(tie_break: TieBreak) -> &'static str {
    match tie_break {
        TieBreak::SameDirectory => "same_directory",
        TieBreak::ShortestPath => "shortest_path",
        TieBreak::Lexicographic => "lexicographic",
    }
}

fn tie_break_from_str(value: &str) -> Option<TieBreak> {
    match value {
        "same_directory" => Some(TieBreak::SameDirectory),
        "shortest_path" => Some(TieBreak::ShortestPath),
        "lexicographic" => Some(TieBreak::Lexicographic),
        _ => None,
    }
}

fn row_to_file_record(row: &rusqlite::Row, project_id: ProjectId) -> rusqlite::Result<FileRecord> {
    let id: i64 = row.get(0)?;
    let language: Option<String> = row.get(2)?;
    Ok(FileRecord {
        id: FileId::new(id as u32).expect("stored file id is always positive"),
        project_id,
        file_path: row.get(1)?,
        language: language.and_then(|l| Language::from_db_tag(&l)),
        content: row.get(3)?,
        content_hash: row.get(4)?,
    })
}

fn row_to_file_record_shifted(row: &rusqlite::Row, project_id: ProjectId) -> rusqlite::Result<FileRecord> {
    let id: i64 = row.get(0)?;
    let language: Option<String> = row.get(3)?;
    Ok(FileRecord {
        id: FileId::new(id as u32).expect("stored file id is always positive"),
        project_id,
        file_path: row.get(2)?,
        language: language.and_then(|l| Language::from_db_tag(&l)),
        content: row.get(4)?,
        content_hash: row.get(5)?,
    })
}

fn row_to_code_block(row: &rusqlite::Row) -> rusqlite::Result<CodeBlock> {
    let id: i64 = row.get(0)?;
    let file_id: i64 = row.get(1)?;
    let parent_block_id: Option<i64> = row.get(2)?;
    let kind: String = row.get(3)?;
    Ok(CodeBlock {
        id: BlockId::from_u64(id as u64),
        file_id: FileId::new(file_id as u32).expect("stored file id is always positive"),
        parent_block_id: parent_block_id.map(|p| BlockId::from_u64(p as u64)),
        kind: BlockKind::from_str(&kind).unwrap_or(BlockKind::Variable),
        name: row.get(4)?,
        content: row.get(5)?,
        range: Range::new(row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?),
    })
}

fn row_to_relationship(row: &rusqlite::Row) -> rusqlite::Result<Relationship> {
    let id: i64 = row.get(0)?;
    let source_id: i64 = row.get(1)?;
    let target_id: Option<i64> = row.get(2)?;
    let symbols_json: String = row.get(5)?;
    let tie_break: Option<String> = row.get(7)?;
    Ok(Relationship {
        id,
        source_id: FileId::new(source_id as u32).expect("stored file id is always positive"),
        target_id: target_id.map(|t| FileId::new(t as u32).expect("stored file id is always positive")),
        kind: RelationKind::Import,
        metadata: ImportMetadata {
            raw_text: row.get(4)?,
            symbols: serde_json::from_str(&symbols_json).unwrap_or_default(),
            side_effect_only: row.get::<_, i64>(6)? != 0,
            tie_break: tie_break.and_then(|t| tie_break_from_str(&t)),
        },
    })
}

fn rusqlite_io_err(e: std::io::Error) -> StorageError {
    StorageError::IntegrityViolation {
        reason: format!("failed to create index directory: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::block::BlockKind;
    use tempfile::TempDir;

    fn store() -> (TempDir, GraphStore) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(&dir.path().join("graph.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn upsert_project_reconciles_path_on_name_conflict() {
        let (_dir, store) = store();
        let id1 = store.upsert_project("demo", Path::new("/a"), None).unwrap();
        let id2 = store.upsert_project("demo", Path::new("/b"), Some("moved")).unwrap();
        assert_eq!(id1, id2);
        let project = store.get_project_by_name("demo").unwrap().unwrap();
        assert_eq!(project.path, PathBuf::from("/b"));
        assert_eq!(project.description.as_deref(), Some("moved"));
    }

    #[test]
    fn ingest_file_then_delete_cascades_blocks_and_relationships() {
        let (_dir, store) = store();
        let project_id = store.upsert_project("demo", Path::new("/demo"), None).unwrap();
        let file = FileRecord {
            id: FileId::new(1).unwrap(),
            project_id,
            file_path: "a.py".to_string(),
            language: Some(Language::Python),
            content: "class C:\n    pass\n".to_string(),
            content_hash: "deadbeef".to_string(),
        };
        let block = CodeBlock {
            id: BlockId::new(FileId::new(1).unwrap(), 1),
            file_id: FileId::new(1).unwrap(),
            parent_block_id: None,
            kind: BlockKind::Class,
            name: "C".to_string(),
            content: "class C:\n    pass".to_string(),
            range: Range::new(1, 0, 2, 8),
        };
        let file_id = store.ingest_file(project_id, &file, &[block], &[]).unwrap();
        assert_eq!(store.blocks_for_file(file_id).unwrap().len(), 1);

        store.delete_file(project_id, "a.py").unwrap();
        assert!(store.get_file_by_path(project_id, "a.py").unwrap().is_none());
        assert!(store.blocks_for_file(file_id).unwrap().is_empty());
    }

    #[test]
    fn known_files_maps_relative_path_to_file_id() {
        let (_dir, store) = store();
        let project_id = store.upsert_project("demo", Path::new("/demo"), None).unwrap();
        let file = FileRecord {
            id: FileId::new(1).unwrap(),
            project_id,
            file_path: "a.py".to_string(),
            language: Some(Language::Python),
            content: "x = 1\n".to_string(),
            content_hash: "hash1".to_string(),
        };
        store.ingest_file(project_id, &file, &[], &[]).unwrap();
        let known = store.known_files(project_id).unwrap();
        assert!(known.contains_key("a.py"));
    }
}
