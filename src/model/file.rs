use serde::{Deserialize, Serialize};

use crate::parsing::language::Language;
use crate::types::{FileId, ProjectId};

/// A single scanned and parsed source file.
///
/// `file_path` is stored POSIX-relative to the project root so that ids and
/// hashes are stable across machines. Uniqueness is `(project_id, file_path)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub project_id: ProjectId,
    pub file_path: String,
    pub language: Option<Language>,
    pub content: String,
    /// Hex-encoded SHA-256 of `content`, used by C9 to detect unchanged files
    /// without re-reading or re-parsing them.
    pub content_hash: String,
}
