//! C1 File Scanner: walks a project root, hashes and reads each candidate
//! file, and reports per-file errors instead of aborting the whole scan.

pub mod hash;
pub mod walker;

use std::path::{Path, PathBuf};

use crate::config::IndexingConfig;
use crate::parsing::language::Language;
use crate::scanning::hash::{compute_file_hash, looks_like_text};
use crate::scanning::walker::FileWalker;

#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// POSIX-relative path from the project root, used as the stable
    /// `FileRecord::file_path` key across machines.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub language: Option<Language>,
    pub content: String,
    pub content_hash: String,
}

#[derive(Debug)]
pub struct ScanError {
    pub absolute_path: PathBuf,
    pub reason: String,
}

pub struct ScanOutcome {
    pub files: Vec<ScannedFile>,
    pub errors: Vec<ScanError>,
}

pub fn scan_project(root: &Path, config: &IndexingConfig) -> ScanOutcome {
    let walker = FileWalker::new(config);
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for path in walker.walk(root) {
        match scan_one_file(root, &path) {
            Ok(Some(scanned)) => files.push(scanned),
            Ok(None) => {}
            Err(reason) => errors.push(ScanError {
                absolute_path: path,
                reason,
            }),
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    ScanOutcome { files, errors }
}

/// Returns `Ok(None)` for binary files, which are skipped entirely rather
/// than stored opaquely (binary handling is left to the scanner;
/// this crate only ever indexes and embeds text).
fn scan_one_file(root: &Path, path: &Path) -> Result<Option<ScannedFile>, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    if !looks_like_text(&bytes) {
        return Ok(None);
    }

    let content = String::from_utf8(bytes.clone()).map_err(|e| e.to_string())?;
    let content_hash = compute_file_hash(&bytes);
    let relative_path = relative_posix_path(root, path);
    let language = Language::from_path(path);

    Ok(Some(ScannedFile {
        relative_path,
        absolute_path: path.to_path_buf(),
        language,
        content,
        content_hash,
    }))
}

fn relative_posix_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
