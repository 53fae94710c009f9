//! Error types for the code intelligence index.
//!
//! Structured `thiserror` enums, one per layer, following the error
//! taxonomy of the design: I/O unavailable, parse failure, extraction
//! anomaly, embedding failure, integrity violation, cancellation. Low-level
//! failures are wrapped with file-path context via `ErrorContext` and never
//! abort the orchestrator, with the two startup-precondition exceptions
//! noted on `IndexError::MissingEmbeddingModel` / `IndexError::DatabaseUnopenable`.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{BlockId, FileId};

/// Top-level error type for indexing operations.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Unsupported file type '{extension}' for file '{path}'")]
    UnsupportedFileType { path: PathBuf, extension: String },

    #[error("File ID {id:?} not found in index")]
    FileNotFound { id: FileId },

    #[error("Block ID {id} not found in index")]
    BlockNotFound { id: BlockId },

    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error(
        "Embedding model directory '{model_dir}' is missing required file '{missing_file}'"
    )]
    MissingEmbeddingModel {
        model_dir: PathBuf,
        missing_file: String,
    },

    #[error("Database at '{path}' could not be opened: {source}")]
    DatabaseUnopenable {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Indexing run cancelled")]
    Cancelled,

    #[error("{0}")]
    General(String),
}

impl IndexError {
    /// Recovery suggestions surfaced alongside the error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::MissingEmbeddingModel { .. } => vec![
                "Point `embedding.model_dir` at a directory containing model.onnx and tokenizer.json",
                "This crate never downloads a model; both files must already exist locally",
            ],
            Self::DatabaseUnopenable { .. } => vec![
                "Check that the index directory exists and is writable",
                "Run `codeloom init` to create it",
            ],
            Self::Storage(StorageError::TransactionFailed { .. }) => vec![
                "The operation was rolled back; the store is in a consistent state",
                "Re-running the indexer will retry the affected file",
            ],
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::UnsupportedFileType { .. } => vec![
                "The file is stored with content and content_hash but zero blocks",
                "It remains searchable through file-level embedding",
            ],
            _ => vec![],
        }
    }
}

/// Errors specific to AST parsing and block extraction.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Tree-sitter could not produce an AST for '{path}'")]
    SyntaxError { path: PathBuf },

    #[error("Invalid UTF-8 in source file '{path}'")]
    InvalidUtf8 { path: PathBuf },

    #[error("Recursion depth exceeded while walking AST for '{path}'")]
    RecursionLimitExceeded { path: PathBuf },
}

/// Errors specific to the relational and vector stores.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Transaction failed after operations: {operations:?}. Cause: {cause}")]
    TransactionFailed {
        operations: Vec<String>,
        cause: String,
    },

    #[error("Constraint violation: {reason}")]
    IntegrityViolation { reason: String },

    #[error("Internal mutex was poisoned, likely due to a panic in another thread")]
    MutexPoisoned,
}

/// Errors specific to embedding inference.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Failed to load ONNX session from '{path}': {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Failed to load tokenizer from '{path}': {reason}")]
    TokenizerLoad { path: PathBuf, reason: String },

    #[error("Inference failed for batch of {batch_size} chunks: {reason}")]
    InferenceFailed { batch_size: usize, reason: String },
}

pub type IndexResult<T> = Result<T, IndexError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Adds file-path context to a lower-level error on its way up to `IndexError`.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> Result<T, IndexError>;
    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &str) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("{msg}: {e}")))
    }

    fn with_path(self, path: &std::path::Path) -> Result<T, IndexError> {
        self.map_err(|e| IndexError::General(format!("Error processing '{}': {e}", path.display())))
    }
}
