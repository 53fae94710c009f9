//! C9 Incremental Indexing Orchestrator.
//!
//! Drives a full pipeline run over a project root: scan -> three-way diff
//! against `file_hashes` -> parse/extract/hoist -> resolve imports -> embed
//! -> persist. A per-file try/catch accumulates a report rather than
//! aborting the run when one file fails.
//!
//! The CPU-bound parse/extract/hoist step is the only stage run off a
//! rayon worker pool sized by `IndexingConfig::parallel_threads`: each
//! file's AST walk is independent of every other file's, while graph
//! ingestion (one writer connection) and embedding (one `&mut
//! EmbeddingModel`/ONNX session) both stay on the calling thread.

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;

use crate::config::Settings;
use crate::embedding::pipeline::EmbeddingPipeline;
use crate::embedding::{owner_header, EmbeddingModel};
use crate::error::{IndexError, IndexResult};
use crate::model::block::CodeBlock;
use crate::model::file::FileRecord;
use crate::model::relationship::Relationship;
use crate::parsing::factory::ParserFactory;
use crate::parsing::hoist::hoist_blocks;
use crate::parsing::import::RawImport;
use crate::parsing::language::Language;
use crate::parsing::parser::BlockExtractor;
use crate::scanning::{scan_project, ScannedFile};
use crate::storage::{GraphStore, VectorStore};
use crate::types::{BlockIdCounter, FileId, ProjectId};

use super::resolver::resolve_import;

/// Tally of one `run` invocation. `failed` entries carry enough context
/// (relative path + message) to retry or report without re-scanning.
#[derive(Debug, Default)]
pub struct RunReport {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub failed: Vec<(String, String)>,
}

pub struct Orchestrator<'a> {
    graph: &'a GraphStore,
    vectors: &'a VectorStore,
    settings: &'a Settings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(graph: &'a GraphStore, vectors: &'a VectorStore, settings: &'a Settings) -> Self {
        Self {
            graph,
            vectors,
            settings,
        }
    }

    /// Runs one full incremental pass for `project_name` rooted at `root`.
    /// Files are processed in lexicographic path order so repeated runs over
    /// an unchanged tree produce byte-identical logs and block ids.
    pub fn run(&self, project_name: &str, root: &Path) -> IndexResult<RunReport> {
        let project_id = self.graph.upsert_project(project_name, root, None)?;

        let model_dir = &self.settings.embedding.model_dir;
        if !crate::embedding::model_dir_is_complete(model_dir) {
            let missing = crate::embedding::missing_model_file(model_dir)
                .unwrap_or_else(|| model_dir.join("model.onnx"));
            return Err(IndexError::MissingEmbeddingModel {
                model_dir: model_dir.clone(),
                missing_file: missing.display().to_string(),
            });
        }
        let model = EmbeddingModel::load(
            model_dir,
            self.settings.embedding.inference_max_tokens,
            self.settings.embedding.embedding_dim,
        )
        .map_err(|e| IndexError::General(e.to_string()))?;
        let mut pipeline = EmbeddingPipeline::new(model, self.vectors, self.settings.embedding.chunk_lines);

        let outcome = scan_project(root, &self.settings.indexing);
        let mut report = RunReport::default();
        for error in &outcome.errors {
            report
                .failed
                .push((error.absolute_path.display().to_string(), error.reason.clone()));
        }

        let scanned_paths: HashSet<String> = outcome.files.iter().map(|f| f.relative_path.clone()).collect();
        let known = self.graph.known_files(project_id)?;
        for (stale_path, stale_id) in &known {
            if scanned_paths.contains(stale_path) {
                continue;
            }
            for block in self.graph.blocks_for_file(*stale_id)? {
                self.vectors.delete_by_owner(&format!("block_{}", block.id))?;
            }
            self.graph.delete_file(project_id, stale_path)?;
            self.vectors.delete_by_owner(&format!("file_{}", stale_id.value()))?;
            report.removed += 1;
        }

        let factory = ParserFactory::new();
        let mut known_files = self.graph.known_files(project_id)?;

        let mut pending = Vec::new();
        for scanned in &outcome.files {
            let prior_hash = self.graph.get_file_hash(project_id, &scanned.relative_path)?;
            if prior_hash.as_deref() == Some(scanned.content_hash.as_str()) {
                report.unchanged += 1;
                continue;
            }
            let is_new = prior_hash.is_none();

            let file_id = self
                .graph
                .reserve_file_id(project_id, &scanned.relative_path)
                .map_err(IndexError::Storage)?;
            known_files.insert(scanned.relative_path.clone(), file_id);

            pending.push(PendingFile { file_id, is_new, scanned });
        }

        let threshold = self.settings.indexing.nested_hoist_line_threshold;
        let num_threads = self.settings.indexing.parallel_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| IndexError::General(format!("failed to build parsing worker pool: {e}")))?;

        let parsed: Vec<IndexResult<ParsedFile>> = pool.install(|| {
            pending
                .par_iter()
                .map(|p| parse_and_hoist(p.scanned, &factory, p.file_id, threshold))
                .collect()
        });

        for (pending_file, parsed_file) in pending.iter().zip(parsed) {
            let result = parsed_file.and_then(|parsed_file| {
                self.finish_indexing(project_id, pending_file.file_id, pending_file.scanned, parsed_file, &known_files, &mut pipeline)
            });
            match result {
                Ok(()) => {
                    if pending_file.is_new {
                        report.added += 1;
                    } else {
                        report.modified += 1;
                    }
                }
                Err(e) => report.failed.push((pending_file.scanned.relative_path.clone(), e.to_string())),
            }
        }

        Ok(report)
    }

    /// Ingests already-parsed blocks/imports: resolves imports against the
    /// project's known-file set, writes the file+blocks+relationships to
    /// C7, and embeds the file and every block into C8.
    fn finish_indexing(
        &self,
        project_id: ProjectId,
        file_id: FileId,
        scanned: &ScannedFile,
        parsed: ParsedFile,
        known_files: &std::collections::HashMap<String, FileId>,
        pipeline: &mut EmbeddingPipeline<'_>,
    ) -> IndexResult<()> {
        let ParsedFile { blocks, raw_imports } = parsed;

        let file = FileRecord {
            id: file_id,
            project_id,
            file_path: scanned.relative_path.clone(),
            language: scanned.language,
            content: scanned.content.clone(),
            content_hash: scanned.content_hash.clone(),
        };

        let relationships: Vec<(Relationship, Option<FileId>)> = raw_imports
            .iter()
            .map(|raw| {
                let language = scanned.language.unwrap_or(Language::Rust);
                let resolved = resolve_import(&scanned.relative_path, language, raw, known_files);
                let relationship = Relationship {
                    id: 0,
                    source_id: file_id,
                    target_id: resolved.target_id,
                    kind: crate::model::relationship::RelationKind::Import,
                    metadata: resolved.metadata,
                };
                (relationship, resolved.target_id)
            })
            .collect();

        let file_id = self
            .graph
            .ingest_file(project_id, &file, &blocks, &relationships)
            .map_err(IndexError::Storage)?;

        let owner_key = format!("file_{}", file_id.value());
        let header = owner_header(
            &scanned.relative_path,
            scanned.language.map(|l| l.name()).unwrap_or("unknown"),
            None,
        );
        pipeline
            .embed_owner(&owner_key, project_id.value() as i64, &scanned.content, Some(&header))
            .map_err(|e| IndexError::General(format!("embedding '{}' failed: {e}", scanned.relative_path)))?;

        for block in &blocks {
            let block_owner = format!("block_{}", block.id);
            let block_header = owner_header(
                &scanned.relative_path,
                scanned.language.map(|l| l.name()).unwrap_or("unknown"),
                Some(&block.name),
            );
            pipeline
                .embed_owner(&block_owner, project_id.value() as i64, &block.content, Some(&block_header))
                .map_err(|e| IndexError::General(format!("embedding block '{}' failed: {e}", block.name)))?;
        }

        Ok(())
    }
}

struct PendingFile<'a> {
    file_id: FileId,
    is_new: bool,
    scanned: &'a ScannedFile,
}

struct ParsedFile {
    blocks: Vec<CodeBlock>,
    raw_imports: Vec<RawImport>,
}

/// Pure, thread-safe: parsing and hoisting touch only `scanned` and the
/// stateless `factory`, so this is the function the rayon pool fans out
/// over one call per changed file.
fn parse_and_hoist(
    scanned: &ScannedFile,
    factory: &ParserFactory,
    file_id: FileId,
    hoist_threshold: u32,
) -> IndexResult<ParsedFile> {
    match scanned.language {
        Some(language) => {
            let extractor = factory.create_extractor(language);
            let mut counter = BlockIdCounter::new(file_id);
            let extraction = extractor
                .extract(&scanned.content, file_id, &mut counter)
                .map_err(IndexError::Parse)?;
            let mut blocks = extraction.blocks;
            hoist_blocks(&scanned.content, &mut blocks, hoist_threshold);
            Ok(ParsedFile { blocks, raw_imports: extraction.imports })
        }
        // Unsupported file types are still hashed and stored; they have
        // no blocks and rely on file-level embedding to stay searchable.
        None => Ok(ParsedFile { blocks: Vec::new(), raw_imports: Vec::new() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn model_fixture_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("CODELOOM_TEST_MODEL_DIR").map(std::path::PathBuf::from)
    }

    #[test]
    fn run_reports_zero_changes_on_an_empty_project() {
        let Some(model_dir) = model_fixture_dir() else {
            eprintln!("skipping: CODELOOM_TEST_MODEL_DIR not set, no ONNX fixture available");
            return;
        };

        let project_dir = TempDir::new().unwrap();
        let graph_dir = TempDir::new().unwrap();
        fs::write(project_dir.path().join("main.py"), "x = 1\n").unwrap();

        let mut settings = Settings::default();
        settings.embedding.model_dir = model_dir;

        let graph = GraphStore::open(&graph_dir.path().join("graph.db")).unwrap();
        let vectors = VectorStore::open(&graph_dir.path().join("vectors.db"), settings.embedding.embedding_dim).unwrap();

        let orchestrator = Orchestrator::new(&graph, &vectors, &settings);
        let report = orchestrator.run("demo", project_dir.path()).unwrap();
        assert_eq!(report.added, 1);

        let report2 = orchestrator.run("demo", project_dir.path()).unwrap();
        assert_eq!(report2.unchanged, 1);
        assert_eq!(report2.added, 0);
    }
}
