use std::path::Path;

use clap::Parser;
use codeloom::config::Settings;
use codeloom::indexing::Orchestrator;
use codeloom::logging;
use codeloom::query;
use codeloom::storage::{GraphStore, VectorStore};

mod cli;

use cli::{Cli, Commands, ConfigAction, FileArgs, PageArgs, QueryCommand};

fn main() {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Init { .. }) {
        if let Err(warning) = Settings::check_init() {
            eprintln!("Warning: {warning}");
            eprintln!("Using default configuration for now.");
        }
    }

    let result = match cli.command {
        Commands::Init { force } => run_init(force),
        Commands::Index { path, project } => run_index(&path, project.as_deref()),
        Commands::Query { query } => run_query(query),
        Commands::Config { action } => run_config(action),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn run_init(force: bool) -> Result<(), String> {
    match Settings::init_config_file(force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn run_config(action: ConfigAction) -> Result<(), String> {
    let settings = Settings::load().map_err(|e| e.to_string())?;
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings).map_err(|e| e.to_string())?;
            println!("{toml_str}");
        }
        ConfigAction::Path => match Settings::workspace_root() {
            Some(root) => println!("{}", root.join(".codeloom/settings.toml").display()),
            None => println!("(no .codeloom directory found; run `codeloom init`)"),
        },
    }
    Ok(())
}

fn load_stores(settings: &Settings) -> Result<(GraphStore, VectorStore), String> {
    logging::init_with_config(&settings.logging);
    let graph = GraphStore::open(&settings.index_path.join("graph.db")).map_err(|e| e.to_string())?;
    let vectors = VectorStore::open(&settings.index_path.join("vectors.db"), settings.embedding.embedding_dim)
        .map_err(|e| e.to_string())?;
    Ok((graph, vectors))
}

fn run_index(path: &Path, project: Option<&str>) -> Result<(), String> {
    let settings = Settings::load().map_err(|e| e.to_string())?;
    let (graph, vectors) = load_stores(&settings)?;

    let absolute_path = path
        .canonicalize()
        .map_err(|e| format!("cannot resolve '{}': {e}", path.display()))?;
    let project_name = match project {
        Some(name) => name.to_string(),
        None => absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string()),
    };

    let orchestrator = Orchestrator::new(&graph, &vectors, &settings);
    let report = orchestrator.run(&project_name, &absolute_path).map_err(|e| e.to_string())?;

    println!("Indexed project '{project_name}' at {}", absolute_path.display());
    println!("  added:     {}", report.added);
    println!("  modified:  {}", report.modified);
    println!("  removed:   {}", report.removed);
    println!("  unchanged: {}", report.unchanged);
    if !report.failed.is_empty() {
        println!("  failed:    {}", report.failed.len());
        for (path, reason) in &report.failed {
            eprintln!("    {path}: {reason}");
        }
    }
    Ok(())
}

fn page_from(args: PageArgs, settings: &Settings) -> query::Page {
    query::Page::new(args.limit.unwrap_or(settings.query.default_query_limit), args.offset)
}

fn project_id(graph: &GraphStore, name: &str) -> Result<codeloom::types::ProjectId, String> {
    graph
        .get_project_by_name(name)
        .map_err(|e| e.to_string())?
        .map(|p| p.id)
        .ok_or_else(|| format!("no project named '{name}' has been indexed"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn run_query(query: QueryCommand) -> Result<(), String> {
    let settings = Settings::load().map_err(|e| e.to_string())?;
    let (graph, vectors) = load_stores(&settings)?;

    match query {
        QueryCommand::File(FileArgs { project, path }) => {
            let pid = project_id(&graph, &project)?;
            let file = query::get_file_by_path(&graph, pid, &path).map_err(|e| e.to_string())?;
            print_json(&file)
        }
        QueryCommand::Blocks(FileArgs { project, path }) => {
            let pid = project_id(&graph, &project)?;
            let summary = query::get_file_block_summary(&graph, pid, &path).map_err(|e| e.to_string())?;
            print_json(&summary)
        }
        QueryCommand::ByName { name, project, page } => {
            let pid = project.map(|p| project_id(&graph, &p)).transpose()?;
            let blocks =
                query::get_blocks_by_name(&graph, pid, &name, page_from(page, &settings)).map_err(|e| e.to_string())?;
            print_json(&blocks)
        }
        QueryCommand::Keyword { keyword, project, page } => {
            let pid = project.map(|p| project_id(&graph, &p)).transpose()?;
            let blocks = query::get_blocks_by_keyword(&graph, pid, &keyword, page_from(page, &settings))
                .map_err(|e| e.to_string())?;
            print_json(&blocks)
        }
        QueryCommand::Block { block_id } => {
            let block = query::get_block_details(&graph, codeloom::types::BlockId::from_u64(block_id))
                .map_err(|e| e.to_string())?;
            print_json(&block)
        }
        QueryCommand::Imports(FileArgs { project, path }) => {
            let pid = project_id(&graph, &project)?;
            let file = query::get_file_by_path(&graph, pid, &path)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("no file '{path}' indexed under project '{project}'"))?;
            let imports = query::get_file_imports(&graph, file.id).map_err(|e| e.to_string())?;
            print_json(&imports)
        }
        QueryCommand::Dependencies { file, max_hops } => {
            let pid = project_id(&graph, &file.project)?;
            let record = query::get_file_by_path(&graph, pid, &file.path)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("no file '{}' indexed under project '{}'", file.path, file.project))?;
            let chain = query::get_dependency_chain(&graph, record.id, max_hops).map_err(|e| e.to_string())?;
            print_json(&chain)
        }
        QueryCommand::Search { text, limit, threshold } => {
            if !codeloom::embedding::model_dir_is_complete(&settings.embedding.model_dir) {
                return Err(format!(
                    "embedding model directory '{}' is incomplete; semantic search is unavailable",
                    settings.embedding.model_dir.display()
                ));
            }
            let mut model = codeloom::embedding::EmbeddingModel::load(
                &settings.embedding.model_dir,
                settings.embedding.inference_max_tokens,
                settings.embedding.embedding_dim,
            )
            .map_err(|e| e.to_string())?;
            let hits = query::semantic_search(
                &graph,
                &vectors,
                &mut model,
                &text,
                limit.unwrap_or(settings.query.default_query_limit),
                threshold.unwrap_or(settings.query.similarity_threshold),
            )
            .map_err(|e| e.to_string())?;
            print_json(&hits)
        }
    }
}
