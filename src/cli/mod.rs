//! Command-line surface: `init`, `index`, `query <subcommand>`, `config`.
//!
//! A single file of `clap`-derived argument types; splits into
//! `args.rs`/`commands/` only once a CLI grows past a handful of
//! subcommands, which this one hasn't yet. `main.rs` owns dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "codeloom", version, about = "A code intelligence index: scan, embed, and query a repository's structure")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a `.codeloom/settings.toml` in the current directory.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },

    /// Scan the project, update the relational and vector stores.
    Index {
        /// Project root to scan. Defaults to the current directory.
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Name to register the project under. Defaults to the root
        /// directory's file name.
        #[arg(long)]
        project: Option<String>,
    },

    /// Run a read-only query against the index.
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },

    /// Inspect or rewrite the active configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// Look up a file record by its project-relative path.
    File(FileArgs),

    /// File record plus the flattened block tree extracted from it.
    Blocks(FileArgs),

    /// Exact-name lookup over blocks, falling back to a prefix match.
    ByName {
        name: String,
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Case-insensitive search over block name and content.
    Keyword {
        keyword: String,
        #[arg(long)]
        project: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// A single block by its packed id (as printed by other query commands).
    Block { block_id: u64 },

    /// The resolved and unresolved imports of one file.
    Imports(FileArgs),

    /// Breadth-first walk of a file's import graph.
    Dependencies {
        #[command(flatten)]
        file: FileArgs,
        /// Maximum number of import hops to follow.
        #[arg(long, default_value_t = 5)]
        max_hops: usize,
    },

    /// Semantic (embedding) search over indexed files and blocks.
    Search {
        text: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        threshold: Option<f32>,
    },
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Project this file was indexed under.
    #[arg(long)]
    pub project: String,
    /// Project-relative path, as stored by the indexer (POSIX separators).
    pub path: String,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (defaults + file + env) as TOML.
    Show,
    /// Print the path to the active `.codeloom/settings.toml`, if any.
    Path,
}
