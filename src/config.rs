//! Layered configuration: defaults, then `.codeloom/settings.toml`, then
//! `CL_`-prefixed environment variables, via `figment` layering
//! (`Serialized::defaults` -> `Toml::file` -> `Env::prefixed`).
//!
//! # Environment variables
//!
//! `CL_` prefixed, double underscore separates nested levels:
//! - `CL_INDEXING__CHUNK_LINES=40`
//! - `CL_EMBEDDING__INFERENCE_MAX_TOKENS=128`

use std::collections::HashMap;
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding `graph.db` and `vectors.db`.
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    #[serde(default)]
    pub indexing: IndexingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IndexingConfig {
    /// Line-count trigger for the nested-function hoister.
    #[serde(default = "default_hoist_threshold")]
    pub nested_hoist_line_threshold: u32,

    /// Number of parallel worker threads used for parsing/embedding.
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Extra glob patterns to ignore, on top of the built-in defaults.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    /// Directory containing `model.onnx` and `tokenizer.json`.
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Lines per chunk when splitting a block/file for embedding.
    #[serde(default = "default_chunk_lines")]
    pub chunk_lines: u32,

    /// Fixed by the model architecture; not meant to be changed casually.
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Token budget per chunk before truncation.
    #[serde(default = "default_max_tokens")]
    pub inference_max_tokens: usize,

    /// Maximum chunks submitted to the ONNX session in a single batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_query_limit")]
    pub default_query_limit: usize,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub extensions: Vec<String>,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(".codeloom/index")
}
fn default_model_dir() -> PathBuf {
    PathBuf::from(".codeloom/model")
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_hoist_threshold() -> u32 {
    300
}
fn default_chunk_lines() -> u32 {
    20
}
fn default_embedding_dim() -> usize {
    384
}
fn default_max_tokens() -> usize {
    256
}
fn default_batch_size() -> usize {
    32
}
fn default_query_limit() -> usize {
    100
}
fn default_similarity_threshold() -> f32 {
    0.20
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            index_path: default_index_path(),
            indexing: IndexingConfig::default(),
            embedding: EmbeddingConfig::default(),
            query: QueryConfig::default(),
            logging: LoggingConfig::default(),
            languages: default_languages(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            nested_hoist_line_threshold: default_hoist_threshold(),
            parallel_threads: default_parallel_threads(),
            ignore_patterns: vec![
                "target/**".to_string(),
                "node_modules/**".to_string(),
                ".git/**".to_string(),
                "dist/**".to_string(),
                "build/**".to_string(),
                "__pycache__/**".to_string(),
                "*.generated.*".to_string(),
            ],
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            chunk_lines: default_chunk_lines(),
            embedding_dim: default_embedding_dim(),
            inference_max_tokens: default_max_tokens(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_query_limit: default_query_limit(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();
    langs.insert(
        "rust".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["rs".to_string()],
        },
    );
    langs.insert(
        "python".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["py".to_string(), "pyi".to_string()],
        },
    );
    langs.insert(
        "typescript".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec![
                "ts".to_string(),
                "tsx".to_string(),
                "js".to_string(),
                "jsx".to_string(),
                "mjs".to_string(),
            ],
        },
    );
    langs
}

impl Settings {
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".codeloom/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed("CL_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("CL_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".codeloom");
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }
        None
    }

    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            if ancestor.join(".codeloom").is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }
        None
    }

    pub fn check_init() -> Result<(), String> {
        let config_path = match Self::find_workspace_config() {
            Some(path) => path,
            None => {
                return Err(
                    "No .codeloom directory found in current directory or any parent.\n\
                     Run 'codeloom init' to initialize this workspace."
                        .to_string(),
                )
            }
        };

        if !config_path.exists() {
            return Err(
                "No settings.toml found in .codeloom directory.\nRun 'codeloom init' to create one."
                    .to_string(),
            );
        }

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'codeloom init --force' to regenerate."
                    ));
                }
            }
            Err(e) => return Err(format!("Cannot read configuration file: {e}")),
        }

        Ok(())
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = PathBuf::from(".codeloom/settings.toml");
        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }
        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_match_spec_recognized_options() {
        let settings = Settings::default();
        assert_eq!(settings.indexing.nested_hoist_line_threshold, 300);
        assert_eq!(settings.embedding.chunk_lines, 20);
        assert_eq!(settings.embedding.embedding_dim, 384);
        assert_eq!(settings.embedding.inference_max_tokens, 256);
        assert_eq!(settings.query.default_query_limit, 100);
        assert!((settings.query.similarity_threshold - 0.20).abs() < f32::EPSILON);
    }

    #[test]
    fn load_from_toml_overrides_defaults_and_keeps_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(
            &config_path,
            r#"
[indexing]
nested_hoist_line_threshold = 150

[query]
default_query_limit = 25
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.indexing.nested_hoist_line_threshold, 150);
        assert_eq!(settings.query.default_query_limit, 25);
        assert_eq!(settings.embedding.chunk_lines, 20);
    }

    #[test]
    fn layered_env_override_beats_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config_dir = temp_dir.path().join(".codeloom");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("settings.toml"),
            "[indexing]\nnested_hoist_line_threshold = 150\n",
        )
        .unwrap();

        unsafe {
            std::env::set_var("CL_INDEXING__NESTED_HOIST_LINE_THRESHOLD", "99");
        }

        let settings = Settings::load().unwrap();
        assert_eq!(settings.indexing.nested_hoist_line_threshold, 99);

        unsafe {
            std::env::remove_var("CL_INDEXING__NESTED_HOIST_LINE_THRESHOLD");
        }
        std::env::set_current_dir(original_dir).unwrap();
    }
}
