//! Direct ONNX MiniLM-class inference via `ort` + `tokenizers`, loaded from
//! a local model directory.
//!
//! Follows an embedding-provider shape (a model handle plus an
//! `embed`/`embed_batch` entry point) generalized away from `fastembed`'s
//! HF-Hub-downloading wrapper: this crate loads `<model_dir>/model.onnx` +
//! `<model_dir>/tokenizer.json` directly and never reaches the network.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tokenizers::Tokenizer;

use crate::error::{EmbeddingError, EmbeddingResult};

pub struct EmbeddingModel {
    session: Session,
    tokenizer: Tokenizer,
    max_tokens: usize,
    dimension: usize,
}

impl EmbeddingModel {
    /// Both files must already exist; a missing tokenizer or model is a
    /// fatal startup error, never a fallback to hashing-based tokenization.
    pub fn load(model_dir: &Path, max_tokens: usize, dimension: usize) -> EmbeddingResult<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        if !model_path.exists() {
            return Err(EmbeddingError::ModelLoad {
                path: model_path,
                reason: "model.onnx not found in model directory".to_string(),
            });
        }
        if !tokenizer_path.exists() {
            return Err(EmbeddingError::TokenizerLoad {
                path: tokenizer_path,
                reason: "tokenizer.json not found in model directory".to_string(),
            });
        }

        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| EmbeddingError::TokenizerLoad {
            path: tokenizer_path.clone(),
            reason: e.to_string(),
        })?;

        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(&model_path))
            .map_err(|e| EmbeddingError::ModelLoad {
                path: model_path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            session,
            tokenizer,
            max_tokens,
            dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Tokenizes with 256-token truncation, right-pads the batch to its
    /// longest sequence, runs one forward pass, and mean-pools the last
    /// hidden state using the attention mask.
    pub fn embed_batch(&mut self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings: Vec<_> = texts
            .iter()
            .map(|text| self.tokenizer.encode(text.as_str(), true))
            .collect::<Result<_, _>>()
            .map_err(|e| EmbeddingError::InferenceFailed {
                batch_size: texts.len(),
                reason: format!("tokenization failed: {e}"),
            })?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len().min(self.max_tokens))
            .max()
            .unwrap_or(1)
            .max(1);
        let batch = encodings.len();

        let mut input_ids = Array2::<i64>::zeros((batch, seq_len));
        let mut attention_mask = Array2::<i64>::zeros((batch, seq_len));
        for (row, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let len = ids.len().min(self.max_tokens).min(seq_len);
            for col in 0..len {
                input_ids[[row, col]] = ids[col] as i64;
                attention_mask[[row, col]] = mask[col] as i64;
            }
        }

        let input_ids_value = Value::from_array(input_ids).map_err(|e| EmbeddingError::InferenceFailed {
            batch_size: texts.len(),
            reason: e.to_string(),
        })?;
        let attention_mask_value = Value::from_array(attention_mask.clone()).map_err(|e| EmbeddingError::InferenceFailed {
            batch_size: texts.len(),
            reason: e.to_string(),
        })?;

        let outputs = self
            .session
            .run(ort::inputs![
                "input_ids" => input_ids_value,
                "attention_mask" => attention_mask_value,
            ])
            .map_err(|e| EmbeddingError::InferenceFailed {
                batch_size: texts.len(),
                reason: e.to_string(),
            })?;

        let (shape, data) = outputs[0]
            .try_extract_raw_tensor::<f32>()
            .map_err(|e| EmbeddingError::InferenceFailed {
                batch_size: texts.len(),
                reason: e.to_string(),
            })?;
        let hidden = shape[2] as usize;

        let mut results = Vec::with_capacity(batch);
        for row in 0..batch {
            let mut pooled = vec![0f32; hidden];
            let mut mask_sum = 0f32;
            for col in 0..seq_len {
                let mask_value = attention_mask[[row, col]] as f32;
                if mask_value == 0.0 {
                    continue;
                }
                mask_sum += mask_value;
                let base = (row * seq_len + col) * hidden;
                for h in 0..hidden {
                    pooled[h] += data[base + h] * mask_value;
                }
            }
            if mask_sum > 0.0 {
                for v in pooled.iter_mut() {
                    *v /= mask_sum;
                }
            }
            pooled.truncate(self.dimension);
            results.push(pooled);
        }
        Ok(results)
    }
}

pub fn model_dir_is_complete(model_dir: &Path) -> bool {
    model_dir.join("model.onnx").exists() && model_dir.join("tokenizer.json").exists()
}

pub fn missing_model_file(model_dir: &Path) -> Option<PathBuf> {
    let model_path = model_dir.join("model.onnx");
    if !model_path.exists() {
        return Some(model_path);
    }
    let tokenizer_path = model_dir.join("tokenizer.json");
    if !tokenizer_path.exists() {
        return Some(tokenizer_path);
    }
    None
}
