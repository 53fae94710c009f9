use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// A single indexed repository root.
///
/// `name` is unique. Re-running `init`/`index` against the same name but a
/// different path updates `path` in place rather than creating a duplicate
/// project row (the same path always resolves to the same project).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path: PathBuf,
    pub description: Option<String>,
}
