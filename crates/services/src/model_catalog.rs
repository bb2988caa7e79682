//! Discover selectable models in the models directory.
//!
//! Every subdirectory of the models directory is one selectable model.
//! Whether it is actually usable is decided when it is opened.

use std::fs;
use std::path::{Path, PathBuf};

/// Names of the model directories under `models_dir`, sorted.
///
/// A missing or unreadable directory yields an empty list.
pub fn available_models(models_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(models_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %models_dir.display(), error = %e, "models directory not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Path of the model called `name` inside `models_dir`.
pub fn model_path(models_dir: &Path, name: &str) -> PathBuf {
    models_dir.join(name)
}
