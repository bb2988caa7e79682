//! Settings file handling.

use anyhow::{Context, Result};
use shared::settings::ChatSettings;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "Local Chat", "LocalChat")
        .map(|proj| proj.config_dir().join("settings.json"))
}

/// Load settings from disk, falling back to defaults, then apply
/// environment overrides.
pub fn load_settings_or_default() -> ChatSettings {
    let mut settings = config_path()
        .and_then(|path| load_from(&path))
        .unwrap_or_default();
    apply_env_overrides(&mut settings, std::env::var("LOCAL_CHAT_MODELS_DIR").ok());
    settings
}

/// Read a settings file. Missing or malformed files yield `None`.
pub fn load_from(path: &Path) -> Option<ChatSettings> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<ChatSettings>(&contents) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
            None
        }
    }
}

fn apply_env_overrides(settings: &mut ChatSettings, models_dir: Option<String>) {
    if let Some(dir) = models_dir.filter(|d| !d.trim().is_empty()) {
        settings.models_dir = PathBuf::from(dir);
    }
}

/// Save settings to disk
pub fn save_settings(settings: &ChatSettings) {
    let Some(path) = config_path() else {
        return;
    };
    if let Err(e) = save_to(&path, settings) {
        tracing::warn!(path = %path.display(), error = %e, "could not save settings");
    }
}

pub fn save_to(path: &Path, settings: &ChatSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
