use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: u64 = 1;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("picklist")
}

fn default_suggestion_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_suggestion_count() -> usize {
    10
}

/// Launcher configuration. Everything the user can change from the settings
/// screen lives in the persisted state instead.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PicklistConfig {
    pub version: u64,
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    pub suggestion_model: String,
    pub suggestion_count: usize,
}

impl Default for PicklistConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_directory: default_data_dir(),
            debug_logging: false,
            suggestion_model: default_suggestion_model(),
            suggestion_count: default_suggestion_count(),
        }
    }
}

impl PicklistConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("picklist")
            .join("config.json")
    }

    /// Load from `path`, falling back to defaults when missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Ensure the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PicklistConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config, PicklistConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"debug_logging":true}"#).unwrap();
        let config = PicklistConfig::load(&path);
        assert!(config.debug_logging);
        assert_eq!(config.suggestion_count, 10);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = PicklistConfig {
            suggestion_count: 5,
            ..PicklistConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(PicklistConfig::load(&path), config);
    }
}
