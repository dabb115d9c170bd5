use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use crate::core::state::AppState;
use crate::error::Result;

/// Key the whole application state is stored under.
pub const STORAGE_KEY: &str = "randomizer_pro_data_v3";

/// Durable string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // Temp file first, then renamed over the old blob.
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read the persisted state. Missing or unreadable data falls back to defaults;
/// the calendar list is always present afterwards.
pub fn load_state(store: &dyn KeyValueStore) -> AppState {
    let mut state = match store.get(STORAGE_KEY) {
        Ok(Some(content)) => match serde_json::from_str::<AppState>(&content) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Failed to parse saved state, using defaults: {}", e);
                AppState::default()
            }
        },
        Ok(None) => {
            log::info!("No saved state found, starting fresh");
            AppState::default()
        }
        Err(e) => {
            log::error!("Failed to read saved state, using defaults: {}", e);
            AppState::default()
        }
    };
    state.ensure_calendar(Utc::now());
    state
}

pub fn save_state(store: &dyn KeyValueStore, state: &AppState) {
    match serde_json::to_string(state) {
        Ok(json) => {
            if let Err(e) = store.set(STORAGE_KEY, &json) {
                log::error!("Failed to save state: {}", e);
            }
        }
        Err(e) => log::error!("Failed to serialize state: {}", e),
    }
}
