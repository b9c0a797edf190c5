// Application configuration
// Passed explicitly to whatever needs it; nothing here is global.

use std::path::{Path, PathBuf};

use crate::storage::settings::{ThemeMode, load_theme};
use crate::storage::store::{FileStore, KeyValueStore};

pub const APP_DIR_NAME: &str = "beat_trainer";
pub const DATA_DIR_ENV: &str = "BEAT_TRAINER_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the key-value files
    pub data_dir: PathBuf,
    /// Play click sounds
    pub sound_enabled: bool,
    /// Emit haptic pulses
    pub haptics_enabled: bool,
    pub theme: ThemeMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            sound_enabled: true,
            haptics_enabled: true,
            theme: ThemeMode::default(),
        }
    }
}

impl AppConfig {
    /// Resolve the configuration
    ///
    /// The data directory comes from `data_dir` if given, then the
    /// `BEAT_TRAINER_DATA_DIR` variable, then the platform data directory.
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        Self {
            data_dir,
            ..Self::default()
        }
    }

    pub fn with_data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(&self.data_dir)
    }

    /// Pick up the persisted theme
    pub fn load_theme(&mut self, store: &dyn KeyValueStore) {
        self.theme = load_theme(store);
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(dir) => dir.join(APP_DIR_NAME),
        None => PathBuf::from(format!(".{}", APP_DIR_NAME)),
    }
}
