// Key-value stores

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::StorageError;

/// String-keyed blob store
pub trait KeyValueStore {
    /// Read a value, `Ok(None)` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Read and deserialize a JSON value
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value
pub fn write_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let data = serde_json::to_string(value)?;
    store.set(key, &data)
}

/// In-memory store, used by tests and when no data directory is available
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a data directory
///
/// `metronome:presets` is stored as `metronome_presets.json`. Writes go to a
/// temporary file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Ok(self.root.join(format!("{}.json", file_name)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        log::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_basic() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_store_key_mapping() {
        let store = FileStore::new("/data");
        let path = store.path_for("metronome:presets").unwrap();
        assert_eq!(path, PathBuf::from("/data/metronome_presets.json"));
        assert!(store.path_for("").is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested");
        let mut store = FileStore::new(&root);

        assert_eq!(store.get("chords:settings").unwrap(), None);

        store.set("chords:settings", "{\"bpm\":90}").unwrap();
        assert!(root.join("chords_settings.json").exists());
        assert_eq!(
            store.get("chords:settings").unwrap().as_deref(),
            Some("{\"bpm\":90}")
        );

        store.remove("chords:settings").unwrap();
        assert_eq!(store.get("chords:settings").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();
        write_json(&mut store, "numbers", &vec![1, 2, 3]).unwrap();

        let numbers: Option<Vec<u32>> = read_json(&store, "numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = read_json(&store, "missing").unwrap();
        assert_eq!(missing, None);

        store.set("broken", "[1,").unwrap();
        assert!(read_json::<Vec<u32>>(&store, "broken").is_err());
    }
}
