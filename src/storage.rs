//! Key-value storage for saved progress, and the versioned JSON snapshots
//! written into it.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("storage i/o failed for `{key}`")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("snapshot for `{key}` is not valid JSON")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("snapshot for `{key}` has schema version {found}, expected {}", SCHEMA_VERSION)]
    Version { key: String, found: u32 },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
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

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // write next to the target then rename, so a crash never leaves half a snapshot
        let tmp = path.with_extension("json.tmp");
        let written = std::fs::write(&tmp, value).and_then(|()| std::fs::rename(&tmp, &path));
        if let Err(source) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(StorageError::Io {
                key: key.to_string(),
                source,
            });
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    state: T,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Reads and writes store snapshots. A backend failure switches to memory
/// for the rest of the session instead of surfacing to the player.
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
    degraded: bool,
}

impl Persistence {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Persistence {
            backend: Box::new(backend),
            degraded: false,
        }
    }

    pub fn in_memory() -> Self {
        Persistence::new(MemoryStorage::new())
    }

    /// True once a write failed and saves only live in memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_load(key) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    key,
                    error = %e,
                    source = ?std::error::Error::source(&e),
                    "ignoring saved progress"
                );
                None
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.backend.get(key)? else {
            debug!(key, "nothing saved");
            return Ok(None);
        };

        let json_err = |source| StorageError::Json {
            key: key.to_string(),
            source,
        };
        let header: VersionHeader = serde_json::from_str(&raw).map_err(json_err)?;
        if header.version != SCHEMA_VERSION {
            return Err(StorageError::Version {
                key: key.to_string(),
                found: header.version,
            });
        }
        let envelope: Envelope<T> = serde_json::from_str(&raw).map_err(json_err)?;
        Ok(Some(envelope.state))
    }

    pub fn save<T: Serialize>(&mut self, key: &str, state: &T) {
        let envelope = EnvelopeRef {
            version: SCHEMA_VERSION,
            state,
        };
        let json = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "could not serialize progress");
                return;
            }
        };

        if let Err(e) = self.backend.set(key, &json) {
            self.degrade(&e);
            let _ = self.backend.set(key, &json);
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            self.degrade(&e);
        }
    }

    fn degrade(&mut self, error: &StorageError) {
        warn!(
            error = %error,
            source = ?std::error::Error::source(error),
            "storage unavailable, progress will only last for this session"
        );
        self.backend = Box::new(MemoryStorage::new());
        self.degraded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl KeyValueStore for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "quota exceeded"),
            })
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.set(key, "")
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[test]
    fn save_then_load_through_envelope() {
        let mut persistence = Persistence::in_memory();
        persistence.save("counter", &Counter { value: 7 });

        assert_eq!(persistence.load::<Counter>("counter"), Some(Counter { value: 7 }));
        assert_eq!(persistence.load::<Counter>("missing"), None);
    }

    #[test]
    fn envelope_carries_schema_version() {
        let mut persistence = Persistence::in_memory();
        persistence.save("counter", &Counter { value: 1 });

        let raw = persistence.backend.get("counter").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert_eq!(value["state"]["value"], 1);

        let mut storage = MemoryStorage::new();
        storage.set("counter", "{\"version\": 99, \"state\": {\"value\": 3}}").unwrap();
        let persistence = Persistence::new(storage);
        assert_eq!(persistence.load::<Counter>("counter"), None);
    }

    #[test]
    fn corrupt_snapshot_loads_as_nothing() {
        let mut storage = MemoryStorage::new();
        storage.set("counter", "not json at all").unwrap();
        let persistence = Persistence::new(storage);

        assert_eq!(persistence.load::<Counter>("counter"), None);
    }

    #[test]
    fn failing_backend_degrades_to_memory() {
        let mut persistence = Persistence::new(BrokenStorage);
        assert!(!persistence.is_degraded());

        persistence.save("counter", &Counter { value: 4 });

        assert!(persistence.is_degraded());
        assert_eq!(persistence.load::<Counter>("counter"), Some(Counter { value: 4 }));
    }

    #[test]
    fn file_storage_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path().join("saves")).unwrap();

        assert_eq!(storage.get("nird-achievements").unwrap(), None);
        storage.set("nird-achievements", "{}").unwrap();
        assert_eq!(storage.get("nird-achievements").unwrap().as_deref(), Some("{}"));
        assert!(storage.dir().join("nird-achievements.json").exists());

        storage.remove("nird-achievements").unwrap();
        storage.remove("nird-achievements").unwrap();
        assert_eq!(storage.get("nird-achievements").unwrap(), None);
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        // a directory in the target's place makes the rename fail
        std::fs::create_dir(dir.path().join("nird-achievements.json")).unwrap();
        std::fs::write(dir.path().join("nird-achievements.json").join("keep"), "x").unwrap();

        assert!(matches!(
            storage.set("nird-achievements", "{}"),
            Err(StorageError::Io { .. })
        ));
        assert!(!dir.path().join("nird-achievements.json.tmp").exists());
    }

    #[test]
    fn file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert!(matches!(
            storage.set("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get(""), Err(StorageError::InvalidKey(_))));
    }
}
