use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const TASKS_KEY: &str = "todos";
pub const THEME_KEY: &str = "darkMode";

/// A durable slot per key holding UTF-8 text.
pub trait KeyValueBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    pub data_dir: PathBuf,
}

impl FileBackend {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "opened file backend");
        Ok(Self { data_dir })
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }
}

impl KeyValueBackend for FileBackend {
    #[tracing::instrument(skip(self))]
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.slot_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("failed reading {}", path.display())),
        }
    }

    #[tracing::instrument(skip(self, value))]
    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.slot_path(key);
        debug!(file = %path.display(), bytes = value.len(), "writing slot atomically");

        let mut temp = NamedTempFile::new_in(&self.data_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(&path)
            .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;
        Ok(())
    }
}

/// In-process slots. Clones share the same map, so a clone kept aside
/// survives dropping the stores that wrote through it.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slots: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.insert_raw(key, value);
        Ok(())
    }
}

/// JSON encode/decode on top of a [`KeyValueBackend`].
#[derive(Debug, Clone)]
pub struct PersistentStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> PersistentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Missing, unreadable and malformed slots all come back as `None`.
    #[tracing::instrument(skip(self))]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored value");
                return None;
            }
            Err(err) => {
                warn!(key, error = %format!("{err:#}"), "failed to read stored value; using default");
                return None;
            }
        };

        match serde_json::from_str(raw.trim()) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed stored value");
                None
            }
        }
    }

    #[tracing::instrument(skip(self, value))]
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> anyhow::Result<()> {
        let encoded = serde_json::to_string(value)
            .with_context(|| format!("failed to encode value for {key}"))?;
        self.backend
            .write(key, &encoded)
            .with_context(|| format!("failed to save {key}"))
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::{FileBackend, KeyValueBackend, MemoryBackend, PersistentStore};

    #[test]
    fn missing_key_loads_as_none() {
        let store = PersistentStore::new(MemoryBackend::new());
        assert_eq!(store.load::<bool>("darkMode"), None);
    }

    #[test]
    fn malformed_value_loads_as_none() {
        let backend = MemoryBackend::new();
        backend.insert_raw("darkMode", "{not json");
        backend.insert_raw("count", "\"seven\"");
        let store = PersistentStore::new(backend);
        assert_eq!(store.load::<bool>("darkMode"), None);
        assert_eq!(store.load::<u32>("count"), None);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let backend = MemoryBackend::new();
        let mut store = PersistentStore::new(backend.clone());
        store.save("darkMode", &true).expect("save true");
        store.save("darkMode", &false).expect("save false");
        assert_eq!(backend.raw("darkMode").as_deref(), Some("false"));
        assert_eq!(store.load::<bool>("darkMode"), Some(false));
    }

    #[test]
    fn file_backend_writes_one_file_per_key() {
        let temp = tempdir().expect("tempdir");
        let mut backend = FileBackend::open(&temp.path().join("data")).expect("open backend");
        assert_eq!(backend.read("todos").expect("read missing"), None);

        backend.write("todos", "[]").expect("write todos");
        assert!(backend.slot_path("todos").exists());
        assert_eq!(
            backend.read("todos").expect("read todos").as_deref(),
            Some("[]")
        );
    }
}
