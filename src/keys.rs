//! Persistent client-side API key storage.
//!
//! The upload page reads two named entries saved by its settings dialog. This
//! module only ever reads them; an absent entry is an empty key.

use crate::error::KeyStoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entry holding the primary (OCR) API key.
pub const MISTRAL_KEY: &str = "mistral_api_key";

/// Entry holding the secondary (spelling-correction) API key.
pub const OPENAI_KEY: &str = "openai_api_key";

/// Read-only view of saved key entries.
pub trait KeyStore: Send + Sync {
    /// Look up an entry by name.
    fn get(&self, name: &str) -> Option<String>;

    /// Look up an entry, treating a missing one as the empty string.
    fn get_or_empty(&self, name: &str) -> String {
        self.get(name).unwrap_or_default()
    }
}

/// In-memory key store.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    entries: HashMap<String, String>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}

/// Key store loaded from a flat JSON object file, e.g.
/// `{"mistral_api_key": "...", "openai_api_key": "..."}`.
///
/// The file is read once on [`FileKeyStore::load`]. A missing file is an
/// empty store, matching a browser profile where nothing was saved yet.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
    inner: MemoryKeyStore,
}

impl FileKeyStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeyStoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<HashMap<String, String>>(&text).map_err(
                |source| KeyStoreError::Parse {
                    path: path.clone(),
                    source,
                },
            )?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Key store {} not found, using empty store", path.display());
                HashMap::new()
            }
            Err(source) => return Err(KeyStoreError::Read { path, source }),
        };
        debug!("Loaded {} key entries from {}", entries.len(), path.display());
        Ok(Self {
            path,
            inner: MemoryKeyStore { entries },
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyStore for FileKeyStore {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.get(name)
    }
}
