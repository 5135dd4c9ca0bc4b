//! File-based state store
//!
//! Stores one JSON document per resource address in a local directory. Useful for:
//! - Running the CLI without a host framework
//! - Inspecting recorded manifests by hand

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{StateStore, deserialize_state, serialize_state};
use crate::error::{ProviderError, Result};
use crate::state::ResourceState;

const STATE_EXTENSION: &str = "json";

/// File-based state store
pub struct FileStore {
    /// Base directory holding one file per address
    base_dir: PathBuf,
    /// Serializes check-then-write sequences
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a new file store, creating the directory if needed
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the state files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path for an address
    fn state_path(&self, address: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}", encode_address(address), STATE_EXTENSION))
    }

    /// Write a state to its file through a temporary sibling
    fn write_state(&self, state: &ResourceState) -> Result<()> {
        let path = self.state_path(&state.address);
        let tmp = path.with_extension("json.tmp");

        let data = serialize_state(state)?;
        if let Err(e) = std::fs::write(&tmp, data).and_then(|()| std::fs::rename(&tmp, &path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!(address = %state.address, path = %path.display(), "wrote state file");
        Ok(())
    }

    /// Read a state from file
    fn read_state(&self, path: &Path) -> Result<ResourceState> {
        let data = std::fs::read(path)?;
        deserialize_state(&data)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| ProviderError::Storage("state directory lock poisoned".to_string()))
    }

    fn not_found(address: &str) -> ProviderError {
        ProviderError::ResourceNotFound {
            address: address.to_string(),
        }
    }
}

impl StateStore for FileStore {
    fn get(&self, address: &str) -> Result<ResourceState> {
        let path = self.state_path(address);

        if !path.exists() {
            return Err(Self::not_found(address));
        }

        self.read_state(&path)
    }

    fn list(&self) -> Result<Vec<ResourceState>> {
        let files: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == STATE_EXTENSION).unwrap_or(false))
            .collect();

        let mut states = Vec::with_capacity(files.len());
        for file in files {
            match self.read_state(&file) {
                Ok(state) => states.push(state),
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "skipping unreadable state file")
                }
            }
        }

        states.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(states)
    }

    fn create(&self, state: &ResourceState) -> Result<()> {
        let _guard = self.lock()?;

        if self.state_path(&state.address).exists() {
            return Err(ProviderError::ResourceAlreadyExists {
                address: state.address.clone(),
            });
        }

        self.write_state(state)
    }

    fn update(&self, state: &ResourceState) -> Result<()> {
        let _guard = self.lock()?;

        if !self.state_path(&state.address).exists() {
            return Err(Self::not_found(&state.address));
        }

        self.write_state(state)
    }

    fn delete(&self, address: &str) -> Result<ResourceState> {
        let _guard = self.lock()?;

        let path = self.state_path(address);
        let state = self.get(address)?;
        std::fs::remove_file(&path)?;

        Ok(state)
    }
}

/// File-name-safe form of an address
///
/// Bytes outside `[A-Za-z0-9._-]` become `%XX`, so distinct addresses never
/// share a file.
fn encode_address(address: &str) -> String {
    let mut out = String::with_capacity(address.len());
    for byte in address.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => out.push(byte as char),
            // a leading dot would hide the file
            b'.' if !out.is_empty() => out.push('.'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::sample_state;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_create_and_get() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        let state = sample_state("k8s_config_map_v1_manifest.settings", 1);
        store.create(&state).unwrap();

        let retrieved = store.get("k8s_config_map_v1_manifest.settings").unwrap();
        assert_eq!(retrieved, state);
        assert!(
            tmp.path()
                .join("k8s_config_map_v1_manifest.settings.json")
                .exists()
        );
    }

    #[test]
    fn test_file_store_create_existing_fails() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        store.create(&sample_state("a", 1)).unwrap();
        let result = store.create(&sample_state("a", 2));
        assert!(matches!(
            result,
            Err(ProviderError::ResourceAlreadyExists { .. })
        ));
        assert_eq!(store.get("a").unwrap().id.value(), 1);
    }

    #[test]
    fn test_file_store_update() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        assert!(matches!(
            store.update(&sample_state("a", 1)),
            Err(ProviderError::ResourceNotFound { .. })
        ));

        store.create(&sample_state("a", 1)).unwrap();
        store.update(&sample_state("a", 5)).unwrap();
        assert_eq!(store.get("a").unwrap().id.value(), 5);
    }

    #[test]
    fn test_file_store_list_skips_corrupt_files() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        store.create(&sample_state("b", 1)).unwrap();
        store.create(&sample_state("a", 2)).unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let addresses: Vec<_> = store.list().unwrap().into_iter().map(|s| s.address).collect();
        assert_eq!(addresses, ["a", "b"]);
    }

    #[test]
    fn test_file_store_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        store.create(&sample_state("myapp", 1)).unwrap();
        let removed = store.delete("myapp").unwrap();
        assert_eq!(removed.address, "myapp");

        let result = store.get("myapp");
        assert!(matches!(result, Err(ProviderError::ResourceNotFound { .. })));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path()).unwrap();

        // a non-empty directory where the state file belongs blocks the rename
        let blocker = tmp.path().join("a.json");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        assert!(store.update(&sample_state("a", 1)).is_err());
        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["a.json"]);
    }

    #[test]
    fn test_encode_address() {
        assert_eq!(encode_address("k8s_x_v1_manifest.web"), "k8s_x_v1_manifest.web");
        assert_eq!(encode_address("a/b"), "a%2Fb");
        assert_eq!(encode_address(".hidden"), "%2Ehidden");
        assert_ne!(encode_address("a/b"), encode_address("a%2Fb"));
    }
}
