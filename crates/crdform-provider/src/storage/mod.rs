//! State stores for recorded resources
//!
//! The lifecycle operations record their result through a [`StateStore`]:
//! - **Memory**: in-process map with operation counting, for tests and embedding
//! - **File**: one JSON document per address in a local directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryStore, OperationCounts};

use crate::error::{ProviderError, Result};
use crate::state::ResourceState;

/// Persistence for resource state, keyed by address
///
/// Implementations must be Send + Sync; concurrent writes to the same address
/// are serialized by the store.
pub trait StateStore: Send + Sync {
    /// Get the state recorded at an address
    fn get(&self, address: &str) -> Result<ResourceState>;

    /// List all recorded states, ordered by address
    fn list(&self) -> Result<Vec<ResourceState>>;

    /// Record a new state; fails if the address is taken
    fn create(&self, state: &ResourceState) -> Result<()>;

    /// Replace an existing state; fails if the address is unknown
    fn update(&self, state: &ResourceState) -> Result<()>;

    /// Remove the state at an address, returning it
    fn delete(&self, address: &str) -> Result<ResourceState>;

    /// Check if an address has recorded state
    fn exists(&self, address: &str) -> Result<bool> {
        match self.get(address) {
            Ok(_) => Ok(true),
            Err(ProviderError::ResourceNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Serialize a state to JSON bytes
#[must_use = "serialization result should be used"]
pub fn serialize_state(state: &ResourceState) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(state).map_err(|e| ProviderError::Serialization(e.to_string()))
}

/// Deserialize a state from JSON bytes
#[must_use = "deserialization result should be used"]
pub fn deserialize_state(data: &[u8]) -> Result<ResourceState> {
    serde_json::from_slice(data).map_err(|e| ProviderError::Serialization(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::Utc;

    use crate::clock::FreshnessMarker;
    use crate::state::ResourceState;

    pub fn sample_state(address: &str, id: i64) -> ResourceState {
        let now = Utc::now();
        ResourceState {
            address: address.to_string(),
            id: FreshnessMarker::new(id),
            type_name: "k8s_config_map_v1_manifest".to_string(),
            kind: "ConfigMap".to_string(),
            api_version: "v1".to_string(),
            yaml: format!("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: {}\n", id),
            digest: String::new(),
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::sample_state;
    use super::*;

    #[test]
    fn test_serialize_deserialize_state() {
        let state = sample_state("k8s_config_map_v1_manifest.a", 3);
        let bytes = serialize_state(&state).unwrap();
        let back = deserialize_state(&bytes).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_deserialize_garbage() {
        let err = deserialize_state(b"not json").unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }

    #[test]
    fn test_exists_default() {
        let store = MemoryStore::new();
        assert!(!store.exists("x").unwrap());
        store.create(&sample_state("x", 1)).unwrap();
        assert!(store.exists("x").unwrap());
    }
}
