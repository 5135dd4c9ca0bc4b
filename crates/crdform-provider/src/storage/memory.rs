//! In-memory state store
//!
//! Keeps state in a map behind a lock. Operation counts let tests assert
//! which lifecycle operations touched the store.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::StateStore;
use crate::error::{ProviderError, Result};
use crate::state::ResourceState;

/// In-memory state store
#[derive(Clone, Default)]
pub struct MemoryStore {
    /// Storage: address -> state
    store: Arc<RwLock<BTreeMap<String, ResourceState>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub lists: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl OperationCounts {
    /// Number of operations that changed the store
    pub fn writes(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated states
    pub fn with_states(states: Vec<ResourceState>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.store.write() {
            for state in states {
                map.insert(state.address.clone(), state);
            }
        }
        store
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .map(|ops| ops.clone())
            .unwrap_or_default()
    }

    /// Reset operation counts
    pub fn reset_counts(&self) {
        if let Ok(mut ops) = self.operations.write() {
            *ops = OperationCounts::default();
        }
    }

    /// Count recorded states
    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count(&self, f: impl FnOnce(&mut OperationCounts)) {
        if let Ok(mut ops) = self.operations.write() {
            f(&mut ops);
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, ResourceState>>> {
        self.store
            .read()
            .map_err(|_| ProviderError::Storage("state lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, ResourceState>>> {
        self.store
            .write()
            .map_err(|_| ProviderError::Storage("state lock poisoned".to_string()))
    }
}

impl StateStore for MemoryStore {
    fn get(&self, address: &str) -> Result<ResourceState> {
        self.count(|ops| ops.gets += 1);
        self.read()?
            .get(address)
            .cloned()
            .ok_or_else(|| ProviderError::ResourceNotFound {
                address: address.to_string(),
            })
    }

    fn list(&self) -> Result<Vec<ResourceState>> {
        self.count(|ops| ops.lists += 1);
        Ok(self.read()?.values().cloned().collect())
    }

    fn create(&self, state: &ResourceState) -> Result<()> {
        self.count(|ops| ops.creates += 1);
        let mut store = self.write()?;
        if store.contains_key(&state.address) {
            return Err(ProviderError::ResourceAlreadyExists {
                address: state.address.clone(),
            });
        }
        store.insert(state.address.clone(), state.clone());
        Ok(())
    }

    fn update(&self, state: &ResourceState) -> Result<()> {
        self.count(|ops| ops.updates += 1);
        let mut store = self.write()?;
        match store.get_mut(&state.address) {
            Some(existing) => {
                *existing = state.clone();
                Ok(())
            }
            None => Err(ProviderError::ResourceNotFound {
                address: state.address.clone(),
            }),
        }
    }

    fn delete(&self, address: &str) -> Result<ResourceState> {
        self.count(|ops| ops.deletes += 1);
        self.write()?
            .remove(address)
            .ok_or_else(|| ProviderError::ResourceNotFound {
                address: address.to_string(),
            })
    }
}
