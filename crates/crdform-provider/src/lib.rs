//! crdform Provider - manifest resources for an infrastructure host
//!
//! This crate provides:
//! - **Lifecycle**: create, read, update and delete per resource kind, plus plan and apply
//! - **Resource Catalog**: built-in and directory-loaded resource schemas keyed by type name
//! - **State Stores**: in-memory and file-backed persistence of rendered manifests
//! - **Diff Engine**: change detection between recorded and freshly rendered manifests
//! - **Freshness Markers**: injectable, monotonically increasing resource ids
//! - **Settings**: settings file and environment overrides

pub mod catalog;
pub mod clock;
pub mod diff;
pub mod error;
pub mod lifecycle;
pub mod settings;
pub mod state;
pub mod storage;

pub use catalog::ResourceCatalog;
pub use clock::{FreshnessMarker, IdSource, SequenceIds, SystemClock};
pub use diff::{DiffContent, DiffEngine, DiffLine, LineType, Plan};
pub use error::{ProviderError, Result};
pub use lifecycle::{Provider, ResourceHandle};
pub use settings::ProviderSettings;
pub use state::ResourceState;
pub use storage::{FileStore, MemoryStore, OperationCounts, StateStore};
