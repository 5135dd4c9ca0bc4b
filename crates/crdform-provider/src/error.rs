//! Error types for crdform-provider

use crdform_core::CoreError;
use thiserror::Error;

/// Result type for crdform-provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during resource lifecycle operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// Mapping or assembly failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// No schema is registered under this type name
    #[error("unknown resource type '{type_name}'")]
    UnknownResourceType { type_name: String },

    /// Two descriptors claim the same type name
    #[error("resource type '{type_name}' is registered twice")]
    DuplicateResourceType { type_name: String },

    /// No state is recorded at this address
    #[error("resource '{address}' not found")]
    ResourceNotFound { address: String },

    /// State already exists at this address
    #[error("resource '{address}' already exists")]
    ResourceAlreadyExists { address: String },

    /// The address is recorded under a different resource type
    #[error("resource '{address}' is a {stored}, not a {requested}")]
    TypeMismatch {
        address: String,
        stored: String,
        requested: String,
    },

    /// Storage error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProviderError {
    /// Whether the caller's configuration broke the schema contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_contract_violation())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for ProviderError {
    fn from(e: serde_yaml::Error) -> Self {
        ProviderError::Serialization(e.to_string())
    }
}
