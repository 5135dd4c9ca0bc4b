//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The runtime shape of a value does not match its declared schema shape
    #[error("schema contract violation at '{path}': {message}")]
    SchemaContractViolation { path: String, message: String },

    /// The document cannot be represented in the manifest encoding
    #[error("cannot assemble manifest at '{path}': {message}")]
    AssemblyFailure { path: String, message: String },

    #[error("Invalid schema descriptor: {message}")]
    InvalidSchema { message: String },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn violation(path: impl ToString, message: impl Into<String>) -> Self {
        Self::SchemaContractViolation {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn assembly(path: impl ToString, message: impl Into<String>) -> Self {
        Self::AssemblyFailure {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error is a schema contract violation
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::SchemaContractViolation { .. })
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
