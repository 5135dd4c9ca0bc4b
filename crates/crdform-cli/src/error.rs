//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use crdform_core::CoreError;
use crdform_provider::ProviderError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration failed validation
    #[error("Validation failed: {message}")]
    #[diagnostic(code(crdform::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Configuration broke the schema contract or could not be assembled
    #[error("Schema error: {message}")]
    #[diagnostic(code(crdform::cli::schema))]
    Schema {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Recorded state is missing, conflicting or unreadable
    #[error("State error: {message}")]
    #[diagnostic(code(crdform::cli::state))]
    State {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Bad arguments, e.g. an unknown resource type
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::usage))]
    Usage {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdform::cli::io))]
    Io { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Schema { .. } => exit_codes::SCHEMA_ERROR,
            CliError::State { .. } => exit_codes::STATE_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Attach context to an IO error
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context, err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: format!("Failed to encode JSON: {}", err),
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Other {
            message: format!("Failed to encode YAML: {}", err),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::SchemaContractViolation { .. } => CliError::Schema {
                message,
                help: Some("Run `crdform validate` to list every problem".to_string()),
            },
            CoreError::AssemblyFailure { .. } => CliError::Schema {
                message,
                help: None,
            },
            CoreError::Yaml(_) | CoreError::Json(_) => CliError::validation(message),
            CoreError::Io(_) => CliError::Io { message },
            CoreError::InvalidSchema { .. } => CliError::Other { message },
        }
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err {
            ProviderError::Core(core) => core.into(),
            ProviderError::UnknownResourceType { .. } => CliError::Usage {
                message,
                help: Some("Run `crdform resources` to list available types".to_string()),
            },
            ProviderError::ResourceNotFound { .. } => CliError::State {
                message,
                help: Some("Run `crdform apply` to create it".to_string()),
            },
            ProviderError::ResourceAlreadyExists { .. }
            | ProviderError::TypeMismatch { .. }
            | ProviderError::Storage(_)
            | ProviderError::Serialization(_) => CliError::State {
                message,
                help: None,
            },
            ProviderError::Io(_) => CliError::Io { message },
            _ => CliError::Other { message },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
