//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - configuration failed validation
pub const VALIDATION_ERROR: i32 = 2;

/// Schema error - configuration broke the resource schema contract
pub const SCHEMA_ERROR: i32 = 3;

/// State error - recorded state missing, conflicting or unreadable
pub const STATE_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
