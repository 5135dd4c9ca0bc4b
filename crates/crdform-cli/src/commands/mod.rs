//! CLI commands

pub mod resources;
pub mod schema;

// Offline commands
pub mod render;
pub mod validate;

// State commands
pub mod apply;
pub mod destroy;
pub mod plan;
pub mod show;
