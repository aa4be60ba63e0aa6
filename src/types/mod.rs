//! Core types for the toolbox.
//!
//! - **IDs**: Strongly-typed identifiers (InvocationId)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Process configuration and the toolbox document

mod config;
mod errors;
mod ids;

pub use config::{Config, HttpConfig, ObservabilityConfig, ToolboxFile};
pub use errors::{Error, Result};
pub use ids::InvocationId;
