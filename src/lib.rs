//! # Looker Toolbox - Admin Tool Plugins for Looker
//!
//! Declarative tools over a Looker instance, exposed to an invocation host:
//! - Kind registries mapping plugin kinds to config-decoding factories
//! - Strict decoding of named sources and tools from one YAML document
//! - Capability-based source resolution (no concrete-type coupling)
//! - Typed parameter schema, argument binding, and validation
//! - Execution and MCP manifests built once per tool
//! - An invocation pipeline with per-call credential selection and cancellation
//!
//! ## Architecture
//!
//! ```text
//!   toolbox.yaml ──► Registries ──► SourceConfig / ToolConfig
//!                                        │ initialize
//!                                        ▼
//!                     SourceRegistry ◄── resolve::<LookerHandle>
//!                                        │
//!   host request ──► invoke_tool ──► Tool ──► LookerApi (service or caller token)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use looker_toolbox::{Config, InvocationRequest, Registries, Toolbox, ToolboxFile};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> looker_toolbox::Result<()> {
//! let registries = Registries::builtin()?;
//! let file = ToolboxFile::load("toolbox.yaml").await?;
//! let toolbox = Toolbox::from_file(&registries, &file, &Config::default()).await?;
//!
//! let args = serde_json::json!({"name": "Admin"});
//! let request = InvocationRequest::new(args.as_object().cloned().unwrap_or_default());
//! let output = toolbox
//!     .invoke("search_roles", &request, &CancellationToken::new())
//!     .await?;
//! println!("{}", output.to_value());
//! # Ok(())
//! # }
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod looker;
pub mod parameters;
pub mod registry;
pub mod sources;
pub mod toolbox;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use registry::{KindRegistry, Registries, SourceKindRegistry, ToolKindRegistry};
pub use sources::{LookerHandle, Source, SourceRegistry};
pub use toolbox::Toolbox;
pub use tools::{AccessToken, InvocationRequest, Tool, ToolConfig, ToolOutput};
pub use types::{Config, Error, Result, ToolboxFile};
