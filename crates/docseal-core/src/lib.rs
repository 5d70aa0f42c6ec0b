//! docseal-core: shared types, configuration schema, and error types for the
//! document encryption subsystem.

pub mod config;
pub mod error;
pub mod types;

pub use config::DocsealConfig;
pub use error::{DocsealError, DocsealResult};
pub use types::{FileMetadata, UserAction};
