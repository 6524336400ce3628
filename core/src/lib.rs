//! Root of the `statdesk-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output belongs to the CLI layer or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
mod fsio;
pub mod ident;
pub mod record;
pub mod registry;
pub mod templates;

pub use config::ConfigStore;
pub use error::Result;
pub use error::StatdeskError;
pub use record::ProjectRecord;
pub use record::RecordPatch;
pub use registry::CompleteOptions;
pub use registry::CompleteOutcome;
pub use registry::CreateOutcome;
pub use registry::NewProject;
pub use registry::RegistryStore;
pub use registry::UpdateOptions;
pub use registry::UpdateOutcome;
pub use registry::compile::RegistryCompiler;
pub use registry::compile::RegistryTable;
pub use templates::TemplateMeta;
