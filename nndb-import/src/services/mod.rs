//! Import pipeline services

pub mod import_orchestrator;
pub mod joiner;
pub mod loader;

pub use import_orchestrator::{build_documents, import_directory, log_summary, verify_source_dir};
pub use joiner::{Joiner, Lookups};
pub use loader::{replace_collection, LoadOutcome};
