//! Import data models

pub mod import_stats;

pub use import_stats::*;
