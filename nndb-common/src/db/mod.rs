//! Document store: SQLite tables holding denormalized food documents

pub mod documents;
pub mod init;
pub mod runs;

pub use documents::*;
pub use init::*;
pub use runs::*;
