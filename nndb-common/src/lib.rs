//! # NNDB Common Library
//!
//! Shared code for the NNDB tools including:
//! - Denormalized food document models
//! - Document store (SQLite) initialization and queries
//! - Configuration loading (CLI → ENV → TOML → defaults)
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::FoodDocument;
