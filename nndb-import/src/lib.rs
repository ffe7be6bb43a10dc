//! nndb-import library interface
//!
//! Reads the SR27 ASCII distribution and loads it into the document store
//! as one denormalized document per food.

pub mod error;
pub mod models;
pub mod readers;
pub mod services;

pub use crate::error::{ImportError, ImportResult};
