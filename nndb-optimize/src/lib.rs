//! # nndb-optimize
//!
//! Chooses foods from an imported nutrient collection and searches for
//! small combinations of them that meet adult micronutrient targets
//! without exceeding upper limits.

pub mod engine;
pub mod error;
pub mod micros;
pub mod report;
pub mod runner;
pub mod selector;

pub use engine::{GaParams, Instance, OptEngine, ScoredSolution};
pub use error::{OptimizeError, OptimizeResult};
pub use selector::FoodCriteria;
