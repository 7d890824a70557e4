// src/config/mod.rs

//! Runtime configuration for the scheduler.
//!
//! - [`model`] defines [`SchedulerConfig`] and its defaults.
//! - [`loader`] reads an optional TOML file and validates the result.

pub mod loader;
pub mod model;

pub use loader::{load_from_path, load_or_default};
pub use model::SchedulerConfig;
