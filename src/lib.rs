//! Merge, validate and back up Star Citizen localization files.

pub mod backup;
pub mod config;
pub mod error;
pub mod game;
pub mod kv_store;
pub mod merge;
pub mod project;
pub mod report;
pub mod translation;
pub mod validation;

pub use error::{LocError, Result};
