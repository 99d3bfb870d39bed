//! Common types for Soundclash
//!
//! Shared between the server binary and its tests: the tournament data
//! model, the error taxonomy, configuration, database initialization,
//! and voter fingerprinting.

pub mod config;
pub mod db;
pub mod error;
pub mod fingerprint;
pub mod models;

pub use error::{Error, Result};
