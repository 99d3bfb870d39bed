//! HTTP API handlers for soundclash-server

pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod voting;

pub use error::{ApiError, ApiResult};
