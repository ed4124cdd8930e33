//! Core library for the HRMS Lite client.
//!
//! Provides the `ApiClient` for the HRMS REST backend together with its
//! in-memory response cache, typed models and configuration.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::ResponseCache;
pub use config::Config;
