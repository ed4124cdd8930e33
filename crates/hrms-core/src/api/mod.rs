//! REST API client module for the HRMS backend.
//!
//! This module provides the `ApiClient` for listing, creating and deleting
//! employees, marking attendance and fetching dashboard statistics.
//!
//! GET responses are served through a read-through `ResponseCache`; every
//! mutating call drops the whole cache once it completes.

pub mod base_url;
pub mod client;
pub mod error;
pub mod request;

pub use base_url::normalize_base_url;
pub use client::{ApiClient, ApiResponse};
pub use error::ApiError;
pub use request::{ApiRequest, Payload, QueryParams};
