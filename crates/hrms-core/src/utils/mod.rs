//! Utility functions for table output and client-side pagination.

pub mod format;
pub mod pagination;

// Re-export commonly used functions at module level
pub use format::{format_optional, truncate};
pub use pagination::{page_numbers, paginate, Page, PageMarker};
