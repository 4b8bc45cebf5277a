//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{cmp_ignore_case, digits_only, format_phone, non_empty, normalize_header, truncate_string};
