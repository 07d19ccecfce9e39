//! Network and Client utilities
//!
//! This module provides HTTP client construction and retry/backoff helpers.

pub mod client;

// Re-export commonly used types and functions
pub use client::{ClientUtils, HttpClientConfig, RetryConfig};
