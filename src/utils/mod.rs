//! Utility modules for the fleet monitor
//!
//! ## Module Organization
//!
//! - **error**: Error type and HTTP error mapping
//! - **logging**: Tracing subscriber setup
//! - **net**: HTTP client construction and retry/backoff helpers

pub mod error; // Error handling
pub mod logging;
pub mod net; // Network & client utilities

pub use error::{MonitorError, Result};
pub use net::{ClientUtils, HttpClientConfig, RetryConfig};

/// Check if a string is a valid http(s) URL
pub fn is_valid_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
