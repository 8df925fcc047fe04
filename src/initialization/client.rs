//! HTTP client initialization.
//!
//! This module provides functions to initialize the HTTP clients used
//! against the shortener backend.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, METADATA_TIMEOUT_SECS, TCP_CONNECT_TIMEOUT_SECS, USER_AGENT};

/// Initializes the HTTP client used for link resolution.
///
/// Creates a `reqwest::Client` configured with:
/// - Timeout from the session configuration
/// - TCP connect timeout so unreachable hosts fail fast
/// - A crate-identifying User-Agent header
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_resolve_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
}

/// Initializes the HTTP client used for metadata enrichment.
///
/// Carries a shorter timeout than the resolve client: enrichment is a
/// presentation upgrade, and a slow metadata fetch must never outlast the
/// countdown it decorates.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_metadata_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(METADATA_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
}
