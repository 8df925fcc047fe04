//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize errors and configure retry strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, ResolveError};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum attempts: `RETRY_MAX_ATTEMPTS` (prevents infinite retries)
///
/// Used for transport-level failures within one `resolve` call. Classified
/// backend answers (not found, expired, inactive) are never retried.
pub fn retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS - 1) // retries after the initial attempt
}

/// Categorizes a transport-level `reqwest::Error` into a `ResolveError`.
///
/// Only called for errors raised before a classified HTTP status was read
/// (timeouts, connect failures, body/decode errors). Status-code
/// classification happens at the response site, where the status is known.
pub fn resolve_error_from_transport(error: &reqwest::Error) -> ResolveError {
    let detail = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    ResolveError::Network(detail)
}

/// Maps a `ResolveError` onto the statistics counter it should increment.
pub fn categorize_resolve_error(error: &ResolveError) -> ErrorType {
    match error {
        ResolveError::InvalidShortCode => ErrorType::ShortCodeInvalid,
        ResolveError::NotFound => ErrorType::LinkNotFound,
        ResolveError::Expired => ErrorType::LinkExpired,
        ResolveError::Inactive => ErrorType::LinkInactive,
        ResolveError::Malformed(_) => ErrorType::LinkPayloadMalformed,
        ResolveError::Network(_) => ErrorType::ResolveNetworkError,
    }
}

/// Maps a `MetadataError` onto the statistics counter it should increment.
pub(crate) fn categorize_metadata_error(error: &super::types::MetadataError) -> ErrorType {
    use super::types::MetadataError;
    match error {
        MetadataError::UnsupportedTarget | MetadataError::Malformed(_) => {
            ErrorType::MetadataPayloadMalformed
        }
        MetadataError::Backend(_) => ErrorType::MetadataBackendError,
        MetadataError::Network(_) => ErrorType::MetadataNetworkError,
    }
}
