//! Link resolution.
//!
//! Turns a short code into a [`LinkRecord`] via the backend, classifying
//! every failure per the taxonomy in [`ResolveError`]. Transient transport
//! failures are retried with bounded exponential backoff inside one
//! `resolve` call; classified backend answers are returned as-is and never
//! retried here.

use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use tokio_retry::RetryIf;

use crate::api::BackendClient;
use crate::config::MAX_SHORT_CODE_LENGTH;
use crate::error_handling::{
    categorize_resolve_error, retry_strategy, ResolveError, SessionStats,
};
use crate::models::LinkRecord;

/// Resolves short codes into link records.
///
/// The controller depends on this trait rather than the concrete resolver,
/// which keeps the state machine drivable by test doubles.
pub trait ResolveLink: Send + Sync + 'static {
    /// Resolves `short_code` into a link record or a classified failure.
    fn resolve(
        &self,
        short_code: &str,
    ) -> impl Future<Output = Result<LinkRecord, ResolveError>> + Send;
}

/// Checks that a short code is plausible before any network call.
///
/// Rejects empty codes, the literal `"undefined"` (an unresolved route
/// parameter leaking through the host's router), embedded whitespace, and
/// absurd lengths.
pub fn is_valid_short_code(short_code: &str) -> bool {
    let trimmed = short_code.trim();
    !trimmed.is_empty()
        && trimmed != "undefined"
        && trimmed.len() <= MAX_SHORT_CODE_LENGTH
        && !trimmed.chars().any(char::is_whitespace)
}

/// Backend-driven [`ResolveLink`] implementation.
pub struct LinkResolver {
    client: Arc<BackendClient>,
    stats: Arc<SessionStats>,
}

impl LinkResolver {
    /// Creates a resolver over a backend client.
    pub fn new(client: Arc<BackendClient>, stats: Arc<SessionStats>) -> Self {
        LinkResolver { client, stats }
    }
}

impl ResolveLink for LinkResolver {
    async fn resolve(&self, short_code: &str) -> Result<LinkRecord, ResolveError> {
        if !is_valid_short_code(short_code) {
            warn!("Refusing to resolve invalid short code {short_code:?}");
            self.stats
                .increment_error(categorize_resolve_error(&ResolveError::InvalidShortCode));
            return Err(ResolveError::InvalidShortCode);
        }
        let short_code = short_code.trim();

        let result = RetryIf::spawn(
            retry_strategy(),
            || async {
                let result = self.client.fetch_link(short_code).await;
                if let Err(ref e) = result {
                    if e.is_retryable() {
                        debug!("Transient failure resolving {short_code}: {e}");
                    }
                }
                result
            },
            |e: &ResolveError| e.is_retryable(),
        )
        .await;

        match result {
            Ok(record) => {
                debug!(
                    "Resolved {short_code} to {} (active: {}, expired: {})",
                    record.original_url,
                    record.is_active,
                    record.is_expired()
                );
                Ok(record)
            }
            Err(e) => {
                warn!("Failed to resolve {short_code}: {e}");
                self.stats.increment_error(categorize_resolve_error(&e));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_short_code;

    #[test]
    fn test_rejects_empty_and_undefined() {
        assert!(!is_valid_short_code(""));
        assert!(!is_valid_short_code("   "));
        assert!(!is_valid_short_code("undefined"));
        assert!(!is_valid_short_code(" undefined "));
    }

    #[test]
    fn test_rejects_whitespace_and_oversized_codes() {
        assert!(!is_valid_short_code("abc 123"));
        assert!(!is_valid_short_code("abc\t123"));
        assert!(!is_valid_short_code(&"a".repeat(129)));
        assert!(is_valid_short_code(&"a".repeat(128)));
    }

    #[test]
    fn test_accepts_typical_codes() {
        assert!(is_valid_short_code("abc123"));
        assert!(is_valid_short_code("my-custom_alias"));
        assert!(is_valid_short_code("Z"));
    }

    // Property-based tests using proptest
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_alphanumeric_codes_always_validate(code in "[a-zA-Z0-9_-]{1,64}") {
            // "undefined" is alphanumeric but deliberately rejected
            if code != "undefined" {
                prop_assert!(is_valid_short_code(&code));
            }
        }

        #[test]
        fn test_validation_never_panics(code in "\\PC{0,200}") {
            let _ = is_valid_short_code(&code);
        }
    }
}
