//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including timeouts, retry parameters, and countdown defaults.

use std::time::Duration;

/// Default backend API base URL.
///
/// Matches the local development setup of the shortener backend. Overridable
/// via the `--api-url` CLI flag.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default countdown duration in seconds before the redirect fires.
///
/// The countdown is configurable per session (`--countdown`); this is only
/// the default. Different hosts embed the view with different durations.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// Interval between countdown ticks.
///
/// One decrement per tick. Integration tests shrink this to run countdowns
/// in milliseconds.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

// Network operation timeouts
/// Per-request timeout in seconds for link resolution
pub const RESOLVE_TIMEOUT_SECS: u64 = 10;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Per-request timeout in seconds for metadata enrichment.
/// Kept short so a slow metadata fetch can never stall the countdown;
/// on expiry the enricher falls back to the hostname-derived preview.
pub const METADATA_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted short-code length.
/// Codes beyond this are rejected before any network call.
pub const MAX_SHORT_CODE_LENGTH: usize = 128;

// Retry strategy (transport-level failures within one resolve call)
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Maximum number of attempts (initial attempt + retries)
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// User-Agent header sent on all backend requests.
pub const USER_AGENT: &str = concat!("shortlink_gate/", env!("CARGO_PKG_VERSION"));
