//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured backend base URL is not a valid URL.
    #[error("Invalid backend base URL: {0}")]
    BaseUrlError(#[from] url::ParseError),
}

/// Classified failure of one link resolution.
///
/// Every failure mode of `GET /links/{code}` maps onto exactly one variant.
/// Only `Network` is retryable; the other classes describe a definitive
/// answer from the backend (or from input validation) and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The short code was empty, the literal `"undefined"`, or otherwise
    /// malformed. Raised before any network call is made.
    #[error("The short link code is missing or malformed")]
    InvalidShortCode,

    /// The backend has no link for this code.
    #[error("No link exists for this short code")]
    NotFound,

    /// The backend reported the link as expired (410 response with no
    /// parseable record body).
    #[error("This link has expired")]
    Expired,

    /// The backend reported the link as deactivated (403 response with no
    /// parseable record body).
    #[error("This link has been deactivated")]
    Inactive,

    /// The backend answered, but the payload did not describe a usable link
    /// record (missing fields, non-absolute target URL, unexpected shape).
    #[error("The link payload was malformed: {0}")]
    Malformed(String),

    /// Transport-level failure (timeout, connect error, 5xx). Retryable by
    /// resolving the same code again.
    #[error("The backend request failed: {0}")]
    Network(String),
}

impl ResolveError {
    /// Whether re-invoking `resolve` with the same code can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::Network(_))
    }
}

/// Failure of one metadata enrichment attempt.
///
/// Never surfaced to users; the enricher logs it and substitutes the
/// hostname-derived fallback preview.
#[derive(Error, Debug)]
pub(crate) enum MetadataError {
    /// The target URL is not fetchable (non-http scheme, no host).
    #[error("Target URL is not enrichable")]
    UnsupportedTarget,

    /// The metadata endpoint answered with a non-2xx status or a
    /// `success: false` envelope.
    #[error("Metadata endpoint rejected the request: {0}")]
    Backend(String),

    /// Transport-level failure reaching the metadata endpoint.
    #[error("Metadata request failed: {0}")]
    Network(#[from] ReqwestError),

    /// The metadata payload did not match the expected envelope.
    #[error("Metadata payload was malformed: {0}")]
    Malformed(String),
}

/// Types of errors that can occur during a redirect session.
///
/// This enum categorizes actual error conditions - failures that prevent the
/// session from reaching the redirect, plus enrichment failures tracked for
/// observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Resolution errors
    ShortCodeInvalid,
    LinkNotFound,
    LinkExpired,
    LinkInactive,
    LinkPayloadMalformed,
    ResolveNetworkError,
    // Enrichment errors (observability only, never user-visible)
    MetadataBackendError,
    MetadataNetworkError,
    MetadataPayloadMalformed,
}

/// Types of warnings that can occur during a redirect session.
///
/// Warnings indicate missing optional preview data that doesn't prevent the
/// redirect but is worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)] // All variants start with "Missing" by design
pub enum WarningType {
    MissingPreviewTitle,
    MissingPreviewDescription,
    MissingPreviewImage,
}

/// Types of informational metrics that can occur during a redirect session.
///
/// Info metrics track notable events that aren't errors or warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Navigation to the destination fired
    RedirectCompleted,
    /// The user cancelled before the redirect
    RedirectCancelled,
    /// The user confirmed the redirect before the countdown finished
    GoNowUsed,
    /// Enrichment completed and upgraded the preview in place
    PreviewUpgraded,
    /// Enrichment failed and the hostname-derived fallback was used
    PreviewFellBack,
    /// The user explicitly re-ran resolution after a network failure
    RetryRequested,
    /// The backend rejected the session token (401)
    SessionInvalidated,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ShortCodeInvalid => "Invalid short code",
            ErrorType::LinkNotFound => "Link not found",
            ErrorType::LinkExpired => "Link expired",
            ErrorType::LinkInactive => "Link inactive",
            ErrorType::LinkPayloadMalformed => "Malformed link payload",
            ErrorType::ResolveNetworkError => "Resolve network error",
            ErrorType::MetadataBackendError => "Metadata backend error",
            ErrorType::MetadataNetworkError => "Metadata network error",
            ErrorType::MetadataPayloadMalformed => "Malformed metadata payload",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingPreviewTitle => "Missing preview title",
            WarningType::MissingPreviewDescription => "Missing preview description",
            WarningType::MissingPreviewImage => "Missing preview image",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::RedirectCompleted => "Redirect completed",
            InfoType::RedirectCancelled => "Redirect cancelled",
            InfoType::GoNowUsed => "Go-now used",
            InfoType::PreviewUpgraded => "Preview upgraded",
            InfoType::PreviewFellBack => "Preview fell back",
            InfoType::RetryRequested => "Retry requested",
            InfoType::SessionInvalidated => "Session invalidated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(ErrorType::LinkNotFound.as_str(), "Link not found");
        assert_eq!(ErrorType::ShortCodeInvalid.as_str(), "Invalid short code");
        assert_eq!(
            ErrorType::ResolveNetworkError.as_str(),
            "Resolve network error"
        );
    }

    #[test]
    fn test_all_types_have_string_representation() {
        for error_type in ErrorType::iter() {
            assert!(
                !error_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                error_type
            );
        }
        for warning_type in WarningType::iter() {
            assert!(!warning_type.as_str().is_empty());
        }
        for info_type in InfoType::iter() {
            assert!(!info_type.as_str().is_empty());
        }
    }

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(ResolveError::Network("timeout".into()).is_retryable());
        assert!(!ResolveError::InvalidShortCode.is_retryable());
        assert!(!ResolveError::NotFound.is_retryable());
        assert!(!ResolveError::Expired.is_retryable());
        assert!(!ResolveError::Inactive.is_retryable());
        assert!(!ResolveError::Malformed("oops".into()).is_retryable());
    }

    #[test]
    fn test_resolve_error_messages_are_presentable() {
        // These strings are shown verbatim on the failure view.
        assert_eq!(
            ResolveError::NotFound.to_string(),
            "No link exists for this short code"
        );
        assert_eq!(ResolveError::Expired.to_string(), "This link has expired");
        assert_eq!(
            ResolveError::Inactive.to_string(),
            "This link has been deactivated"
        );
    }
}
