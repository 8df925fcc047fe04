//! Typed response envelopes.
//!
//! The backend is inconsistent about response shapes: some endpoints return
//! the payload object directly, others wrap it as `{ "success": ..,
//! "data": .. }`, and the metadata endpoint nests its payload under a
//! `metadata` key. Each shape is normalized here, once, so call sites never
//! branch on payload structure.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::models::PreviewMetadata;

/// A payload that could not be normalized.
#[derive(Error, Debug)]
pub(crate) enum EnvelopeError {
    /// The backend answered 2xx but flagged the request as failed.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// The body did not deserialize as any accepted shape.
    #[error("unexpected payload shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Decodes a body that is either a bare `T` or `{ "success", "data": T }`.
///
/// A `success: false` envelope becomes [`EnvelopeError::Rejected`] carrying
/// the backend's message.
pub(crate) fn decode_data_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, EnvelopeError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    if let Some(object) = value.as_object() {
        if object
            .get("success")
            .and_then(serde_json::Value::as_bool)
            == Some(false)
        {
            let message = object
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(EnvelopeError::Rejected(message));
        }
        if let Some(data) = object.get("data") {
            return Ok(serde_json::from_value(data.clone())?);
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Wire shape of the metadata endpoint response.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub metadata: Option<PreviewMetadata>,
    #[serde(default)]
    pub message: Option<String>,
}

impl MetadataEnvelope {
    /// Extracts the metadata payload, rejecting failed envelopes.
    pub fn into_metadata(self) -> Result<PreviewMetadata, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError::Rejected(
                self.message
                    .unwrap_or_else(|| "metadata request failed".to_string()),
            ));
        }
        self.metadata.ok_or_else(|| {
            EnvelopeError::Rejected("metadata field missing from response".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkRecordWire;

    const RECORD_JSON: &str = r#"{
        "shortCode": "abc123",
        "originalUrl": "https://example.com",
        "clicks": 3,
        "createdAt": "2025-06-01T12:00:00Z",
        "expiresAt": "2027-01-01T00:00:00Z",
        "isActive": true
    }"#;

    #[test]
    fn test_decodes_bare_record() {
        let wire: LinkRecordWire = decode_data_envelope(RECORD_JSON.as_bytes()).unwrap();
        assert_eq!(wire.short_code, "abc123");
        assert_eq!(wire.clicks, 3);
    }

    #[test]
    fn test_decodes_wrapped_record() {
        let body = format!(r#"{{"success": true, "data": {RECORD_JSON}}}"#);
        let wire: LinkRecordWire = decode_data_envelope(body.as_bytes()).unwrap();
        assert_eq!(wire.short_code, "abc123");
    }

    #[test]
    fn test_rejected_envelope_carries_message() {
        let body = br#"{"success": false, "message": "link quota exceeded"}"#;
        let err = decode_data_envelope::<LinkRecordWire>(body).unwrap_err();
        match err {
            EnvelopeError::Rejected(message) => assert_eq!(message, "link quota exceeded"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_envelope_without_message() {
        let body = br#"{"success": false}"#;
        let err = decode_data_envelope::<LinkRecordWire>(body).unwrap_err();
        assert!(matches!(err, EnvelopeError::Rejected(_)));
    }

    #[test]
    fn test_garbage_is_a_shape_error() {
        let err = decode_data_envelope::<LinkRecordWire>(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, EnvelopeError::Shape(_)));
    }

    #[test]
    fn test_metadata_envelope_success() {
        let body = r#"{
            "success": true,
            "metadata": {"title": "Example", "siteName": "example.com"}
        }"#;
        let envelope: MetadataEnvelope = serde_json::from_str(body).unwrap();
        let metadata = envelope.into_metadata().unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Example"));
        assert_eq!(metadata.site_name.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_metadata_envelope_failure() {
        let body = r#"{"success": false, "message": "fetch blocked"}"#;
        let envelope: MetadataEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.into_metadata().is_err());
    }

    #[test]
    fn test_metadata_envelope_success_without_payload() {
        let body = r#"{"success": true}"#;
        let envelope: MetadataEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.into_metadata().is_err());
    }
}
