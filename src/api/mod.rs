//! Backend API client.
//!
//! One client owns both backend conversations: link resolution
//! (`GET links/{code}`) and metadata enrichment (`POST metadata`). Responses
//! are normalized through the typed envelopes in [`envelope`] and failures
//! are classified at this boundary, so callers never inspect raw statuses
//! or payload shapes.

mod envelope;

use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use crate::auth::{SessionEvents, SessionStore};
use crate::error_handling::{resolve_error_from_transport, MetadataError, ResolveError};
use crate::models::{LinkRecord, LinkRecordWire, PreviewMetadata};
use envelope::{decode_data_envelope, EnvelopeError, MetadataEnvelope};

/// HTTP client for the shortener backend.
pub struct BackendClient {
    resolve_http: reqwest::Client,
    metadata_http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
    events: SessionEvents,
}

impl BackendClient {
    /// Creates a client against `base_url`.
    ///
    /// `resolve_http` serves link resolution; `metadata_http` serves
    /// enrichment and is expected to carry the shorter timeout.
    pub fn new(
        resolve_http: reqwest::Client,
        metadata_http: reqwest::Client,
        mut base_url: Url,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        // Url::join treats a path without a trailing slash as a file and
        // would drop its last segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        BackendClient {
            resolve_http,
            metadata_http,
            base_url,
            session,
            events: SessionEvents::new(),
        }
    }

    /// Session invalidation subscriptions for this client.
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let context = self.session.current();
        match context.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Clears the stored session and announces the invalidation. Subsequent
    /// requests go out unauthenticated, which the public endpoints accept.
    fn note_unauthorized(&self) {
        warn!("Backend rejected the session token, clearing session");
        self.session.clear();
        self.events.emit_invalidated();
    }

    /// Fetches the link record for a short code.
    ///
    /// Classifies every failure: 404 is `NotFound`, 410 `Expired`, 403
    /// `Inactive`, 5xx and transport failures `Network`, anything else that
    /// cannot yield a usable record `Malformed`. Expired or inactive records
    /// that arrive with a 2xx body are returned as records; their flags tell
    /// the caller not to redirect.
    pub async fn fetch_link(&self, short_code: &str) -> Result<LinkRecord, ResolveError> {
        let url = self
            .base_url
            .join(&format!("links/{short_code}"))
            .map_err(|e| ResolveError::Malformed(format!("cannot build request URL: {e}")))?;
        debug!("Resolving short code {short_code} via {url}");

        let response = self
            .authorize(self.resolve_http.get(url))
            .send()
            .await
            .map_err(|e| resolve_error_from_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            let body = response
                .bytes()
                .await
                .map_err(|e| resolve_error_from_transport(&e))?;
            let wire: LinkRecordWire = decode_data_envelope(&body).map_err(|e| match e {
                EnvelopeError::Rejected(message) => ResolveError::Malformed(message),
                EnvelopeError::Shape(e) => ResolveError::Malformed(e.to_string()),
            })?;
            return LinkRecord::try_from(wire)
                .map_err(|e| ResolveError::Malformed(e.to_string()));
        }

        match status.as_u16() {
            404 => Err(ResolveError::NotFound),
            410 => Err(ResolveError::Expired),
            403 => Err(ResolveError::Inactive),
            401 => {
                self.note_unauthorized();
                Err(ResolveError::Network(
                    "backend rejected the session credentials (401)".to_string(),
                ))
            }
            429 => Err(ResolveError::Network("rate limited (429)".to_string())),
            _ if status.is_server_error() => Err(ResolveError::Network(format!(
                "backend error ({status})"
            ))),
            _ => Err(ResolveError::Malformed(format!(
                "unexpected status ({status})"
            ))),
        }
    }

    /// Fetches preview metadata for a redirect target.
    ///
    /// Errors here never reach users; the enricher logs them and substitutes
    /// the fallback preview.
    pub(crate) async fn fetch_metadata(
        &self,
        target: &Url,
    ) -> Result<PreviewMetadata, MetadataError> {
        let url = self
            .base_url
            .join("metadata")
            .map_err(|e| MetadataError::Malformed(format!("cannot build request URL: {e}")))?;
        debug!("Fetching metadata for {target}");

        let response = self
            .authorize(self.metadata_http.post(url))
            .json(&serde_json::json!({ "url": target.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            self.note_unauthorized();
            return Err(MetadataError::Backend(
                "backend rejected the session credentials (401)".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(MetadataError::Backend(format!("status {status}")));
        }

        let envelope: MetadataEnvelope = response
            .json()
            .await
            .map_err(MetadataError::Network)?;
        envelope
            .into_metadata()
            .map_err(|e| MetadataError::Backend(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    fn client_with_base(base: &str) -> BackendClient {
        BackendClient::new(
            reqwest::Client::new(),
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Arc::new(MemorySessionStore::default()),
        )
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let client = client_with_base("http://localhost:3000/api");
        assert_eq!(client.base_url.path(), "/api/");

        let joined = client.base_url.join("links/abc").unwrap();
        assert_eq!(joined.path(), "/api/links/abc");
    }

    #[test]
    fn test_base_url_with_trailing_slash_unchanged() {
        let client = client_with_base("http://localhost:3000/api/");
        assert_eq!(client.base_url.path(), "/api/");
    }
}
