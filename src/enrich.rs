//! Preview metadata enrichment.
//!
//! Fetches best-effort page metadata for a redirect target. Enrichment is a
//! presentation upgrade, not a correctness requirement: every failure mode
//! (unsupported target, timeout, non-2xx, malformed payload) degrades to a
//! preview synthesized from the target's hostname, so `enrich` always
//! produces a usable [`PreviewMetadata`] and never fails its caller.

use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use url::Url;

use crate::api::BackendClient;
use crate::error_handling::{
    categorize_metadata_error, InfoType, MetadataError, SessionStats, WarningType,
};
use crate::models::PreviewMetadata;

/// Produces preview metadata for a redirect target.
///
/// The controller depends on this trait rather than the concrete enricher,
/// which keeps the state machine drivable by test doubles.
pub trait EnrichPreview: Send + Sync + 'static {
    /// Fetches or synthesizes preview metadata for `target`. Infallible by
    /// contract; implementations fall back rather than error.
    fn enrich(&self, target: &Url) -> impl Future<Output = PreviewMetadata> + Send;
}

/// Backend-driven [`EnrichPreview`] implementation.
pub struct MetadataEnricher {
    client: Arc<BackendClient>,
    stats: Arc<SessionStats>,
}

impl MetadataEnricher {
    /// Creates an enricher over a backend client.
    pub fn new(client: Arc<BackendClient>, stats: Arc<SessionStats>) -> Self {
        MetadataEnricher { client, stats }
    }

    async fn try_enrich(&self, target: &Url) -> Result<PreviewMetadata, MetadataError> {
        // The resolver already validated the target, but enrichment accepts
        // URLs from any caller and re-checks before going to the network.
        match target.scheme() {
            "http" | "https" if target.host_str().is_some() => {}
            _ => return Err(MetadataError::UnsupportedTarget),
        }
        let metadata = self.client.fetch_metadata(target).await?.normalized();

        if metadata.title.is_none() {
            self.stats.increment_warning(WarningType::MissingPreviewTitle);
        }
        if metadata.description.is_none() {
            self.stats
                .increment_warning(WarningType::MissingPreviewDescription);
        }
        if metadata.image.is_none() {
            self.stats.increment_warning(WarningType::MissingPreviewImage);
        }
        Ok(metadata)
    }
}

impl EnrichPreview for MetadataEnricher {
    async fn enrich(&self, target: &Url) -> PreviewMetadata {
        match self.try_enrich(target).await {
            Ok(metadata) => {
                debug!("Enriched preview for {target}");
                metadata
            }
            Err(e) => {
                // Observability only; the redirect must not care.
                info!("Preview enrichment failed for {target}, using fallback: {e}");
                self.stats.increment_error(categorize_metadata_error(&e));
                self.stats.increment_info(InfoType::PreviewFellBack);
                PreviewMetadata::fallback_for(target)
            }
        }
    }
}
