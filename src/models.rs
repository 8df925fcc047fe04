//! Core data model: link records and preview metadata.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// A resolved short link.
///
/// Immutable within one resolution cycle. The target URL has already been
/// validated as an absolute http/https URL at the deserialization boundary;
/// a payload that fails that check never becomes a `LinkRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// The short code this record was resolved from
    pub short_code: String,
    /// The redirect target
    pub original_url: Url,
    /// Click count, informational only
    pub clicks: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiry timestamp; `None` means the link never expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the link is active
    pub is_active: bool,
}

impl LinkRecord {
    /// Whether the expiry timestamp is in the past.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| exp <= Utc::now()).unwrap_or(false)
    }

    /// Whether the record may be redirected to: active and not expired.
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

/// A record payload that failed boundary validation.
#[derive(Error, Debug)]
pub enum InvalidRecord {
    /// The target URL did not parse as an absolute URL.
    #[error("target URL is not a valid absolute URL: {0}")]
    BadTargetUrl(String),
    /// The target URL uses a scheme other than http/https.
    #[error("target URL has unsupported scheme: {0}")]
    UnsupportedScheme(String),
    /// The record carried no short code.
    #[error("record is missing its short code")]
    MissingShortCode,
}

/// Wire shape of a link record as the backend serves it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkRecordWire {
    pub short_code: String,
    pub original_url: String,
    #[serde(default)]
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl TryFrom<LinkRecordWire> for LinkRecord {
    type Error = InvalidRecord;

    fn try_from(wire: LinkRecordWire) -> Result<Self, Self::Error> {
        if wire.short_code.trim().is_empty() {
            return Err(InvalidRecord::MissingShortCode);
        }
        let original_url = Url::parse(&wire.original_url)
            .map_err(|_| InvalidRecord::BadTargetUrl(wire.original_url.clone()))?;
        match original_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(InvalidRecord::UnsupportedScheme(scheme.to_string())),
        }
        Ok(LinkRecord {
            short_code: wire.short_code,
            original_url,
            clicks: wire.clicks,
            created_at: wire.created_at,
            expires_at: wire.expires_at,
            is_active: wire.is_active,
        })
    }
}

/// Best-effort preview data for a redirect target.
///
/// Every field is optional; the enricher guarantees that *some* record is
/// always produced, synthesizing one from the target's hostname when the
/// metadata endpoint cannot deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewMetadata {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,
    /// Page description
    #[serde(default)]
    pub description: Option<String>,
    /// Preview image URL
    #[serde(default)]
    pub image: Option<String>,
    /// Site name
    #[serde(default)]
    pub site_name: Option<String>,
    /// Page keywords
    #[serde(default)]
    pub keywords: Option<String>,
}

impl PreviewMetadata {
    /// Synthesizes the fallback preview for a target URL: hostname as title
    /// and site name, with a generic redirect description.
    pub fn fallback_for(target: &Url) -> Self {
        let domain = display_domain(target);
        PreviewMetadata {
            title: Some(domain.clone()),
            description: Some(format!("Redirecting to {domain}")),
            image: None,
            site_name: Some(domain),
            keywords: None,
        }
    }

    /// Drops empty or whitespace-only fields so the view can rely on
    /// `Some` meaning displayable content.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        PreviewMetadata {
            title: keep(self.title),
            description: keep(self.description),
            image: keep(self.image),
            site_name: keep(self.site_name),
            keywords: keep(self.keywords),
        }
    }

    /// Whether this preview carries real page content rather than
    /// placeholder text.
    pub fn is_rich(&self) -> bool {
        let real = |value: &Option<String>, placeholder: &str| {
            value
                .as_deref()
                .map(|s| !s.is_empty() && s != placeholder)
                .unwrap_or(false)
        };
        real(&self.title, "No title available") && real(&self.description, "No description available")
    }
}

/// Extracts the display domain of a URL: hostname with a leading `www.`
/// stripped. Falls back to the full URL string for host-less URLs.
pub fn display_domain(url: &Url) -> String {
    match url.host_str() {
        Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
        None => url.to_string(),
    }
}
