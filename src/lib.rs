//! shortlink_gate library: the redirect/preview flow of a link shortener.
//!
//! This library resolves a short code against a shortener backend, enriches
//! the destination with best-effort preview metadata, and runs a countdown
//! that ends in exactly one navigation to the destination. The three pieces
//! compose as an explicit state machine (`Loading` to `Ready` to
//! `Redirecting` or `Failed`) that hosts observe through a `watch` channel
//! and steer through commands (go-now, cancel, retry).
//!
//! # Example
//!
//! ```no_run
//! use shortlink_gate::{run_redirect, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     short_code: "abc123".into(),
//!     countdown_secs: 5,
//!     ..Default::default()
//! };
//!
//! let report = run_redirect(config).await?;
//! println!("Session over after {:.1}s", report.elapsed_seconds);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod api;
pub mod app;
mod auth;
pub mod config;
mod enrich;
mod error_handling;
pub mod initialization;
mod models;
mod redirect;
mod resolver;

// Re-export public API
pub use api::BackendClient;
pub use auth::{MemorySessionStore, SessionContext, SessionEvents, SessionStore};
pub use config::{Config, LogFormat, LogLevel};
pub use enrich::{EnrichPreview, MetadataEnricher};
pub use error_handling::{
    ErrorType, InfoType, InitializationError, ResolveError, SessionStats, WarningType,
};
pub use models::{display_domain, LinkRecord, PreviewMetadata};
pub use redirect::{
    Command, FailureKind, Hooks, Navigate, RedirectConfig, RedirectController, RedirectPhase,
    SessionFailure, SessionSnapshot,
};
pub use resolver::{is_valid_short_code, LinkResolver, ResolveLink};
pub use run::{run_redirect, RedirectOutcome, RedirectReport};

// Internal run module (wires the session together for the terminal host)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{debug, info};
    use url::Url;

    use crate::api::BackendClient;
    use crate::app::{drive_session, log_session_statistics, ConsoleNavigator};
    use crate::auth::{MemorySessionStore, SessionContext, SessionStore};
    use crate::config::{Config, COUNTDOWN_TICK};
    use crate::enrich::MetadataEnricher;
    use crate::error_handling::{InfoType, SessionStats};
    use crate::initialization::{init_metadata_client, init_resolve_client};
    use crate::redirect::{
        FailureKind, Hooks, RedirectConfig, RedirectController, RedirectPhase,
    };
    use crate::resolver::LinkResolver;

    /// How a redirect session ended.
    #[derive(Debug, Clone)]
    pub enum RedirectOutcome {
        /// Navigation to the destination fired
        Completed {
            /// The destination URL
            target: Url,
        },
        /// The user left without following the link
        Cancelled,
        /// The session failed and was not retried to success
        Failed {
            /// Failure class
            kind: FailureKind,
            /// Human-readable reason
            message: String,
        },
    }

    /// Results of one redirect session.
    #[derive(Debug, Clone)]
    pub struct RedirectReport {
        /// The short code the session resolved
        pub short_code: String,
        /// How the session ended
        pub outcome: RedirectOutcome,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs one redirect session in the terminal host.
    ///
    /// This is the main entry point for the library. It builds the backend
    /// client, spawns the session for `config.short_code`, renders it until
    /// it ends, and reports how it ended.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The backend base URL does not parse
    /// - An HTTP client cannot be initialized
    ///
    /// Session-level failures (link not found, expired, network trouble) are
    /// not errors; they are reported through [`RedirectOutcome::Failed`].
    pub async fn run_redirect(config: Config) -> Result<RedirectReport> {
        let base_url = Url::parse(&config.api_url).context("Invalid backend API URL")?;

        let session: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(
            match &config.access_token {
                Some(token) => SessionContext::with_token(token.clone()),
                None => SessionContext::default(),
            },
        ));

        let resolve_client =
            init_resolve_client(&config).context("Failed to initialize HTTP client")?;
        let metadata_client =
            init_metadata_client().context("Failed to initialize metadata HTTP client")?;
        let backend = Arc::new(BackendClient::new(
            resolve_client,
            metadata_client,
            base_url,
            session,
        ));

        let stats = Arc::new(SessionStats::new());
        {
            let stats = Arc::clone(&stats);
            backend.events().on_invalidated(move || {
                stats.increment_info(InfoType::SessionInvalidated);
            });
        }

        let resolver = Arc::new(LinkResolver::new(Arc::clone(&backend), Arc::clone(&stats)));
        let enricher = Arc::new(MetadataEnricher::new(
            Arc::clone(&backend),
            Arc::clone(&stats),
        ));
        let navigator = Arc::new(ConsoleNavigator);

        let hooks = Hooks::new()
            .on_redirect_start(|target| debug!("Redirect starting toward {target}"))
            .on_cancel(|| info!("Left without following the link"));

        let redirect_config = RedirectConfig {
            countdown_secs: config.countdown_secs,
            tick: COUNTDOWN_TICK,
        };

        let start = std::time::Instant::now();
        let controller = RedirectController::spawn(
            config.short_code.clone(),
            resolver,
            enricher,
            navigator,
            redirect_config,
            hooks,
            Arc::clone(&stats),
        );

        let final_snapshot = drive_session(&controller, config.now).await;
        let elapsed_seconds = start.elapsed().as_secs_f64();

        log_session_statistics(&stats);

        let outcome = match final_snapshot.phase {
            RedirectPhase::Redirecting => match final_snapshot.link {
                Some(link) => RedirectOutcome::Completed {
                    target: link.original_url,
                },
                None => RedirectOutcome::Cancelled,
            },
            RedirectPhase::Failed => {
                let failure = final_snapshot.failure;
                RedirectOutcome::Failed {
                    kind: failure
                        .as_ref()
                        .map(|f| f.kind)
                        .unwrap_or(FailureKind::Malformed),
                    message: failure
                        .map(|f| f.message)
                        .unwrap_or_else(|| "The redirect could not be prepared".to_string()),
                }
            }
            _ => RedirectOutcome::Cancelled,
        };

        Ok(RedirectReport {
            short_code: config.short_code,
            outcome,
            elapsed_seconds,
        })
    }
}
