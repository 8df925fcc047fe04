//! Countdown/redirect controller.
//!
//! One redirect session per short code: resolve the link, start a countdown,
//! upgrade the preview in place when enrichment lands, and perform the
//! navigation side effect exactly once. The session is an explicit state
//! machine ([`machine`]) driven by a tokio task ([`driver`]); hosts observe
//! it through a `watch` channel of [`SessionSnapshot`] values and steer it
//! through commands.

pub(crate) mod machine;
mod driver;

use std::time::Duration;

use url::Url;

use crate::error_handling::ResolveError;
use crate::models::{LinkRecord, PreviewMetadata};

pub use driver::{Command, RedirectController};

/// Phase of a redirect session.
///
/// Transitions are one-directional: `Loading` leads to `Ready` or `Failed`,
/// `Ready` leads to `Redirecting`, and `Redirecting` is terminal. The only
/// way back to `Loading` is an explicit retry from a network-failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPhase {
    /// Resolution in flight
    Loading,
    /// Link resolved, countdown running
    Ready,
    /// Navigation fired (terminal)
    Redirecting,
    /// Resolution failed or the record is unusable
    Failed,
}

/// Failure class of a `Failed` session, mirroring [`ResolveError`] without
/// the payload details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed or missing short code
    InvalidShortCode,
    /// No link for this code
    NotFound,
    /// Link expired
    Expired,
    /// Link deactivated
    Inactive,
    /// Unusable backend payload
    Malformed,
    /// Transport failure, retryable
    Network,
}

impl From<&ResolveError> for FailureKind {
    fn from(e: &ResolveError) -> Self {
        match e {
            ResolveError::InvalidShortCode => FailureKind::InvalidShortCode,
            ResolveError::NotFound => FailureKind::NotFound,
            ResolveError::Expired => FailureKind::Expired,
            ResolveError::Inactive => FailureKind::Inactive,
            ResolveError::Malformed(_) => FailureKind::Malformed,
            ResolveError::Network(_) => FailureKind::Network,
        }
    }
}

/// User-visible failure of a redirect session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    /// Failure class
    pub kind: FailureKind,
    /// Human-readable reason, shown verbatim on the failure view
    pub message: String,
}

impl SessionFailure {
    /// Whether an explicit retry can re-enter `Loading`.
    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Network
    }
}

/// Observable state of one redirect session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    /// The short code this session is resolving
    pub short_code: String,
    /// Current phase
    pub phase: RedirectPhase,
    /// Seconds left on the countdown; meaningful in `Ready`
    pub seconds_remaining: u32,
    /// The resolved record, once available
    pub link: Option<LinkRecord>,
    /// Preview metadata, once enrichment lands
    pub preview: Option<PreviewMetadata>,
    /// Failure details, present exactly when `phase` is `Failed`
    pub failure: Option<SessionFailure>,
}

/// Tuning for one redirect session.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    /// Countdown start value in seconds
    pub countdown_secs: u32,
    /// Wall-clock duration of one countdown tick. One second in production;
    /// tests shrink it to run countdowns in milliseconds.
    pub tick: Duration,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        RedirectConfig {
            countdown_secs: crate::config::DEFAULT_COUNTDOWN_SECS,
            tick: crate::config::COUNTDOWN_TICK,
        }
    }
}

/// Performs the navigation side effect.
///
/// Navigation leaves the application for an arbitrary external site, so it
/// is modeled as an injected collaborator: the CLI host prints the
/// destination, tests record invocations. The controller guarantees at most
/// one call per session.
pub trait Navigate: Send + Sync + 'static {
    /// Navigates to the redirect target.
    fn navigate(&self, target: &Url);
}

type RedirectStartHook = Box<dyn Fn(&Url) + Send + Sync>;
type CancelHook = Box<dyn Fn() + Send + Sync>;

/// Host callbacks for session lifecycle moments.
#[derive(Default)]
pub struct Hooks {
    on_redirect_start: Option<RedirectStartHook>,
    on_cancel: Option<CancelHook>,
}

impl Hooks {
    /// Creates hooks with no callbacks registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once, immediately before navigation.
    pub fn on_redirect_start(mut self, hook: impl Fn(&Url) + Send + Sync + 'static) -> Self {
        self.on_redirect_start = Some(Box::new(hook));
        self
    }

    /// Fired when the user cancels out of the session; the host navigates
    /// away from the redirect view.
    pub fn on_cancel(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Box::new(hook));
        self
    }

    pub(crate) fn fire_redirect_start(&self, target: &Url) {
        if let Some(hook) = &self.on_redirect_start {
            hook(target);
        }
    }

    pub(crate) fn fire_cancel(&self) {
        if let Some(hook) = &self.on_cancel {
            hook();
        }
    }
}
