//! Pure session state machine.
//!
//! All phase transitions live here as a reducer over [`Input`] values; the
//! async driver owns the clock, the channels, and the side effects, and this
//! module owns the rules. Keeping the rules synchronous makes every
//! transition testable without a runtime.

use url::Url;

use crate::error_handling::ResolveError;
use crate::models::{LinkRecord, PreviewMetadata};

use super::{FailureKind, RedirectPhase, SessionFailure, SessionSnapshot};

/// An event applied to the session state.
#[derive(Debug)]
pub(crate) enum Input {
    /// Resolution finished with a record (possibly expired or inactive)
    Resolved(LinkRecord),
    /// Resolution finished with a classified failure
    ResolveFailed(ResolveError),
    /// One countdown tick elapsed
    Tick,
    /// The user confirmed the redirect early
    GoNow,
    /// Enrichment produced a preview
    PreviewReady(PreviewMetadata),
    /// The user asked to retry after a network failure
    Retry,
}

/// The side effect the driver must perform after a transition.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Effect {
    /// Nothing to do beyond publishing the new snapshot
    None,
    /// Start the countdown and kick off enrichment for this target
    BeginCountdown(Url),
    /// Perform the navigation; issued at most once per session
    Navigate(Url),
    /// Re-run resolution for the same short code
    RestartResolve,
}

/// Session state plus the single-navigation latch.
pub(crate) struct Machine {
    snapshot: SessionSnapshot,
    countdown_start: u32,
    redirected: bool,
}

impl Machine {
    pub fn new(short_code: String, countdown_start: u32) -> Self {
        Machine {
            snapshot: SessionSnapshot {
                short_code,
                phase: RedirectPhase::Loading,
                seconds_remaining: countdown_start,
                link: None,
                preview: None,
                failure: None,
            },
            countdown_start,
            redirected: false,
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Applies one input and returns the effect the driver must perform.
    ///
    /// Inputs that are invalid for the current phase are ignored: a tick
    /// after the redirect, a preview landing on a failed session, a retry of
    /// a non-retryable failure all produce `Effect::None` without touching
    /// state.
    pub fn apply(&mut self, input: Input) -> Effect {
        match (self.snapshot.phase, input) {
            (RedirectPhase::Loading, Input::Resolved(record)) => {
                if !record.is_active {
                    self.fail(FailureKind::Inactive, ResolveError::Inactive.to_string());
                    self.snapshot.link = Some(record);
                    Effect::None
                } else if record.is_expired() {
                    self.fail(FailureKind::Expired, ResolveError::Expired.to_string());
                    self.snapshot.link = Some(record);
                    Effect::None
                } else {
                    let target = record.original_url.clone();
                    self.snapshot.phase = RedirectPhase::Ready;
                    self.snapshot.seconds_remaining = self.countdown_start;
                    self.snapshot.link = Some(record);
                    Effect::BeginCountdown(target)
                }
            }
            (RedirectPhase::Loading, Input::ResolveFailed(e)) => {
                self.fail(FailureKind::from(&e), e.to_string());
                Effect::None
            }
            (RedirectPhase::Ready, Input::Tick) => {
                self.snapshot.seconds_remaining =
                    self.snapshot.seconds_remaining.saturating_sub(1);
                if self.snapshot.seconds_remaining == 0 {
                    self.try_redirect()
                } else {
                    Effect::None
                }
            }
            (RedirectPhase::Ready, Input::GoNow) => self.try_redirect(),
            (RedirectPhase::Ready, Input::PreviewReady(preview)) => {
                self.snapshot.preview = Some(preview);
                Effect::None
            }
            (RedirectPhase::Failed, Input::Retry) => {
                let retryable = self
                    .snapshot
                    .failure
                    .as_ref()
                    .map(SessionFailure::is_retryable)
                    .unwrap_or(false);
                if !retryable {
                    return Effect::None;
                }
                self.snapshot.phase = RedirectPhase::Loading;
                self.snapshot.seconds_remaining = self.countdown_start;
                self.snapshot.link = None;
                self.snapshot.preview = None;
                self.snapshot.failure = None;
                Effect::RestartResolve
            }
            // Everything else is a no-op: late previews after redirect or
            // failure, ticks outside Ready, go-now before the countdown, and
            // any input against a terminal phase.
            _ => Effect::None,
        }
    }

    fn fail(&mut self, kind: FailureKind, message: String) {
        self.snapshot.phase = RedirectPhase::Failed;
        self.snapshot.failure = Some(SessionFailure { kind, message });
    }

    /// Redirect transition guarded by the latch: the first trigger wins,
    /// every later one is a no-op.
    fn try_redirect(&mut self) -> Effect {
        if self.redirected {
            return Effect::None;
        }
        let Some(target) = self
            .snapshot
            .link
            .as_ref()
            .map(|record| record.original_url.clone())
        else {
            return Effect::None;
        };
        self.redirected = true;
        self.snapshot.phase = RedirectPhase::Redirecting;
        Effect::Navigate(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(url: &str) -> LinkRecord {
        LinkRecord {
            short_code: "abc123".to_string(),
            original_url: Url::parse(url).unwrap(),
            clicks: 0,
            created_at: Utc::now(),
            expires_at: Some(Utc::now() + Duration::days(1)),
            is_active: true,
        }
    }

    fn ready_machine(countdown: u32) -> Machine {
        let mut machine = Machine::new("abc123".to_string(), countdown);
        let effect = machine.apply(Input::Resolved(record("https://example.com")));
        assert!(matches!(effect, Effect::BeginCountdown(_)));
        machine
    }

    #[test]
    fn test_resolved_usable_record_starts_countdown() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        let effect = machine.apply(Input::Resolved(record("https://example.com")));
        match effect {
            Effect::BeginCountdown(target) => {
                assert_eq!(target.as_str(), "https://example.com/")
            }
            other => panic!("expected BeginCountdown, got {other:?}"),
        }
        assert_eq!(machine.snapshot().phase, RedirectPhase::Ready);
        assert_eq!(machine.snapshot().seconds_remaining, 5);
        assert!(machine.snapshot().link.is_some());
    }

    #[test]
    fn test_expired_record_fails_without_countdown() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        let mut expired = record("https://example.com");
        expired.expires_at = Some(Utc::now() - Duration::hours(1));

        assert_eq!(machine.apply(Input::Resolved(expired)), Effect::None);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Failed);
        let failure = machine.snapshot().failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::Expired);
        assert!(!failure.is_retryable());
        // The record is kept so the failure view can still describe the link.
        assert!(machine.snapshot().link.is_some());
    }

    #[test]
    fn test_inactive_record_fails_without_countdown() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        let mut inactive = record("https://example.com");
        inactive.is_active = false;

        machine.apply(Input::Resolved(inactive));
        assert_eq!(machine.snapshot().phase, RedirectPhase::Failed);
        assert_eq!(
            machine.snapshot().failure.as_ref().unwrap().kind,
            FailureKind::Inactive
        );
    }

    #[test]
    fn test_resolve_failure_carries_message() {
        let mut machine = Machine::new("zzz999".to_string(), 5);
        machine.apply(Input::ResolveFailed(ResolveError::NotFound));
        assert_eq!(machine.snapshot().phase, RedirectPhase::Failed);
        let failure = machine.snapshot().failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert!(failure.message.to_lowercase().contains("no link"));
    }

    #[test]
    fn test_ticks_count_down_and_redirect_at_zero() {
        let mut machine = ready_machine(3);
        assert_eq!(machine.apply(Input::Tick), Effect::None);
        assert_eq!(machine.snapshot().seconds_remaining, 2);
        assert_eq!(machine.apply(Input::Tick), Effect::None);
        assert_eq!(machine.snapshot().seconds_remaining, 1);

        match machine.apply(Input::Tick) {
            Effect::Navigate(target) => assert_eq!(target.as_str(), "https://example.com/"),
            other => panic!("expected Navigate, got {other:?}"),
        }
        assert_eq!(machine.snapshot().phase, RedirectPhase::Redirecting);
        assert_eq!(machine.snapshot().seconds_remaining, 0);
    }

    #[test]
    fn test_seconds_never_go_below_zero() {
        let mut machine = ready_machine(1);
        assert!(matches!(machine.apply(Input::Tick), Effect::Navigate(_)));
        // Further ticks are no-ops against the terminal phase.
        for _ in 0..3 {
            assert_eq!(machine.apply(Input::Tick), Effect::None);
            assert_eq!(machine.snapshot().seconds_remaining, 0);
        }
    }

    #[test]
    fn test_go_now_redirects_early() {
        let mut machine = ready_machine(5);
        machine.apply(Input::Tick);
        assert!(matches!(machine.apply(Input::GoNow), Effect::Navigate(_)));
        assert_eq!(machine.snapshot().phase, RedirectPhase::Redirecting);
    }

    #[test]
    fn test_navigation_latch_fires_once() {
        let mut machine = ready_machine(1);
        // Timer and go-now racing in the same tick: one Navigate effect.
        let first = machine.apply(Input::Tick);
        let second = machine.apply(Input::GoNow);
        assert!(matches!(first, Effect::Navigate(_)));
        assert_eq!(second, Effect::None);

        // Same race, other order.
        let mut machine = ready_machine(1);
        let first = machine.apply(Input::GoNow);
        let second = machine.apply(Input::Tick);
        assert!(matches!(first, Effect::Navigate(_)));
        assert_eq!(second, Effect::None);
    }

    #[test]
    fn test_go_now_ignored_while_loading() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        assert_eq!(machine.apply(Input::GoNow), Effect::None);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Loading);
    }

    #[test]
    fn test_preview_upgrades_in_place_while_ready() {
        let mut machine = ready_machine(5);
        let preview = PreviewMetadata {
            title: Some("Example".to_string()),
            ..Default::default()
        };
        assert_eq!(machine.apply(Input::PreviewReady(preview)), Effect::None);
        assert_eq!(
            machine.snapshot().preview.as_ref().unwrap().title.as_deref(),
            Some("Example")
        );
        assert_eq!(machine.snapshot().phase, RedirectPhase::Ready);
    }

    #[test]
    fn test_late_preview_discarded_after_redirect() {
        let mut machine = ready_machine(1);
        machine.apply(Input::Tick);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Redirecting);

        let preview = PreviewMetadata {
            title: Some("Too late".to_string()),
            ..Default::default()
        };
        assert_eq!(machine.apply(Input::PreviewReady(preview)), Effect::None);
        assert!(machine.snapshot().preview.is_none());
    }

    #[test]
    fn test_late_preview_discarded_after_failure() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        machine.apply(Input::ResolveFailed(ResolveError::NotFound));

        let preview = PreviewMetadata::default();
        assert_eq!(machine.apply(Input::PreviewReady(preview)), Effect::None);
        assert!(machine.snapshot().preview.is_none());
    }

    #[test]
    fn test_retry_reenters_loading_only_for_network_failures() {
        let mut machine = Machine::new("abc123".to_string(), 5);
        machine.apply(Input::ResolveFailed(ResolveError::Network("down".into())));
        assert_eq!(machine.snapshot().phase, RedirectPhase::Failed);

        assert_eq!(machine.apply(Input::Retry), Effect::RestartResolve);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Loading);
        assert!(machine.snapshot().failure.is_none());

        // A definitive backend answer is not retryable.
        let mut machine = Machine::new("abc123".to_string(), 5);
        machine.apply(Input::ResolveFailed(ResolveError::NotFound));
        assert_eq!(machine.apply(Input::Retry), Effect::None);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Failed);
    }

    #[test]
    fn test_retry_after_redirect_is_ignored() {
        let mut machine = ready_machine(1);
        machine.apply(Input::Tick);
        assert_eq!(machine.apply(Input::Retry), Effect::None);
        assert_eq!(machine.snapshot().phase, RedirectPhase::Redirecting);
    }

    #[test]
    fn test_retry_then_resolve_runs_a_full_second_pass() {
        let mut machine = Machine::new("abc123".to_string(), 2);
        machine.apply(Input::ResolveFailed(ResolveError::Network("down".into())));
        machine.apply(Input::Retry);

        assert!(matches!(
            machine.apply(Input::Resolved(record("https://example.com"))),
            Effect::BeginCountdown(_)
        ));
        assert_eq!(machine.snapshot().seconds_remaining, 2);
        machine.apply(Input::Tick);
        assert!(matches!(machine.apply(Input::Tick), Effect::Navigate(_)));
    }
}
