//! Async session driver.
//!
//! Owns the clock, the channels, and the side effects for one redirect
//! session: it feeds resolver results, countdown ticks, user commands, and
//! enrichment results into the pure [`Machine`] and performs whatever effect
//! the transition demands. Every exit path drops the countdown interval, so
//! no tick can fire after the session ends.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::enrich::EnrichPreview;
use crate::error_handling::{InfoType, SessionStats};
use crate::models::PreviewMetadata;
use crate::resolver::ResolveLink;

use super::machine::{Effect, Input, Machine};
use super::{Hooks, Navigate, RedirectConfig, SessionSnapshot};

/// A user action steering the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Confirm the redirect before the countdown finishes
    GoNow,
    /// Leave the session without following the link
    Cancel,
    /// Re-run resolution after a network failure
    Retry,
}

/// Handle to a running redirect session.
///
/// Spawning creates one session with a fresh navigation latch; the handle
/// observes it through [`subscribe`](Self::subscribe) and steers it through
/// the command methods. Dropping the handle tears the session down.
pub struct RedirectController {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RedirectController {
    /// Spawns a session for `short_code` on the current tokio runtime.
    pub fn spawn<R, E, N>(
        short_code: String,
        resolver: Arc<R>,
        enricher: Arc<E>,
        navigator: Arc<N>,
        config: RedirectConfig,
        hooks: Hooks,
        stats: Arc<SessionStats>,
    ) -> Self
    where
        R: ResolveLink,
        E: EnrichPreview,
        N: Navigate,
    {
        let machine = Machine::new(short_code.clone(), config.countdown_secs);
        let (state_tx, state_rx) = watch::channel(machine.snapshot().clone());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let driver = Driver {
            short_code,
            machine,
            state_tx,
            cmd_rx,
            cancel: cancel.clone(),
            resolver,
            enricher,
            navigator,
            config,
            hooks,
            stats,
        };
        let handle = tokio::spawn(driver.run());

        RedirectController {
            cmd_tx,
            state_rx,
            cancel,
            handle,
        }
    }

    /// A receiver of session snapshots for rendering.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Requests the redirect immediately. No-op outside `Ready` or after
    /// the navigation already fired.
    pub fn go_now(&self) {
        let _ = self.cmd_tx.send(Command::GoNow);
    }

    /// Leaves the session without following the link.
    pub fn cancel(&self) {
        let _ = self.cmd_tx.send(Command::Cancel);
    }

    /// Re-runs resolution. No-op unless the session failed with a
    /// retryable (network) error.
    pub fn retry(&self) {
        let _ = self.cmd_tx.send(Command::Retry);
    }

    /// Whether the session task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the session task to end.
    pub async fn wait(&mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for RedirectController {
    fn drop(&mut self) {
        // Teardown: stop the driver without firing the cancel hook.
        self.cancel.cancel();
    }
}

enum FailedOutcome {
    Restart,
    Exit,
}

struct Driver<R, E, N> {
    short_code: String,
    machine: Machine,
    state_tx: watch::Sender<SessionSnapshot>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
    resolver: Arc<R>,
    enricher: Arc<E>,
    navigator: Arc<N>,
    config: RedirectConfig,
    hooks: Hooks,
    stats: Arc<SessionStats>,
}

impl<R, E, N> Driver<R, E, N>
where
    R: ResolveLink,
    E: EnrichPreview,
    N: Navigate,
{
    async fn run(mut self) {
        loop {
            self.publish();

            let resolved = {
                let resolver = Arc::clone(&self.resolver);
                let short_code = self.short_code.clone();
                let resolve = async move { resolver.resolve(&short_code).await };
                tokio::pin!(resolve);
                loop {
                    tokio::select! {
                        _ = self.cancel.cancelled() => return,
                        cmd = self.cmd_rx.recv() => match cmd {
                            Some(Command::Cancel) => {
                                self.stats.increment_info(InfoType::RedirectCancelled);
                                self.hooks.fire_cancel();
                                return;
                            }
                            // Go-now and retry are meaningless mid-resolution.
                            Some(_) => continue,
                            None => return,
                        },
                        result = &mut resolve => break result,
                    }
                }
            };

            let effect = match resolved {
                Ok(record) => self.machine.apply(Input::Resolved(record)),
                Err(e) => self.machine.apply(Input::ResolveFailed(e)),
            };

            match effect {
                Effect::BeginCountdown(target) => {
                    self.publish();
                    self.countdown(target).await;
                    return;
                }
                _ => {
                    // Failed: expired, inactive, or a resolve error.
                    self.publish();
                    match self.await_failed().await {
                        FailedOutcome::Restart => continue,
                        FailedOutcome::Exit => return,
                    }
                }
            }
        }
    }

    /// Parks a failed session until the user retries (network failures
    /// only), leaves, or the session is torn down.
    async fn await_failed(&mut self) -> FailedOutcome {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return FailedOutcome::Exit,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Retry) => {
                        if self.machine.apply(Input::Retry) == Effect::RestartResolve {
                            self.stats.increment_info(InfoType::RetryRequested);
                            info!("Retrying resolution for {}", self.short_code);
                            return FailedOutcome::Restart;
                        }
                        debug!("Ignoring retry of a non-retryable failure");
                    }
                    Some(Command::Cancel) => {
                        self.hooks.fire_cancel();
                        return FailedOutcome::Exit;
                    }
                    Some(Command::GoNow) => {}
                    None => return FailedOutcome::Exit,
                },
            }
        }
    }

    /// Runs the countdown with enrichment beside it.
    ///
    /// Enrichment reports through a oneshot and never gates a tick; if it is
    /// still in flight when the session ends, its result is dropped with the
    /// receiver.
    async fn countdown(&mut self, target: Url) {
        let (preview_tx, preview_rx) = oneshot::channel();
        let enrich_task = {
            let enricher = Arc::clone(&self.enricher);
            tokio::spawn(async move {
                let preview = enricher.enrich(&target).await;
                let _ = preview_tx.send(preview);
            })
        };
        let mut preview_rx = Some(preview_rx);

        let mut ticker = interval_at(Instant::now() + self.config.tick, self.config.tick);
        // A paused host must not catch up with a burst of decrements.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    enrich_task.abort();
                    return;
                }
                _ = ticker.tick() => {
                    match self.machine.apply(Input::Tick) {
                        Effect::Navigate(url) => {
                            self.perform_redirect(&url);
                            return;
                        }
                        _ => self.publish(),
                    }
                }
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::GoNow) => {
                        self.stats.increment_info(InfoType::GoNowUsed);
                        if let Effect::Navigate(url) = self.machine.apply(Input::GoNow) {
                            self.perform_redirect(&url);
                            return;
                        }
                    }
                    Some(Command::Cancel) => {
                        self.stats.increment_info(InfoType::RedirectCancelled);
                        info!("Redirect cancelled for {}", self.short_code);
                        enrich_task.abort();
                        self.hooks.fire_cancel();
                        return;
                    }
                    Some(Command::Retry) => {}
                    None => {
                        enrich_task.abort();
                        return;
                    }
                },
                preview = wait_preview(&mut preview_rx) => {
                    if let Some(preview) = preview {
                        self.machine.apply(Input::PreviewReady(preview));
                        self.stats.increment_info(InfoType::PreviewUpgraded);
                        self.publish();
                    }
                }
            }
        }
    }

    fn perform_redirect(&mut self, target: &Url) {
        self.publish();
        info!("Redirecting {} to {target}", self.short_code);
        self.hooks.fire_redirect_start(target);
        self.navigator.navigate(target);
        self.stats.increment_info(InfoType::RedirectCompleted);
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.machine.snapshot().clone());
    }
}

/// Awaits the enrichment result once; afterwards the slot is empty and this
/// future stays pending so its select arm goes quiet.
///
/// The receiver is left in the slot until the result actually arrives, so a
/// select race lost to another arm does not drop it.
async fn wait_preview(
    slot: &mut Option<oneshot::Receiver<PreviewMetadata>>,
) -> Option<PreviewMetadata> {
    match slot {
        Some(rx) => {
            let result = rx.await.ok();
            *slot = None;
            result
        }
        None => std::future::pending().await,
    }
}
