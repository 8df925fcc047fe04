//! Terminal host for a redirect session.
//!
//! Mounts the session in a terminal: renders snapshots as they are
//! published, maps Ctrl-C to the cancel action, lets the user retry after a
//! network failure, and performs "navigation" by printing the destination
//! URL to stdout.

use log::{error, info};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use url::Url;

use crate::models::display_domain;
use crate::redirect::{Navigate, RedirectController, RedirectPhase, SessionSnapshot};

/// Navigator for the terminal host: prints the destination to stdout.
///
/// The session's full-page navigation has no terminal equivalent, so the
/// contract here is "emit the target exactly once", which scripts can
/// capture and open.
pub struct ConsoleNavigator;

impl Navigate for ConsoleNavigator {
    fn navigate(&self, target: &Url) {
        println!("{target}");
    }
}

/// Tracks what the view has already rendered so transitions print once.
#[derive(Default)]
struct ViewState {
    last_phase: Option<RedirectPhase>,
    preview_shown: bool,
    retry_hint_shown: bool,
}

/// Drives a session to completion in the terminal.
///
/// Consumes snapshots until the session task ends and returns the final
/// snapshot. Ctrl-C cancels; with `auto_confirm` the redirect is confirmed
/// as soon as the session is ready, skipping the countdown.
pub async fn drive_session(
    controller: &RedirectController,
    auto_confirm: bool,
) -> SessionSnapshot {
    let mut rx = controller.subscribe();
    let mut stdin_lines = BufReader::new(stdin()).lines();
    let mut view = ViewState::default();
    let mut auto_confirmed = false;
    let mut awaiting_retry = false;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ctrl_c_fired = false;

    render(&rx.borrow().clone(), &mut view);

    loop {
        tokio::select! {
            signal = &mut ctrl_c, if !ctrl_c_fired => {
                // On Err the handler could not be installed; disable the arm
                // rather than treating it as a cancel.
                ctrl_c_fired = true;
                if signal.is_ok() {
                    controller.cancel();
                }
            }
            changed = rx.changed() => {
                // The channel closes when the session task ends.
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                render(&snapshot, &mut view);

                match snapshot.phase {
                    RedirectPhase::Ready if auto_confirm && !auto_confirmed => {
                        auto_confirmed = true;
                        controller.go_now();
                    }
                    RedirectPhase::Failed => {
                        let retryable = snapshot
                            .failure
                            .as_ref()
                            .map(|f| f.is_retryable())
                            .unwrap_or(false);
                        if retryable {
                            if !awaiting_retry {
                                awaiting_retry = true;
                                view.retry_hint_shown = false;
                            }
                        } else {
                            // Definitive failure: the terminal's "way back"
                            // is to leave the session.
                            controller.cancel();
                        }
                    }
                    _ => {}
                }
                if awaiting_retry && !view.retry_hint_shown {
                    view.retry_hint_shown = true;
                    info!("Press Enter to retry, Ctrl-C to leave");
                }
            }
            line = stdin_lines.next_line(), if awaiting_retry => {
                awaiting_retry = false;
                match line {
                    Ok(Some(_)) => controller.retry(),
                    // Stdin is gone; nobody can retry, so leave.
                    Ok(None) | Err(_) => controller.cancel(),
                }
            }
        }
    }

    let snapshot = rx.borrow().clone();
    snapshot
}

fn render(snapshot: &SessionSnapshot, view: &mut ViewState) {
    let entered = view.last_phase != Some(snapshot.phase);
    view.last_phase = Some(snapshot.phase);

    match snapshot.phase {
        RedirectPhase::Loading => {
            if entered {
                info!("Resolving short link {}", snapshot.short_code);
                view.preview_shown = false;
            }
        }
        RedirectPhase::Ready => {
            if entered {
                if let Some(link) = &snapshot.link {
                    info!(
                        "Going to {} ({} click{})",
                        link.original_url,
                        link.clicks,
                        if link.clicks == 1 { "" } else { "s" }
                    );
                }
            }
            if !view.preview_shown {
                if let Some(preview) = &snapshot.preview {
                    view.preview_shown = true;
                    if let Some(title) = &preview.title {
                        info!("Preview: {title}");
                    }
                    if let Some(description) = &preview.description {
                        info!("  {description}");
                    }
                }
            }
            info!(
                "Redirecting in {} second{}",
                snapshot.seconds_remaining,
                if snapshot.seconds_remaining == 1 { "" } else { "s" }
            );
        }
        RedirectPhase::Redirecting => {
            if entered {
                if let Some(link) = &snapshot.link {
                    info!("Opening {}", display_domain(&link.original_url));
                }
            }
        }
        RedirectPhase::Failed => {
            if entered {
                let message = snapshot
                    .failure
                    .as_ref()
                    .map(|f| f.message.as_str())
                    .unwrap_or("The redirect could not be prepared");
                error!("{message}");
            }
        }
    }
}
