//! Data bridge: runs workflow effects against the [`Session`] and feeds
//! the outcomes back into the app loop as [`Action`]s.
//!
//! Every backend call happens on a spawned task so the render loop never
//! waits on the network.

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use didly_core::{Effect, Event, HealthStatus, Notification, Session};

use crate::action::Action;

/// Execute one effect. Backend work is spawned; notifications go straight
/// back to the loop.
pub fn spawn_effect(session: &Session, tx: &UnboundedSender<Action>, effect: Effect) {
    let session = session.clone();
    let tx = tx.clone();
    match effect {
        Effect::Notify(notification) => {
            let _ = tx.send(Action::Notify(notification));
        }
        Effect::Search { seq, filters } => {
            tokio::spawn(async move {
                debug!(seq, "running search");
                let event = match session.search(&filters).await {
                    Ok(results) => Event::SearchSucceeded { seq, results },
                    Err(e) => {
                        warn!(error = %e, "search failed");
                        Event::SearchFailed {
                            seq,
                            message: e.user_message(),
                        }
                    }
                };
                let _ = tx.send(event.into());
                forward_warnings(&session, &tx).await;
            });
        }
        Effect::Execute(command) => {
            tokio::spawn(async move {
                let event = match session.execute(command.clone()).await {
                    Ok(result) => Event::CommandSucceeded {
                        result,
                        owned: session.store().snapshot().as_ref().clone(),
                    },
                    Err(e) => {
                        warn!(error = %e, id = %command.id(), "command failed");
                        Event::CommandFailed {
                            message: e.user_message(),
                            command,
                        }
                    }
                };
                let _ = tx.send(event.into());
                forward_warnings(&session, &tx).await;
            });
        }
    }
}

/// Re-fetch owned numbers in the background.
pub fn spawn_refresh(session: Session, tx: UnboundedSender<Action>) {
    tokio::spawn(async move {
        let event = match session.refresh_owned().await {
            Ok(snapshot) => Event::OwnedRefreshed(snapshot.as_ref().clone()),
            Err(e) => {
                warn!(error = %e, "owned refresh failed");
                Event::OwnedRefreshFailed {
                    message: e.user_message(),
                }
            }
        };
        let _ = tx.send(event.into());
        forward_warnings(&session, &tx).await;
    });
}

/// Forward health changes from the session's probe until cancelled.
pub async fn health_bridge(
    mut health: watch::Receiver<HealthStatus>,
    tx: UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let initial = *health.borrow_and_update();
    if tx.send(Event::HealthChanged(initial).into()).is_err() {
        return;
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            changed = health.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *health.borrow_and_update();
                debug!(%status, "health changed");
                if tx.send(Event::HealthChanged(status).into()).is_err() {
                    break;
                }
            }
        }
    }
}

/// Records the normalizer had to skip become a single info toast.
async fn forward_warnings(session: &Session, tx: &UnboundedSender<Action>) {
    let warnings = session.take_warnings().await;
    if warnings.is_empty() {
        return;
    }
    for warning in &warnings {
        warn!(%warning, "skipped backend record");
    }
    let _ = tx.send(Action::Notify(Notification::info(format!(
        "Skipped {} malformed record(s) from the backend",
        warnings.len()
    ))));
}
