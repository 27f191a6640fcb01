//! Notification interface
//!
//! The transport (chat bot, terminal, test harness) implements [`Notifier`].
//! The game loop only talks to an [`Outbox`], which awaits each delivery with
//! a bounded timeout and never lets a failure reach the state machine.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::events::GameEvent;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Recipient unreachable: {0}")]
    Unreachable(String),
}

/// Delivers events to the participants of a session
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn deliver(&self, session: &str, event: &GameEvent) -> Result<(), NotifyError>;
}

/// Keeps every delivered event in memory (for tests)
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(String, GameEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order, with its session id
    pub async fn delivered(&self) -> Vec<(String, GameEvent)> {
        self.delivered.lock().await.clone()
    }

    /// Events of one session that reach `user_id`
    pub async fn seen_by(&self, session: &str, user_id: &str) -> Vec<GameEvent> {
        self.delivered
            .lock()
            .await
            .iter()
            .filter(|(s, e)| s == session && e.reaches(user_id))
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn deliver(&self, session: &str, event: &GameEvent) -> Result<(), NotifyError> {
        self.delivered
            .lock()
            .await
            .push((session.to_string(), event.clone()));
        Ok(())
    }
}

/// Ordered events of one action, delivered as they are emitted
#[derive(Debug)]
pub struct Outbox {
    session: String,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
    events: Vec<GameEvent>,
}

impl Outbox {
    pub fn new(session: &str, notifier: Arc<dyn Notifier>, timeout: Duration) -> Self {
        Self {
            session: session.to_string(),
            notifier,
            timeout,
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    /// Deliver and record. Failures and timeouts are logged and swallowed.
    pub async fn emit(&mut self, event: GameEvent) {
        match tokio::time::timeout(self.timeout, self.notifier.deliver(&self.session, &event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(session = %self.session, notifier = %self.notifier.name(), error = %e, "Event delivery failed");
            }
            Err(_) => {
                tracing::warn!(
                    session = %self.session,
                    notifier = %self.notifier.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Event delivery timed out"
                );
            }
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<GameEvent> {
        self.events
    }
}
