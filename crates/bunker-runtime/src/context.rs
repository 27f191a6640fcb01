//! Shared dependencies of every session
//!
//! Built once at startup and passed by reference into the session manager and
//! every engine call.

use std::sync::Arc;

use bunker_core::GameConfig;
use bunker_llm::Generator;

use crate::journal::{EventLog, LogEntry};

#[derive(Debug, Clone)]
pub struct GameContext {
    /// Read-only rules
    pub config: Arc<GameConfig>,
    /// Deadline-guarded generation
    pub generator: Generator,
    pub journal: Arc<dyn EventLog>,
}

impl GameContext {
    pub fn new(config: Arc<GameConfig>, generator: Generator, journal: Arc<dyn EventLog>) -> Self {
        Self {
            config,
            generator,
            journal,
        }
    }

    /// Append to the session journal; failures are logged and dropped
    pub async fn record(&self, session: &str, entry: LogEntry) {
        if let Err(e) = self.journal.append(session, entry).await {
            tracing::warn!(session, journal = %self.journal.name(), error = %e, "Journal append failed");
        }
    }
}
