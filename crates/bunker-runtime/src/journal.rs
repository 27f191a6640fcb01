//! Append-only event log, keyed by session

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub event_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(event_type: &str, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            event_type: event_type.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[async_trait]
pub trait EventLog: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn append(&self, session: &str, entry: LogEntry) -> Result<(), JournalError>;
}

/// In-memory journal (for testing)
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: RwLock<HashMap<String, Vec<LogEntry>>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self, session: &str) -> Vec<LogEntry> {
        self.entries
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventLog for MemoryJournal {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, session: &str, entry: LogEntry) -> Result<(), JournalError> {
        self.entries
            .write()
            .await
            .entry(session.to_string())
            .or_default()
            .push(entry);
        Ok(())
    }
}

#[derive(Serialize)]
struct FileLine<'a> {
    session: &'a str,
    #[serde(flatten)]
    entry: &'a LogEntry,
}

/// JSON-lines file, one object per entry
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileJournal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EventLog for FileJournal {
    fn name(&self) -> &str {
        "file"
    }

    async fn append(&self, session: &str, entry: LogEntry) -> Result<(), JournalError> {
        let mut line = serde_json::to_string(&FileLine {
            session,
            entry: &entry,
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
