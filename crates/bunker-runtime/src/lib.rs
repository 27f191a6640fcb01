//! # Bunker Runtime
//!
//! The game loop: phases, turn order, agent decisions and concurrent sessions.
//!
//! ## Key Types
//!
//! - [`SessionManager`] - lobbies, seats and one serialized engine per session
//! - [`GameEngine`] - capability trait implemented by each game variant
//! - [`BunkerGame`] - the Bunker phase state machine
//! - [`AgentFacade`] - speech, nudges, votes and judging through the deadline guard
//! - [`Outbox`] / [`Notifier`] - ordered event delivery to the transport
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use bunker_core::GameConfig;
//! use bunker_llm::{Generator, MockProvider};
//! use bunker_runtime::{GameContext, GameRegistry, MemoryJournal, RecordingNotifier, SessionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut config = GameConfig::default();
//!     config.pacing.bot_turn_delay_ms = 0;
//!     let ctx = GameContext::new(
//!         Arc::new(config),
//!         Generator::new(Arc::new(MockProvider::tabletop())),
//!         Arc::new(MemoryJournal::new()),
//!     );
//!     let sessions = SessionManager::new(ctx, Arc::new(GameRegistry::builtin()), Arc::new(RecordingNotifier::new()));
//!
//!     let lobby = sessions.create_lobby("bunker", "host", None).await.unwrap();
//!     sessions.add_bots(&lobby, "host", 4).await.unwrap();
//!     let events = sessions.start(&lobby, "host").await.unwrap();
//!     assert!(events.iter().any(|e| e.kind == bunker_runtime::EventKind::GameOver));
//! }
//! ```

pub mod agent;
pub mod bunker;
pub mod context;
pub mod engine;
pub mod events;
pub mod journal;
pub mod notify;
pub mod phase;
pub mod prompts;
pub mod registry;
pub mod scheduler;
pub mod sessions;

pub use agent::{AgentFacade, Scene, SILENT_SPEECH};
pub use bunker::{BunkerGame, GAME_KEY};
pub use context::GameContext;
pub use engine::{EngineError, GameEngine, PlayerView, Rejection};
pub use events::{EventKind, GameEvent, ReplyButton, DASHBOARD_TOKEN};
pub use journal::{EventLog, FileJournal, JournalError, LogEntry, MemoryJournal};
pub use notify::{Notifier, NotifyError, Outbox, RecordingNotifier};
pub use phase::{GameState, Outcome, Phase};
pub use registry::{EngineFactory, GameDescriptor, GameRegistry};
pub use scheduler::{current_active_list, TurnCursor};
pub use sessions::{LobbyError, LobbySummary, LobbyStatus, SessionManager};
