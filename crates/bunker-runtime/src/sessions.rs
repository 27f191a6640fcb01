//! Session manager - lobbies and running games
//!
//! Each lobby sits behind its own async mutex: actions on one session run
//! strictly one after another, while distinct sessions proceed concurrently.
//! The only state shared between sessions is the read-only [`GameContext`].

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use bunker_core::SeatRequest;

use crate::context::GameContext;
use crate::engine::{EngineError, GameEngine, PlayerView};
use crate::events::{EventKind, GameEvent};
use crate::notify::{Notifier, Outbox};
use crate::registry::GameRegistry;

#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("Unknown game: {0}")]
    UnknownGame(String),
    #[error("Lobby not found: {0}")]
    NotFound(String),
    #[error("User {0} already sits in a lobby")]
    AlreadySeated(String),
    #[error("User {0} is not in any lobby")]
    NotSeated(String),
    #[error("Name already taken: {0}")]
    DuplicateName(String),
    #[error("Lobby is full ({max} seats)")]
    Full { max: usize },
    #[error("Lobby is not open for changes")]
    NotOpen,
    #[error("Game is not running")]
    NotRunning,
    #[error("Only the host can do that")]
    NotHost,
    #[error("Not enough seats: {have} seated, {need} needed")]
    NotEnoughSeats { have: usize, need: usize },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    Open,
    Running,
    Finished,
}

/// Read-only description of a lobby
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbySummary {
    pub id: String,
    pub game: String,
    pub host: String,
    pub seats: Vec<String>,
    pub status: LobbyStatus,
}

#[derive(Debug)]
struct Lobby {
    id: String,
    game: &'static str,
    host: String,
    seats: Vec<SeatRequest>,
    status: LobbyStatus,
    engine: Option<Box<dyn GameEngine>>,
}

impl Lobby {
    fn summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id.clone(),
            game: self.game.to_string(),
            host: self.host.clone(),
            seats: self.seats.iter().map(|s| s.name.clone()).collect(),
            status: self.status,
        }
    }

    fn has_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.seats.iter().any(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.seats.iter().filter_map(|s| s.user_id.clone()).collect();
        if !ids.contains(&self.host) {
            ids.push(self.host.clone());
        }
        ids
    }

    fn running_engine(&mut self) -> Result<&mut Box<dyn GameEngine>, LobbyError> {
        match (&self.status, self.engine.as_mut()) {
            (LobbyStatus::Running, Some(engine)) => Ok(engine),
            _ => Err(LobbyError::NotRunning),
        }
    }

    fn settle(&mut self) {
        if self.engine.as_ref().is_some_and(|e| e.is_over()) {
            self.status = LobbyStatus::Finished;
        }
    }
}

#[derive(Debug)]
pub struct SessionManager {
    ctx: GameContext,
    games: Arc<GameRegistry>,
    notifier: Arc<dyn Notifier>,
    lobbies: RwLock<HashMap<String, Arc<Mutex<Lobby>>>>,
    /// user id -> lobby id, for hosts and seated humans
    seated: RwLock<HashMap<String, String>>,
}

impl SessionManager {
    pub fn new(ctx: GameContext, games: Arc<GameRegistry>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ctx,
            games,
            notifier,
            lobbies: RwLock::new(HashMap::new()),
            seated: RwLock::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    fn outbox(&self, lobby_id: &str) -> Outbox {
        Outbox::new(
            lobby_id,
            self.notifier.clone(),
            self.ctx.config.pacing.delivery_timeout(),
        )
    }

    async fn lobby(&self, lobby_id: &str) -> Result<Arc<Mutex<Lobby>>, LobbyError> {
        self.lobbies
            .read()
            .await
            .get(lobby_id)
            .cloned()
            .ok_or_else(|| LobbyError::NotFound(lobby_id.to_string()))
    }

    async fn lobby_of(&self, user_id: &str) -> Result<Arc<Mutex<Lobby>>, LobbyError> {
        let lobby_id = self
            .seated
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| LobbyError::NotSeated(user_id.to_string()))?;
        self.lobby(&lobby_id).await
    }

    /// Open a lobby. With `host_name` the host takes the first seat; without
    /// it they only spectate and manage the lobby.
    pub async fn create_lobby(
        &self,
        game: &str,
        host_user: &str,
        host_name: Option<&str>,
    ) -> Result<String, LobbyError> {
        let descriptor = self
            .games
            .get(game)
            .ok_or_else(|| LobbyError::UnknownGame(game.to_string()))?;

        let mut seated = self.seated.write().await;
        if seated.contains_key(host_user) {
            return Err(LobbyError::AlreadySeated(host_user.to_string()));
        }

        let id = Uuid::new_v4().simple().to_string();
        let seats = host_name
            .map(|name| vec![SeatRequest::human(name.trim(), host_user)])
            .unwrap_or_default();
        let lobby = Lobby {
            id: id.clone(),
            game: descriptor.key,
            host: host_user.to_string(),
            seats,
            status: LobbyStatus::Open,
            engine: None,
        };

        self.lobbies
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(lobby)));
        seated.insert(host_user.to_string(), id.clone());
        tracing::info!(lobby = %id, game = descriptor.key, host = host_user, "Lobby created");
        Ok(id)
    }

    pub async fn join(&self, lobby_id: &str, user_id: &str, name: &str) -> Result<LobbySummary, LobbyError> {
        let lobby = self.lobby(lobby_id).await?;
        let mut lobby = lobby.lock().await;
        let mut seated = self.seated.write().await;
        if seated.contains_key(user_id) {
            return Err(LobbyError::AlreadySeated(user_id.to_string()));
        }
        if lobby.status != LobbyStatus::Open {
            return Err(LobbyError::NotOpen);
        }
        let max = self.ctx.config.session.max_seats;
        if lobby.seats.len() >= max {
            return Err(LobbyError::Full { max });
        }
        if lobby.has_name(name) {
            return Err(LobbyError::DuplicateName(name.to_string()));
        }

        lobby.seats.push(SeatRequest::human(name.trim(), user_id));
        seated.insert(user_id.to_string(), lobby_id.to_string());
        tracing::info!(lobby = %lobby_id, user = user_id, name, "Player joined");
        Ok(lobby.summary())
    }

    /// Fill seats with agents. Names come from the catalog, then "Bot N".
    pub async fn add_bots(&self, lobby_id: &str, user_id: &str, count: usize) -> Result<Vec<String>, LobbyError> {
        let lobby = self.lobby(lobby_id).await?;
        let mut lobby = lobby.lock().await;
        if lobby.host != user_id {
            return Err(LobbyError::NotHost);
        }
        if lobby.status != LobbyStatus::Open {
            return Err(LobbyError::NotOpen);
        }

        let max = self.ctx.config.session.max_seats;
        let room = max.saturating_sub(lobby.seats.len());
        if count > room {
            return Err(LobbyError::Full { max });
        }

        let mut added = Vec::with_capacity(count);
        let mut pool = self.ctx.config.catalog.bot_names.iter();
        let mut fallback = 0;
        while added.len() < count {
            let name = match pool.next() {
                Some(name) => name.clone(),
                None => {
                    fallback += 1;
                    format!("Bot {}", fallback)
                }
            };
            if lobby.has_name(&name) {
                continue;
            }
            lobby.seats.push(SeatRequest::bot(&name));
            added.push(name);
        }
        tracing::debug!(lobby = %lobby_id, bots = ?added, "Bots added");
        Ok(added)
    }

    /// Deal the game and run it until a human must act.
    ///
    /// A failed scenario generation aborts the session: every seat is told,
    /// and the lobby is dropped.
    pub async fn start(&self, lobby_id: &str, user_id: &str) -> Result<Vec<GameEvent>, LobbyError> {
        let lobby_arc = self.lobby(lobby_id).await?;
        let mut lobby = lobby_arc.lock().await;
        if lobby.host != user_id {
            return Err(LobbyError::NotHost);
        }
        if lobby.status != LobbyStatus::Open {
            return Err(LobbyError::NotOpen);
        }
        let need = self.ctx.config.session.min_seats;
        if lobby.seats.len() < need {
            return Err(LobbyError::NotEnoughSeats {
                have: lobby.seats.len(),
                need,
            });
        }

        let descriptor = self
            .games
            .get(lobby.game)
            .ok_or_else(|| LobbyError::UnknownGame(lobby.game.to_string()))?;
        let mut engine = (descriptor.factory)(lobby_id);
        let mut out = self.outbox(lobby_id);
        let seats = lobby.seats.clone();

        if let Err(e) = engine.init(&self.ctx, &seats, &mut out).await {
            tracing::error!(lobby = %lobby_id, error = %e, "Session creation failed");
            out.emit(GameEvent::broadcast(
                EventKind::Message,
                format!("The game could not start and was cancelled: {}", e),
            ))
            .await;
            lobby.status = LobbyStatus::Finished;
            let users = lobby.user_ids();
            drop(lobby);
            self.drop_lobby(lobby_id, &users).await;
            return Err(e.into());
        }

        lobby.status = LobbyStatus::Running;
        let result = engine.process_turn(&self.ctx, &mut out).await;
        lobby.engine = Some(engine);
        lobby.settle();
        result?;
        Ok(out.into_events())
    }

    /// Free-text input from a seated user
    pub async fn route_message(&self, user_id: &str, text: &str) -> Result<Vec<GameEvent>, LobbyError> {
        let lobby = self.lobby_of(user_id).await?;
        let mut lobby = lobby.lock().await;
        let mut out = self.outbox(&lobby.id);
        let result = lobby
            .running_engine()?
            .process_message(&self.ctx, user_id, text, &mut out)
            .await;
        lobby.settle();
        result?;
        Ok(out.into_events())
    }

    /// Reply-button input from a seated user
    pub async fn route_action(&self, user_id: &str, data: &str) -> Result<Vec<GameEvent>, LobbyError> {
        let lobby = self.lobby_of(user_id).await?;
        let mut lobby = lobby.lock().await;
        let mut out = self.outbox(&lobby.id);
        let result = lobby
            .running_engine()?
            .handle_action(&self.ctx, user_id, data, &mut out)
            .await;
        lobby.settle();
        result?;
        Ok(out.into_events())
    }

    /// Leave the lobby or the running game. A host leaving an open lobby
    /// closes it.
    pub async fn leave(&self, user_id: &str) -> Result<Vec<GameEvent>, LobbyError> {
        let lobby_arc = self.lobby_of(user_id).await?;
        let mut lobby = lobby_arc.lock().await;
        let lobby_id = lobby.id.clone();
        let mut out = self.outbox(&lobby_id);

        match lobby.status {
            LobbyStatus::Open if lobby.host == user_id => {
                out.emit(GameEvent::broadcast(EventKind::Message, "The host closed the lobby."))
                    .await;
                let users = lobby.user_ids();
                drop(lobby);
                self.drop_lobby(&lobby_id, &users).await;
                return Ok(out.into_events());
            }
            LobbyStatus::Open => {
                lobby.seats.retain(|s| s.user_id.as_deref() != Some(user_id));
            }
            LobbyStatus::Running => {
                let result = lobby
                    .running_engine()?
                    .player_leave(&self.ctx, user_id, &mut out)
                    .await;
                lobby.settle();
                result?;
            }
            LobbyStatus::Finished => {}
        }
        drop(lobby);

        self.seated.write().await.remove(user_id);
        tracing::info!(lobby = %lobby_id, user = user_id, "User left");
        Ok(out.into_events())
    }

    pub async fn view(&self, user_id: &str) -> Option<PlayerView> {
        let lobby = self.lobby_of(user_id).await.ok()?;
        let lobby = lobby.lock().await;
        lobby.engine.as_ref()?.player_view(&self.ctx, user_id)
    }

    pub async fn summary(&self, lobby_id: &str) -> Option<LobbySummary> {
        let lobby = self.lobby(lobby_id).await.ok()?;
        let summary = lobby.lock().await.summary();
        Some(summary)
    }

    /// Drop every finished session; returns how many were closed
    pub async fn close_finished(&self) -> usize {
        let lobbies: Vec<Arc<Mutex<Lobby>>> = self.lobbies.read().await.values().cloned().collect();
        let finished: Vec<(String, Vec<String>)> = futures::future::join_all(lobbies.iter().map(|l| async move {
            let lobby = l.lock().await;
            (lobby.status == LobbyStatus::Finished).then(|| (lobby.id.clone(), lobby.user_ids()))
        }))
        .await
        .into_iter()
        .flatten()
        .collect();

        for (id, users) in &finished {
            self.drop_lobby(id, users).await;
        }
        finished.len()
    }

    pub async fn lobby_count(&self) -> usize {
        self.lobbies.read().await.len()
    }

    async fn drop_lobby(&self, lobby_id: &str, users: &[String]) {
        self.lobbies.write().await.remove(lobby_id);
        let mut seated = self.seated.write().await;
        for user in users {
            if seated.get(user).is_some_and(|l| l == lobby_id) {
                seated.remove(user);
            }
        }
        tracing::info!(lobby = %lobby_id, "Lobby closed");
    }
}
