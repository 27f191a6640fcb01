//! Game engine capability trait
//!
//! Every game variant implements [`GameEngine`]. The session manager only
//! knows this trait; variants are looked up in the static
//! [`GameRegistry`](crate::registry::GameRegistry).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bunker_core::{OwnCard, PublicView, RegistryError, SeatRequest};
use bunker_vote::CastOutcome;

use crate::context::GameContext;
use crate::events::{EventKind, GameEvent};
use crate::notify::Outbox;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Scenario generation failed: {0}")]
    ScenarioGeneration(String),
    #[error("Game has not been initialised")]
    NotStarted,
    #[error("Not enough participants: {have} seated, {need} needed")]
    NotEnoughParticipants { have: usize, need: usize },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// An invalid player action. Shown to the actor only; game state is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotSeated,
    Eliminated,
    GameOver,
    NotYourTurn,
    EmptyMessage,
    VotingInProgress,
    NotVoting,
    ExpiredBallot,
    UnknownAction,
    Ballot(CastOutcome),
}

impl Rejection {
    pub fn notice(&self) -> &'static str {
        match self {
            Self::NotSeated => "You are not seated in this game.",
            Self::Eliminated => "You have been eliminated and can only watch.",
            Self::GameOver => "The game is over.",
            Self::NotYourTurn => "It is not your turn.",
            Self::EmptyMessage => "Say something first.",
            Self::VotingInProgress => "Voting is in progress. Use the ballot.",
            Self::NotVoting => "There is no vote right now.",
            Self::ExpiredBallot => "This ballot has expired.",
            Self::UnknownAction => "Unknown action.",
            Self::Ballot(outcome) => outcome.notice(),
        }
    }

    /// Notice addressed to the actor only
    pub fn event(&self, user_id: &str, kind: EventKind) -> GameEvent {
        GameEvent::to(user_id, kind, self.notice())
    }
}

/// What one participant may see of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub game: String,
    pub round: u32,
    pub phase: String,
    pub topic: String,
    pub catastrophe: String,
    /// Name of the participant whose turn it is
    pub active: Option<String>,
    /// Own full card; absent for spectators
    pub own: Option<OwnCard>,
    /// Visibility-gated view of every participant
    pub table: Vec<PublicView>,
    pub finished: bool,
}

/// A playable game variant. All mutation happens through `&mut self`, so one
/// session is always processed strictly sequentially.
#[async_trait]
pub trait GameEngine: Send + Sync + std::fmt::Debug {
    /// Registry key of this variant
    fn key(&self) -> &'static str;

    /// Deal seats and pick or generate the scenario
    async fn init(
        &mut self,
        ctx: &GameContext,
        seats: &[SeatRequest],
        out: &mut Outbox,
    ) -> Result<(), EngineError>;

    /// Drive the game until it needs human input or ends
    async fn process_turn(&mut self, ctx: &GameContext, out: &mut Outbox) -> Result<(), EngineError>;

    /// Speak for one agent-controlled participant
    async fn execute_bot_turn(
        &mut self,
        ctx: &GameContext,
        participant: bunker_core::ParticipantId,
        out: &mut Outbox,
    ) -> Result<(), EngineError>;

    /// Free-text input from a human
    async fn process_message(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        text: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError>;

    /// Reply-button input from a human
    async fn handle_action(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        data: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError>;

    async fn player_leave(
        &mut self,
        ctx: &GameContext,
        user_id: &str,
        out: &mut Outbox,
    ) -> Result<(), EngineError>;

    fn player_view(&self, ctx: &GameContext, user_id: &str) -> Option<PlayerView>;

    fn is_over(&self) -> bool;
}
