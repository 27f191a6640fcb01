//! Phases and per-session game state

use serde::{Deserialize, Serialize};
use std::fmt;

use bunker_core::{ParticipantRegistry, Scenario, Transcript};
use bunker_vote::RunoffState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Presentation,
    Discussion,
    Voting,
    Runoff,
}

impl Phase {
    /// Phases in which participants take speaking turns
    pub fn is_speaking(&self) -> bool {
        !matches!(self, Self::Voting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Presentation => "presentation",
            Self::Discussion => "discussion",
            Self::Voting => "voting",
            Self::Runoff => "runoff",
        })
    }
}

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Alive count reached the survivor target
    Victory,
    /// Every human was eliminated
    Defeat,
}

impl Outcome {
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Victory => "The bunker door seals. The survivors made it.",
            Self::Defeat => "No humans are left in the bunker. The machines keep the shelter.",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    /// Starts at 1
    pub round: u32,
    pub phase: Phase,
    /// Append-only for the whole game
    pub transcript: Transcript,
    pub runoff: RunoffState,
    /// Fixed at init
    pub scenario: Scenario,
    pub outcome: Option<Outcome>,
}

impl GameState {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            round: 1,
            phase: Phase::Presentation,
            transcript: Transcript::new(),
            runoff: RunoffState::default(),
            scenario,
            outcome: None,
        }
    }

    pub fn topic(&self) -> &str {
        self.scenario.topic_for_round(self.round)
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// `phase == Runoff` implies a non-empty candidate set of alive participants
    pub fn runoff_consistent(&self, registry: &ParticipantRegistry) -> bool {
        if self.phase != Phase::Runoff {
            return true;
        }
        !self.runoff.candidates.is_empty()
            && self
                .runoff
                .candidates
                .iter()
                .all(|c| registry.by_name(c).is_some_and(|p| p.alive))
    }
}
