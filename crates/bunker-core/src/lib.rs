//! # Bunker Core
//!
//! Core types for the Bunker game:
//! - [`Participant`] - a human or agent seat with hidden attributes
//! - [`ParticipantRegistry`] - dealing, lookup and visibility-gated views
//! - [`suspicion`] - verdict folding, status ladder and threat scores
//! - [`Scenario`] - catastrophe and round topics
//! - [`GameConfig`] - rules shared read-only by every session

pub mod config;
pub mod participant;
pub mod registry;
pub mod scenario;
pub mod suspicion;
pub mod transcript;

pub use config::{
    ConfigError, DirectorConfig, GameConfig, PacingConfig, SessionConfig, VisibilityConfig,
    VotingRules,
};
pub use participant::{Attributes, Controller, Participant, ParticipantId, PersonalityProfile, PublicView, Status};
pub use registry::{OwnCard, ParticipantRegistry, RegistryError, SeatRequest};
pub use scenario::{Scenario, ScenarioCatalog};
pub use suspicion::{ArgumentQuality, SuspicionRules, Verdict};
pub use transcript::{LineKind, Transcript, TranscriptLine};
