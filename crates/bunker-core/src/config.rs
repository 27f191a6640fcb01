//! Game configuration
//!
//! A [`GameConfig`] is built once at startup and shared by reference between
//! every session. Values come from the defaults below, optionally layered with
//! a TOML file and `BUNKER__*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::scenario::ScenarioCatalog;
use crate::suspicion::SuspicionRules;

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Vote and runoff rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingRules {
    /// Extra voting rounds allowed after a tie before a random tie-break
    pub max_runoffs: u32,
    /// Whether a human may vote for themselves
    pub allow_self_vote: bool,
}

impl Default for VotingRules {
    fn default() -> Self {
        Self {
            max_runoffs: 1,
            allow_self_vote: false,
        }
    }
}

/// Pacing of bot turns and prompt context size
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause after each bot utterance
    pub bot_turn_delay_ms: u64,
    /// How many transcript lines an agent sees when speaking
    pub transcript_window: usize,
    /// Upper bound on one notification delivery
    pub delivery_timeout_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            bot_turn_delay_ms: 1500,
            transcript_window: 12,
            delivery_timeout_ms: 5000,
        }
    }
}

impl PacingConfig {
    pub fn bot_turn_delay(&self) -> Duration {
        Duration::from_millis(self.bot_turn_delay_ms)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

/// Hidden director nudges for agent speech
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Injection probability during presentation
    pub presentation_probability: f64,
    /// Injection probability during discussion and runoff
    pub discussion_probability: f64,
    /// Total suspicion above which a target counts as "clear" and a nudge is always injected
    pub clear_target_threshold: f64,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            presentation_probability: 0.2,
            discussion_probability: 0.6,
            clear_target_threshold: 100.0,
        }
    }
}

/// Round-dependent transparency of participant cards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// First round in which traits are public
    pub reveal_trait_from: u32,
    /// First round in which statuses are public
    pub reveal_status_from: u32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            reveal_trait_from: 2,
            reveal_status_from: 3,
        }
    }
}

impl VisibilityConfig {
    pub fn traits_visible(&self, round: u32) -> bool {
        round >= self.reveal_trait_from
    }

    pub fn status_visible(&self, round: u32) -> bool {
        round >= self.reveal_status_from
    }
}

/// Per-session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Alive count at or below which the survivors win
    pub target_survivors: usize,
    /// Minimum seats (humans + bots) needed to start
    pub min_seats: usize,
    /// Maximum seats in one lobby
    pub max_seats: usize,
    /// Bots added when the host does not choose
    pub default_bots: usize,
    /// Fixed RNG seed (random when absent)
    pub seed: Option<u64>,
    /// Ask the model for a fresh scenario instead of picking a preset
    pub generate_scenario: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target_survivors: 2,
            min_seats: 3,
            max_seats: 10,
            default_bots: 5,
            seed: None,
            generate_scenario: false,
        }
    }
}

/// Full game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub suspicion: SuspicionRules,
    pub voting: VotingRules,
    pub pacing: PacingConfig,
    pub director: DirectorConfig,
    pub visibility: VisibilityConfig,
    pub session: SessionConfig,
    pub catalog: ScenarioCatalog,
}

impl GameConfig {
    /// Load from an optional TOML file and `BUNKER__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("BUNKER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: GameConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(
            target_survivors = loaded.session.target_survivors,
            max_runoffs = loaded.voting.max_runoffs,
            "Game configuration loaded"
        );
        Ok(loaded)
    }

    /// Reject settings the state machine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.target_survivors == 0 {
            return Err(ConfigError::Invalid(
                "session.target_survivors must be at least 1".to_string(),
            ));
        }
        if self.session.min_seats <= self.session.target_survivors {
            return Err(ConfigError::Invalid(format!(
                "session.min_seats ({}) must exceed target_survivors ({})",
                self.session.min_seats, self.session.target_survivors
            )));
        }
        if self.session.max_seats < self.session.min_seats {
            return Err(ConfigError::Invalid(
                "session.max_seats must be >= session.min_seats".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.suspicion.strong_multiplier) {
            return Err(ConfigError::Invalid(
                "suspicion.strong_multiplier must be in [0, 1)".to_string(),
            ));
        }
        if self.suspicion.bad_multiplier <= 1.0 {
            return Err(ConfigError::Invalid(
                "suspicion.bad_multiplier must be > 1".to_string(),
            ));
        }
        for (name, p) in [
            ("presentation_probability", self.director.presentation_probability),
            ("discussion_probability", self.director.discussion_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!(
                    "director.{} must be a probability",
                    name
                )));
            }
        }
        if self.catalog.scenarios.is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.scenarios must contain at least one scenario".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voting.max_runoffs, 1);
        assert!(!config.voting.allow_self_vote);
        assert_eq!(config.suspicion.useless_escalation_threshold, 2);
    }

    #[test]
    fn test_visibility_by_round() {
        let vis = VisibilityConfig::default();
        assert!(!vis.traits_visible(1));
        assert!(vis.traits_visible(2));
        assert!(!vis.status_visible(2));
        assert!(vis.status_visible(3));
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[session]\ntarget_survivors = 3\nmin_seats = 5\n\n[voting]\nmax_runoffs = 2").unwrap();

        let config = GameConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.session.target_survivors, 3);
        assert_eq!(config.voting.max_runoffs, 2);
        // untouched sections keep their defaults
        assert_eq!(config.pacing.transcript_window, 12);
    }

    #[test]
    fn test_invalid_survivor_threshold() {
        let mut config = GameConfig::default();
        config.session.target_survivors = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
