//! Participant types for Bunker
//!
//! A [`Participant`] is one seat at the table: a human reached through an
//! external user id, or an agent driven by the generation interface.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a participant within a session
pub type ParticipantId = Uuid;

/// Who controls a seat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Controller {
    /// A person, addressed by the transport's user id
    Human { user_id: String },
    /// An agent played by the model
    Bot,
}

/// Derived suspicion status; exactly one holds at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Normal,
    Suspicious,
    Liar,
    Biohazard,
    Impostor,
    /// Forced by repeated useless contributions
    DeadWeight,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "NORMAL",
            Self::Suspicious => "SUSPICIOUS",
            Self::Liar => "LIAR",
            Self::Biohazard => "BIOHAZARD",
            Self::Impostor => "IMPOSTOR",
            Self::DeadWeight => "DEAD_WEIGHT",
        };
        f.write_str(label)
    }
}

/// How an observer perceives each violation category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub name: String,
    /// Short description fed to the speech prompt
    pub description: String,
    /// Per-factor perception multiplier (missing = 1.0)
    #[serde(default)]
    pub multipliers: BTreeMap<String, f64>,
}

impl PersonalityProfile {
    pub fn new(name: &str, description: &str, multipliers: &[(&str, f64)]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            multipliers: multipliers
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }

    /// Neutral observer, used as the backfill default
    pub fn balanced() -> Self {
        Self::new("Balanced", "Calm and even-handed.", &[])
    }

    pub fn multiplier(&self, factor: &str) -> f64 {
        self.multipliers.get(factor).copied().unwrap_or(1.0)
    }
}

/// Hidden attributes dealt at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub profession: String,
    /// Personal trait, revealed in later rounds
    pub personal_trait: String,
    pub personality: PersonalityProfile,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            profession: "Unemployed".to_string(),
            personal_trait: "Nothing remarkable".to_string(),
            personality: PersonalityProfile::balanced(),
        }
    }
}

/// A seat at the table.
///
/// Attributes and suspicion state stay inside this crate; other layers see
/// them through [`PublicView`] or the registry's [`OwnCard`](crate::OwnCard).
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub controller: Controller,
    pub alive: bool,
    pub(crate) attributes: Attributes,
    /// Violation tag -> current weighted intensity
    pub(crate) active_factors: BTreeMap<String, f64>,
    pub(crate) status: Status,
    /// Every violation tag ever judged, in order
    pub(crate) violations: Vec<String>,
    /// Most recent utterance, fed back to the agent to avoid repetition
    pub(crate) last_speech: Option<String>,
}

impl Participant {
    fn with_controller(name: &str, controller: Controller, attributes: Attributes) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            controller,
            alive: true,
            attributes,
            active_factors: BTreeMap::new(),
            status: Status::Normal,
            violations: Vec::new(),
            last_speech: None,
        }
    }

    pub fn human(name: &str, user_id: &str, attributes: Attributes) -> Self {
        Self::with_controller(
            name,
            Controller::Human {
                user_id: user_id.to_string(),
            },
            attributes,
        )
    }

    pub fn bot(name: &str, attributes: Attributes) -> Self {
        Self::with_controller(name, Controller::Bot, attributes)
    }

    pub fn is_human(&self) -> bool {
        matches!(self.controller, Controller::Human { .. })
    }

    /// Transport user id for humans
    pub fn user_id(&self) -> Option<&str> {
        match &self.controller {
            Controller::Human { user_id } => Some(user_id),
            Controller::Bot => None,
        }
    }

    pub fn last_speech(&self) -> Option<&str> {
        self.last_speech.as_deref()
    }

    pub(crate) fn total_suspicion(&self) -> f64 {
        crate::suspicion::total_suspicion(&self.active_factors)
    }
}

/// Visibility-gated projection of a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicView {
    pub id: ParticipantId,
    pub name: String,
    pub alive: bool,
    pub profession: String,
    pub personal_trait: Option<String>,
    pub status: Option<Status>,
}

impl fmt::Display for PublicView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.profession)?;
        if let Some(t) = &self.personal_trait {
            write!(f, ", trait: {}", t)?;
        }
        if let Some(s) = &self.status {
            write!(f, " [{}]", s)?;
        }
        if !self.alive {
            f.write_str(" - eliminated")?;
        }
        Ok(())
    }
}
