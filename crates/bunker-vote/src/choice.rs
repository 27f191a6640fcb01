//! Agent vote choice

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Where an agent's vote came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceSource {
    /// The model named a valid candidate
    Model,
    /// Highest perceived threat
    ThreatRanking,
    /// No usable suggestion and no threat data
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteChoice {
    pub target: String,
    pub source: ChoiceSource,
}

/// Pick a vote for an agent.
///
/// `suggested` is the model's answer, `ranking` the observer's threat ranking
/// over `valid` (highest first, ties in candidate order). The suggestion wins
/// when it names a valid candidate; otherwise the top-ranked target, or a
/// uniformly random candidate when nobody carries any threat.
pub fn choose_vote<R: Rng + ?Sized>(
    suggested: Option<&str>,
    ranking: &[(String, f64)],
    valid: &[String],
    rng: &mut R,
) -> Option<VoteChoice> {
    if let Some(name) = suggested.map(str::trim) {
        if let Some(target) = valid.iter().find(|v| v.eq_ignore_ascii_case(name)) {
            return Some(VoteChoice {
                target: target.clone(),
                source: ChoiceSource::Model,
            });
        }
        tracing::debug!(suggested = name, "Model suggested an invalid vote target");
    }

    if let Some((target, _)) = ranking
        .iter()
        .find(|(name, score)| *score > 0.0 && valid.contains(name))
    {
        return Some(VoteChoice {
            target: target.clone(),
            source: ChoiceSource::ThreatRanking,
        });
    }

    valid.choose(rng).map(|target| VoteChoice {
        target: target.clone(),
        source: ChoiceSource::Random,
    })
}
