//! Participant registry
//!
//! Owns every [`Participant`] of one session, in seating order. Other layers
//! read participants through public views and mutate them through the
//! registry's narrow operations.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::VisibilityConfig;
use crate::participant::{Attributes, Participant, ParticipantId, PublicView, Status};
use crate::scenario::ScenarioCatalog;
use crate::suspicion::{self, SuspicionRules, Verdict};

/// Registry errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Participant not found: {0}")]
    NotFound(String),
    #[error("Duplicate participant name: {0}")]
    DuplicateName(String),
}

/// A seat requested before dealing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatRequest {
    pub name: String,
    /// Present for humans
    pub user_id: Option<String>,
}

impl SeatRequest {
    pub fn human(name: &str, user_id: &str) -> Self {
        Self {
            name: name.to_string(),
            user_id: Some(user_id.to_string()),
        }
    }

    pub fn bot(name: &str) -> Self {
        Self {
            name: name.to_string(),
            user_id: None,
        }
    }
}

/// Own card shown to a participant: everything about themself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnCard {
    pub name: String,
    pub attributes: Attributes,
    pub status: Status,
    pub alive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    /// Deal professions, traits and personalities from shuffled pools without
    /// replacement, backfilling with defaults once a pool runs dry
    pub fn deal<R: Rng + ?Sized>(
        seats: &[SeatRequest],
        catalog: &ScenarioCatalog,
        rng: &mut R,
    ) -> Result<Self, RegistryError> {
        let mut professions = catalog.professions.clone();
        let mut traits = catalog.traits.clone();
        let mut personalities = catalog.personalities.clone();
        professions.shuffle(rng);
        traits.shuffle(rng);
        personalities.shuffle(rng);

        let defaults = Attributes::default();
        let mut registry = Self::default();
        for seat in seats {
            let attributes = Attributes {
                profession: professions
                    .pop()
                    .unwrap_or_else(|| defaults.profession.clone()),
                personal_trait: traits
                    .pop()
                    .unwrap_or_else(|| defaults.personal_trait.clone()),
                personality: personalities
                    .pop()
                    .unwrap_or_else(|| defaults.personality.clone()),
            };
            let participant = match &seat.user_id {
                Some(uid) => Participant::human(&seat.name, uid, attributes),
                None => Participant::bot(&seat.name, attributes),
            };
            registry.insert(participant)?;
        }

        tracing::debug!(seats = registry.len(), "Participants dealt");
        Ok(registry)
    }

    /// Add a participant; names are unique (case-insensitive)
    pub fn insert(&mut self, participant: Participant) -> Result<ParticipantId, RegistryError> {
        if self.by_name(&participant.name).is_some() {
            return Err(RegistryError::DuplicateName(participant.name));
        }
        let id = participant.id;
        self.participants.push(participant);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// All participants in seating order
    pub fn all(&self) -> &[Participant] {
        &self.participants
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: ParticipantId) -> Result<&mut Participant, RegistryError> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    pub fn by_name(&self, name: &str) -> Option<&Participant> {
        let name = name.trim();
        self.participants
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn by_user(&self, user_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.user_id() == Some(user_id))
    }

    /// Alive participants in seating order
    pub fn alive(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn alive_humans(&self) -> usize {
        self.alive().filter(|p| p.is_human()).count()
    }

    pub fn has_humans(&self) -> bool {
        self.participants.iter().any(|p| p.is_human())
    }

    /// Alive participant other than `observer` with the highest total
    /// suspicion, provided it reaches `threshold`
    pub fn most_suspicious(&self, observer: ParticipantId, threshold: f64) -> Option<&str> {
        self.alive()
            .filter(|p| p.id != observer)
            .map(|p| (p, p.total_suspicion()))
            .filter(|(_, total)| *total >= threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(p, _)| p.name.as_str())
    }

    /// Mark a participant as eliminated
    pub fn eliminate(&mut self, id: ParticipantId) -> Result<(), RegistryError> {
        let participant = self.get_mut(id)?;
        participant.alive = false;
        tracing::info!(participant = %participant.name, "Participant eliminated");
        Ok(())
    }

    /// Judge outcome for one utterance; returns the new status
    pub fn apply_verdict(
        &mut self,
        id: ParticipantId,
        verdict: &Verdict,
        rules: &SuspicionRules,
    ) -> Result<Status, RegistryError> {
        let participant = self.get_mut(id)?;
        suspicion::apply(participant, verdict, rules);
        Ok(participant.status)
    }

    pub fn record_speech(&mut self, id: ParticipantId, text: &str) -> Result<(), RegistryError> {
        self.get_mut(id)?.last_speech = Some(text.to_string());
        Ok(())
    }

    /// Threat of each candidate as perceived by `observer`, highest first.
    /// Ties keep candidate order.
    pub fn threat_ranking(
        &self,
        observer: ParticipantId,
        candidates: &[String],
    ) -> Result<Vec<(String, f64)>, RegistryError> {
        let observer = self
            .get(observer)
            .ok_or_else(|| RegistryError::NotFound(observer.to_string()))?;
        let personality = &observer.attributes.personality;

        let mut ranked: Vec<(String, f64)> = candidates
            .iter()
            .filter_map(|name| self.by_name(name))
            .map(|target| (target.name.clone(), suspicion::threat_score(personality, target)))
            .collect();
        // stable sort: equal scores stay in candidate order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }

    /// Visibility-gated projection for the given round
    pub fn public_view(&self, participant: &Participant, round: u32, vis: &VisibilityConfig) -> PublicView {
        PublicView {
            id: participant.id,
            name: participant.name.clone(),
            alive: participant.alive,
            profession: participant.attributes.profession.clone(),
            personal_trait: vis
                .traits_visible(round)
                .then(|| participant.attributes.personal_trait.clone()),
            status: vis.status_visible(round).then_some(participant.status),
        }
    }

    /// Public views of everybody, in seating order
    pub fn public_table(&self, round: u32, vis: &VisibilityConfig) -> Vec<PublicView> {
        self.participants
            .iter()
            .map(|p| self.public_view(p, round, vis))
            .collect()
    }

    pub fn own_card(&self, id: ParticipantId) -> Option<OwnCard> {
        self.get(id).map(|p| OwnCard {
            name: p.name.clone(),
            attributes: p.attributes.clone(),
            status: p.status,
            alive: p.alive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suspicion::ArgumentQuality;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn seats(n: usize) -> Vec<SeatRequest> {
        (0..n).map(|i| SeatRequest::bot(&format!("Bot{}", i))).collect()
    }

    #[test]
    fn test_deal_without_replacement() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(7);
        let registry = ParticipantRegistry::deal(&seats(6), &catalog, &mut rng).unwrap();

        let professions: HashSet<_> = registry
            .all()
            .iter()
            .map(|p| p.attributes.profession.clone())
            .collect();
        assert_eq!(professions.len(), 6);
    }

    #[test]
    fn test_deal_backfills_when_pool_exhausted() {
        let mut catalog = ScenarioCatalog::default();
        catalog.professions = vec!["Medic".to_string()];
        catalog.personalities.clear();
        let mut rng = StdRng::seed_from_u64(1);
        let registry = ParticipantRegistry::deal(&seats(3), &catalog, &mut rng).unwrap();

        let defaults = Attributes::default();
        let medics = registry
            .all()
            .iter()
            .filter(|p| p.attributes.profession == "Medic")
            .count();
        assert_eq!(medics, 1);
        assert!(registry
            .all()
            .iter()
            .all(|p| p.attributes.personality == defaults.personality));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(3);
        let result = ParticipantRegistry::deal(
            &[SeatRequest::bot("Ann"), SeatRequest::human("ann", "u1")],
            &catalog,
            &mut rng,
        );
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateName("ann".to_string()));
    }

    #[test]
    fn test_lookup_and_alive_filter() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut registry = ParticipantRegistry::deal(
            &[SeatRequest::human("Ann", "u1"), SeatRequest::bot("Bo"), SeatRequest::bot("Cy")],
            &catalog,
            &mut rng,
        )
        .unwrap();

        let bo = registry.by_name(" bo ").unwrap().id;
        assert_eq!(registry.by_user("u1").unwrap().name, "Ann");
        registry.eliminate(bo).unwrap();

        let alive: Vec<_> = registry.alive().map(|p| p.name.as_str()).collect();
        assert_eq!(alive, vec!["Ann", "Cy"]);
        assert_eq!(registry.alive_humans(), 1);
    }

    #[test]
    fn test_public_view_is_round_gated() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(11);
        let registry = ParticipantRegistry::deal(&seats(2), &catalog, &mut rng).unwrap();
        let vis = VisibilityConfig::default();
        let p = &registry.all()[0];

        let r1 = registry.public_view(p, 1, &vis);
        assert!(r1.personal_trait.is_none());
        assert!(r1.status.is_none());

        let r3 = registry.public_view(p, 3, &vis);
        assert_eq!(r3.personal_trait.as_deref(), Some(p.attributes.personal_trait.as_str()));
        assert_eq!(r3.status, Some(Status::Normal));
    }

    #[test]
    fn test_threat_ranking_is_stable_on_ties() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut registry = ParticipantRegistry::deal(&seats(4), &catalog, &mut rng).unwrap();
        let rules = SuspicionRules::default();
        let observer = registry.all()[0].id;
        let liar = registry.all()[3].id;
        registry
            .apply_verdict(liar, &Verdict::new("liar", ArgumentQuality::Weak), &rules)
            .unwrap();

        let candidates = vec!["Bot1".to_string(), "Bot2".to_string(), "Bot3".to_string()];
        let ranked = registry.threat_ranking(observer, &candidates).unwrap();
        assert_eq!(ranked[0].0, "Bot3");
        assert_eq!(ranked[1].0, "Bot1");
        assert_eq!(ranked[2].0, "Bot2");
    }

    #[test]
    fn test_most_suspicious_respects_threshold_and_observer() {
        let catalog = ScenarioCatalog::default();
        let mut rng = StdRng::seed_from_u64(13);
        let mut registry = ParticipantRegistry::deal(&seats(3), &catalog, &mut rng).unwrap();
        let rules = SuspicionRules::default();
        let bot0 = registry.all()[0].id;
        let bot1 = registry.all()[1].id;
        assert_eq!(registry.most_suspicious(bot0, 30.0), None);

        registry
            .apply_verdict(bot1, &Verdict::new("liar", ArgumentQuality::Weak), &rules)
            .unwrap();
        assert_eq!(registry.most_suspicious(bot0, 30.0), Some("Bot1"));
        assert_eq!(registry.most_suspicious(bot0, 60.0), None);
        assert_eq!(registry.most_suspicious(bot1, 30.0), None);
    }
}
