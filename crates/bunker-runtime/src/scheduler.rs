//! Turn scheduler

use bunker_core::{ParticipantId, ParticipantRegistry};

use crate::phase::{GameState, Phase};

/// Participants who act in the current phase, in seating order: runoff
/// candidates during a runoff, otherwise everyone alive.
pub fn current_active_list(state: &GameState, registry: &ParticipantRegistry) -> Vec<ParticipantId> {
    registry
        .alive()
        .filter(|p| {
            state.phase != Phase::Runoff
                || state
                    .runoff
                    .candidates
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&p.name))
        })
        .map(|p| p.id)
        .collect()
}

/// Position in the speaking order of one phase.
///
/// The order is captured when the phase starts and does not change until the
/// next phase, even if a participant leaves mid-phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnCursor {
    order: Vec<ParticipantId>,
    index: usize,
}

impl TurnCursor {
    pub fn start(order: Vec<ParticipantId>) -> Self {
        Self { order, index: 0 }
    }

    pub fn order(&self) -> &[ParticipantId] {
        &self.order
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Participant whose turn it is; `None` once the phase is complete
    pub fn current(&self) -> Option<ParticipantId> {
        self.order.get(self.index).copied()
    }

    /// Move to the next speaker; returns whether the phase is complete
    pub fn advance(&mut self) -> bool {
        if self.index < self.order.len() {
            self.index += 1;
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.index >= self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunker_core::{Attributes, Participant, Scenario};

    fn table() -> (ParticipantRegistry, Vec<ParticipantId>) {
        let mut registry = ParticipantRegistry::default();
        let ids = ["Ann", "Vera", "Oleg", "Mira"]
            .iter()
            .map(|n| registry.insert(Participant::bot(n, Attributes::default())).unwrap())
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_active_list_skips_eliminated() {
        let (mut registry, ids) = table();
        let state = GameState::new(Scenario::new("T", "C", &[]));
        registry.eliminate(ids[1]).unwrap();

        assert_eq!(current_active_list(&state, &registry), vec![ids[0], ids[2], ids[3]]);
    }

    #[test]
    fn test_active_list_in_runoff_keeps_seating_order() {
        let (registry, ids) = table();
        let mut state = GameState::new(Scenario::new("T", "C", &[]));
        state.phase = Phase::Runoff;
        state.runoff.begin(vec!["Mira".into(), "Vera".into()]);

        assert_eq!(current_active_list(&state, &registry), vec![ids[1], ids[3]]);
    }

    #[test]
    fn test_order_is_stable_within_phase() {
        let (mut registry, ids) = table();
        let state = GameState::new(Scenario::new("T", "C", &[]));
        let cursor = TurnCursor::start(current_active_list(&state, &registry));

        registry.eliminate(ids[2]).unwrap();
        assert_eq!(cursor.order(), ids.as_slice());
        assert_eq!(cursor.order(), ids.as_slice());
    }

    #[test]
    fn test_cursor_bounds() {
        let (_, ids) = table();
        let mut cursor = TurnCursor::start(ids[..2].to_vec());
        assert_eq!(cursor.current(), Some(ids[0]));
        assert!(!cursor.advance());
        assert!(cursor.advance());
        assert!(cursor.advance());
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.current(), None);
    }
}
