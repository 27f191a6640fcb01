//! Runoff bookkeeping

use serde::{Deserialize, Serialize};

/// Tied leaders of the last vote and how many runoffs this round has used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunoffState {
    /// Empty unless a tie occurred
    pub candidates: Vec<String>,
    /// Runoffs started this round
    pub count: u32,
}

impl RunoffState {
    pub fn is_active(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// Whether another runoff may start under `max_runoffs`
    pub fn can_retry(&self, max_runoffs: u32) -> bool {
        self.count < max_runoffs
    }

    /// Start a runoff among `candidates`
    pub fn begin(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.count += 1;
    }

    /// Drop a candidate who left the game
    pub fn withdraw(&mut self, name: &str) {
        self.candidates.retain(|c| !c.eq_ignore_ascii_case(name));
    }

    /// Forget everything; called when a new round starts
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runoff_lifecycle() {
        let mut runoff = RunoffState::default();
        assert!(!runoff.is_active());
        assert!(runoff.can_retry(1));

        runoff.begin(vec!["Vera".into(), "Oleg".into()]);
        assert!(runoff.is_active());
        assert_eq!(runoff.count, 1);
        assert!(!runoff.can_retry(1));

        runoff.withdraw("oleg");
        assert_eq!(runoff.candidates, vec!["Vera".to_string()]);

        runoff.reset();
        assert_eq!(runoff, RunoffState::default());
    }
}
