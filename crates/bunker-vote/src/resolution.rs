//! Plurality resolution with a bounded runoff

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use bunker_core::VotingRules;

use crate::ballot::BallotBox;
use crate::runoff::RunoffState;

/// Outcome of a completed vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// A single participant leaves the bunker
    Eliminate {
        name: String,
        votes: usize,
        /// Picked at random among tied leaders after runoffs ran out
        forced: bool,
    },
    /// Tied leaders go to a runoff
    Runoff { candidates: Vec<String> },
}

/// Resolve once `quota` ballots are in; `None` while votes are still missing.
///
/// The caller applies the outcome: on `Runoff` it starts the runoff with
/// [`RunoffState::begin`], on `Eliminate` it removes the participant.
pub fn resolve<R: Rng + ?Sized>(
    ballots: &BallotBox,
    quota: usize,
    runoff: &RunoffState,
    rules: &VotingRules,
    rng: &mut R,
) -> Option<Resolution> {
    if ballots.len() < quota {
        return None;
    }
    let (mut leaders, votes) = ballots.leaders();

    match leaders.len() {
        0 => None,
        1 => leaders.pop().map(|name| Resolution::Eliminate {
            name,
            votes,
            forced: false,
        }),
        _ if runoff.can_retry(rules.max_runoffs) => {
            tracing::info!(candidates = ?leaders, attempt = runoff.count + 1, "Tie, starting runoff");
            Some(Resolution::Runoff { candidates: leaders })
        }
        _ => {
            let name = leaders.choose(rng)?.clone();
            tracing::info!(tied = ?leaders, chosen = %name, "Runoffs exhausted, forced tie-break");
            Some(Resolution::Eliminate {
                name,
                votes,
                forced: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot::VoteScope;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn table() -> VoteScope {
        let names: Vec<String> = ["Ann", "Vera", "Oleg", "Mira"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        VoteScope::new(names.clone(), names, false)
    }

    #[test]
    fn test_pending_until_quota() {
        let scope = table();
        let mut ballots = BallotBox::new();
        ballots.cast(&scope, "Ann", "Oleg");

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = resolve(&ballots, scope.quota(), &RunoffState::default(), &VotingRules::default(), &mut rng);
        assert_eq!(outcome, None);
    }

    #[test]
    fn test_single_leader() {
        let scope = table();
        let mut ballots = BallotBox::new();
        ballots.cast(&scope, "Ann", "Oleg");
        ballots.cast(&scope, "Vera", "Oleg");
        ballots.cast(&scope, "Oleg", "Ann");
        ballots.cast(&scope, "Mira", "Oleg");

        let mut rng = StdRng::seed_from_u64(1);
        let outcome = resolve(&ballots, 4, &RunoffState::default(), &VotingRules::default(), &mut rng);
        assert_eq!(
            outcome,
            Some(Resolution::Eliminate {
                name: "Oleg".into(),
                votes: 3,
                forced: false
            })
        );
    }

    #[test]
    fn test_tie_then_forced() {
        let scope = table();
        let mut ballots = BallotBox::new();
        ballots.cast(&scope, "Ann", "Oleg");
        ballots.cast(&scope, "Vera", "Mira");
        ballots.cast(&scope, "Oleg", "Mira");
        ballots.cast(&scope, "Mira", "Oleg");

        let mut rng = StdRng::seed_from_u64(7);
        let mut runoff = RunoffState::default();
        let rules = VotingRules::default();

        let first = resolve(&ballots, 4, &runoff, &rules, &mut rng);
        assert_eq!(
            first,
            Some(Resolution::Runoff {
                candidates: vec!["Oleg".into(), "Mira".into()]
            })
        );

        runoff.begin(vec!["Oleg".into(), "Mira".into()]);
        match resolve(&ballots, 4, &runoff, &rules, &mut rng) {
            Some(Resolution::Eliminate { name, forced, .. }) => {
                assert!(forced);
                assert!(name == "Oleg" || name == "Mira");
            }
            other => panic!("expected forced elimination, got {:?}", other),
        }
    }
}
