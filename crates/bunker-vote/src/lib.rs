//! # Bunker Vote
//!
//! Voting resolution for one session.
//!
//! ## Key Types
//!
//! - [`BallotBox`] - ballots of the current voting phase, one per voter
//! - [`VoteScope`] - who may vote and which names are on the ballot
//! - [`RunoffState`] - tied leaders and the runoff counter
//! - [`resolve`] - plurality with a bounded runoff and forced tie-break
//! - [`choose_vote`] - an agent's vote from the model's answer or its threat ranking
//!
//! ## Quick Start
//!
//! ```rust
//! use bunker_core::VotingRules;
//! use bunker_vote::{resolve, BallotBox, Resolution, RunoffState, VoteScope};
//! use rand::SeedableRng;
//!
//! let names: Vec<String> = ["Ann", "Vera", "Oleg"].iter().map(|s| s.to_string()).collect();
//! let scope = VoteScope::new(names.clone(), names, false);
//!
//! let mut ballots = BallotBox::new();
//! ballots.cast(&scope, "Ann", "Oleg");
//! ballots.cast(&scope, "Vera", "Oleg");
//! ballots.cast(&scope, "Oleg", "Ann");
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let outcome = resolve(&ballots, scope.quota(), &RunoffState::default(), &VotingRules::default(), &mut rng);
//! assert!(matches!(outcome, Some(Resolution::Eliminate { ref name, .. }) if name == "Oleg"));
//! ```

pub mod ballot;
pub mod choice;
pub mod resolution;
pub mod runoff;

pub use ballot::{Ballot, BallotBox, CastOutcome, VoteScope};
pub use choice::{choose_vote, ChoiceSource, VoteChoice};
pub use resolution::{resolve, Resolution};
pub use runoff::RunoffState;
