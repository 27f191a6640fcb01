//! Ballot box for one voting phase

use serde::{Deserialize, Serialize};

/// One recorded vote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: String,
    pub target: String,
}

/// Result of casting a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastOutcome {
    /// Recorded
    Accepted,
    /// Voter already has a ballot this phase; nothing changed
    AlreadyVoted,
    /// Voter is not alive or not seated
    NotEligible,
    /// Target is not a valid candidate this phase
    InvalidTarget,
    /// Self-votes are disabled
    SelfVote,
}

impl CastOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Short notice for the voter
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Accepted => "Vote accepted.",
            Self::AlreadyVoted => "You have already voted.",
            Self::NotEligible => "You cannot vote right now.",
            Self::InvalidTarget => "That player is not on the ballot.",
            Self::SelfVote => "You cannot vote for yourself.",
        }
    }
}

/// Who may vote, and for whom, in the current phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteScope {
    /// Alive participants, in seating order
    pub voters: Vec<String>,
    /// Runoff candidates when a runoff is active, otherwise every alive participant
    pub targets: Vec<String>,
    pub allow_self_vote: bool,
}

impl VoteScope {
    pub fn new(voters: Vec<String>, targets: Vec<String>, allow_self_vote: bool) -> Self {
        Self {
            voters,
            targets,
            allow_self_vote,
        }
    }

    /// Number of ballots needed before resolution
    pub fn quota(&self) -> usize {
        self.voters.len()
    }

    pub fn voter(&self, name: &str) -> Option<&str> {
        canonical(&self.voters, name)
    }

    pub fn target(&self, name: &str) -> Option<&str> {
        canonical(&self.targets, name)
    }

    /// Targets this voter may pick
    pub fn targets_for(&self, voter: &str) -> Vec<String> {
        self.targets
            .iter()
            .filter(|t| self.allow_self_vote || !t.eq_ignore_ascii_case(voter))
            .cloned()
            .collect()
    }
}

fn canonical<'a>(names: &'a [String], name: &str) -> Option<&'a str> {
    let name = name.trim();
    names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

/// Ballots of the current voting phase, unique per voter
#[derive(Debug, Clone, Default)]
pub struct BallotBox {
    ballots: Vec<Ballot>,
}

impl BallotBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `voter`'s choice. Names are matched case-insensitively and
    /// stored in their canonical spelling.
    pub fn cast(&mut self, scope: &VoteScope, voter: &str, target: &str) -> CastOutcome {
        let Some(voter) = scope.voter(voter) else {
            return CastOutcome::NotEligible;
        };
        if self.has_voted(voter) {
            return CastOutcome::AlreadyVoted;
        }
        let Some(target) = scope.target(target) else {
            return CastOutcome::InvalidTarget;
        };
        if !scope.allow_self_vote && voter == target {
            return CastOutcome::SelfVote;
        }

        tracing::debug!(voter, target, "Vote cast");
        self.ballots.push(Ballot {
            voter: voter.to_string(),
            target: target.to_string(),
        });
        CastOutcome::Accepted
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.ballots
            .iter()
            .any(|b| b.voter.eq_ignore_ascii_case(voter))
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn clear(&mut self) {
        self.ballots.clear();
    }

    /// Drop ballots cast by or against `name`. Returns the voters whose
    /// ballot was dropped, excluding `name` itself.
    pub fn discard_involving(&mut self, name: &str) -> Vec<String> {
        let mut revoters = Vec::new();
        self.ballots.retain(|b| {
            if b.voter.eq_ignore_ascii_case(name) {
                return false;
            }
            if b.target.eq_ignore_ascii_case(name) {
                revoters.push(b.voter.clone());
                return false;
            }
            true
        });
        revoters
    }

    /// Votes per target, in order of each target's first vote
    pub fn tally(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for ballot in &self.ballots {
            match counts.iter_mut().find(|(t, _)| *t == ballot.target) {
                Some((_, n)) => *n += 1,
                None => counts.push((ballot.target.clone(), 1)),
            }
        }
        counts
    }

    /// Targets sharing the maximum count
    pub fn leaders(&self) -> (Vec<String>, usize) {
        let tally = self.tally();
        let max = tally.iter().map(|(_, n)| *n).max().unwrap_or(0);
        let leaders = tally
            .into_iter()
            .filter(|(_, n)| max > 0 && *n == max)
            .map(|(t, _)| t)
            .collect();
        (leaders, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn scope() -> VoteScope {
        let table = names(&["Ann", "Vera", "Oleg", "Mira"]);
        VoteScope::new(table.clone(), table, false)
    }

    #[test]
    fn test_cast_and_double_vote() {
        let scope = scope();
        let mut ballots = BallotBox::new();

        assert_eq!(ballots.cast(&scope, "ann", "vera"), CastOutcome::Accepted);
        assert_eq!(ballots.cast(&scope, "Ann", "Oleg"), CastOutcome::AlreadyVoted);
        assert_eq!(ballots.len(), 1);
        assert_eq!(ballots.ballots()[0].target, "Vera");
    }

    #[test]
    fn test_rejections() {
        let scope = scope();
        let mut ballots = BallotBox::new();

        assert_eq!(ballots.cast(&scope, "Ghost", "Vera"), CastOutcome::NotEligible);
        assert_eq!(ballots.cast(&scope, "Ann", "Nobody"), CastOutcome::InvalidTarget);
        assert_eq!(ballots.cast(&scope, "Ann", "Ann"), CastOutcome::SelfVote);
        assert!(ballots.is_empty());
    }

    #[test]
    fn test_self_vote_allowed_when_configured() {
        let mut scope = scope();
        scope.allow_self_vote = true;
        let mut ballots = BallotBox::new();
        assert!(ballots.cast(&scope, "Ann", "Ann").is_accepted());
    }

    #[test]
    fn test_runoff_scope_restricts_targets() {
        let scope = VoteScope::new(names(&["Ann", "Vera", "Oleg"]), names(&["Vera", "Oleg"]), false);
        let mut ballots = BallotBox::new();

        assert_eq!(ballots.cast(&scope, "Vera", "Ann"), CastOutcome::InvalidTarget);
        assert!(ballots.cast(&scope, "Ann", "Oleg").is_accepted());
        assert_eq!(scope.targets_for("Vera"), names(&["Oleg"]));
    }

    #[test]
    fn test_tally_and_leaders() {
        let scope = scope();
        let mut ballots = BallotBox::new();
        ballots.cast(&scope, "Ann", "Oleg");
        ballots.cast(&scope, "Vera", "Mira");
        ballots.cast(&scope, "Oleg", "Mira");
        ballots.cast(&scope, "Mira", "Oleg");

        assert_eq!(
            ballots.tally(),
            vec![("Oleg".to_string(), 2), ("Mira".to_string(), 2)]
        );
        assert_eq!(ballots.leaders(), (names(&["Oleg", "Mira"]), 2));
    }

    #[test]
    fn test_discard_involving() {
        let scope = scope();
        let mut ballots = BallotBox::new();
        ballots.cast(&scope, "Ann", "Oleg");
        ballots.cast(&scope, "Vera", "Ann");
        ballots.cast(&scope, "Oleg", "Mira");

        let revoters = ballots.discard_involving("Ann");
        assert_eq!(revoters, names(&["Vera"]));
        assert_eq!(ballots.len(), 1);
        assert!(!ballots.has_voted("Ann"));
    }
}
