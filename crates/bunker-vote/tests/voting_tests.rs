use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use bunker_core::VotingRules;
use bunker_vote::{resolve, BallotBox, CastOutcome, Resolution, RunoffState, VoteScope};

fn six() -> Vec<String> {
    ["Ann", "Vera", "Oleg", "Mira", "Taras", "Lina"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_six_players_two_way_tie_enters_runoff() {
    let names = six();
    let scope = VoteScope::new(names.clone(), names, false);
    let mut ballots = BallotBox::new();

    // Vera and Oleg get two votes each, Mira and Taras one
    for (voter, target) in [
        ("Ann", "Vera"),
        ("Mira", "Vera"),
        ("Taras", "Oleg"),
        ("Lina", "Oleg"),
        ("Vera", "Mira"),
        ("Oleg", "Taras"),
    ] {
        assert_eq!(ballots.cast(&scope, voter, target), CastOutcome::Accepted);
    }

    let mut runoff = RunoffState::default();
    let mut rng = StdRng::seed_from_u64(11);
    let outcome = resolve(&ballots, scope.quota(), &runoff, &VotingRules::default(), &mut rng);

    let Some(Resolution::Runoff { candidates }) = outcome else {
        panic!("expected runoff, got {:?}", outcome);
    };
    runoff.begin(candidates);
    assert_eq!(runoff.candidates, vec!["Vera".to_string(), "Oleg".to_string()]);
    assert_eq!(runoff.count, 1);
}

#[test]
fn test_double_vote_is_idempotent() {
    let names = six();
    let scope = VoteScope::new(names.clone(), names, false);
    let mut ballots = BallotBox::new();

    assert!(ballots.cast(&scope, "Ann", "Vera").is_accepted());
    let before = ballots.len();
    assert_eq!(ballots.cast(&scope, "Ann", "Oleg"), CastOutcome::AlreadyVoted);
    assert_eq!(ballots.len(), before);
    assert_eq!(ballots.tally(), vec![("Vera".to_string(), 1)]);
}

#[test]
fn test_ballots_never_exceed_voters() {
    let names = six();
    let scope = VoteScope::new(names.clone(), names.clone(), false);
    let mut ballots = BallotBox::new();
    for voter in &names {
        for target in &names {
            ballots.cast(&scope, voter, target);
        }
    }
    assert_eq!(ballots.len(), scope.quota());
}

proptest! {
    /// With runoffs exhausted, every tie eliminates exactly one tied leader
    #[test]
    fn prop_exhausted_tie_picks_one_tied_leader(seed in any::<u64>(), split in 2usize..=3) {
        let names = six();
        let scope = VoteScope::new(names.clone(), names.clone(), false);
        let mut ballots = BallotBox::new();

        // six voters spread evenly over `split` targets; nobody lands on themself
        let targets = &names[1..=split];
        for (i, voter) in names.iter().enumerate() {
            prop_assert!(ballots.cast(&scope, voter, &targets[i % split]).is_accepted());
        }
        let (leaders, _) = ballots.leaders();
        prop_assert_eq!(leaders.len(), split);

        let runoff = RunoffState { candidates: leaders.clone(), count: 1 };
        let mut rng = StdRng::seed_from_u64(seed);
        match resolve(&ballots, scope.quota(), &runoff, &VotingRules::default(), &mut rng) {
            Some(Resolution::Eliminate { name, forced, .. }) => {
                prop_assert!(forced);
                prop_assert!(leaders.contains(&name));
            }
            other => prop_assert!(false, "expected forced elimination, got {:?}", other),
        }
    }
}
