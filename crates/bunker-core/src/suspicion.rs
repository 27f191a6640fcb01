//! Suspicion scoring
//!
//! A judged utterance yields a [`Verdict`]. [`apply`] folds it into the
//! speaker's active factors using a high-water-mark per tag, then scales every
//! factor by the argument quality. Status is a pure function of the factors and
//! the violation history, see [`derive_status`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::participant::{Participant, PersonalityProfile, Status};

/// Tag that receives the escalation penalty
pub const USELESS_TAG: &str = "useless";
/// Tags counted towards the uselessness escalation
pub const ESCALATING_TAGS: [&str; 2] = ["useless", "weird"];
/// Tag returned by the judge when nothing was wrong
pub const NO_VIOLATION: &str = "none";

/// How convincing an utterance was, as judged by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentQuality {
    Strong,
    #[default]
    Weak,
    Bad,
}

impl ArgumentQuality {
    /// Lenient parse of model output; anything unknown counts as neutral
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "strong" => Self::Strong,
            "bad" => Self::Bad,
            _ => Self::Weak,
        }
    }
}

/// Judge output for one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub violation_tag: String,
    pub argument_quality: ArgumentQuality,
    pub commentary: String,
}

impl Verdict {
    /// Neutral verdict used when judging fails
    pub fn neutral() -> Self {
        Self {
            violation_tag: NO_VIOLATION.to_string(),
            argument_quality: ArgumentQuality::Weak,
            commentary: String::new(),
        }
    }

    pub fn new(tag: &str, quality: ArgumentQuality) -> Self {
        Self {
            violation_tag: tag.to_string(),
            argument_quality: quality,
            commentary: String::new(),
        }
    }

    pub fn is_violation(&self) -> bool {
        let tag = self.violation_tag.trim();
        !tag.is_empty() && !tag.eq_ignore_ascii_case(NO_VIOLATION)
    }
}

/// Weights, multipliers and thresholds of the suspicion model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionRules {
    /// Configured weight per violation tag
    pub weights: BTreeMap<String, f64>,
    /// Multiplier applied to all factors after a strong argument (< 1)
    pub strong_multiplier: f64,
    /// Multiplier applied to all factors after a bad argument (> 1)
    pub bad_multiplier: f64,
    /// Total above which a participant reads as an impostor
    pub impostor_threshold: f64,
    /// Total above which a participant reads as suspicious
    pub suspicious_threshold: f64,
    /// `liar` factor above which the participant reads as a liar
    pub liar_threshold: f64,
    /// `biohazard` factor above which the participant reads as a biohazard
    pub biohazard_threshold: f64,
    /// Count of useless/weird tags that forces the dead-weight status
    pub useless_escalation_threshold: usize,
    /// Fixed penalty added to the `useless` factor on escalation
    pub useless_penalty: f64,
}

impl Default for SuspicionRules {
    fn default() -> Self {
        let weights = [
            ("liar", 40.0),
            ("biohazard", 50.0),
            ("useless", 50.0),
            ("weird", 30.0),
            ("aggressive", 25.0),
            ("contradiction", 35.0),
            ("passive", 15.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            weights,
            strong_multiplier: 0.7,
            bad_multiplier: 1.3,
            impostor_threshold: 120.0,
            suspicious_threshold: 40.0,
            liar_threshold: 40.0,
            biohazard_threshold: 45.0,
            useless_escalation_threshold: 2,
            useless_penalty: 100.0,
        }
    }
}

impl SuspicionRules {
    pub fn weight(&self, tag: &str) -> Option<f64> {
        self.weights.get(tag).copied()
    }

    /// Tags the judge may choose from
    pub fn known_tags(&self) -> Vec<&str> {
        self.weights.keys().map(String::as_str).collect()
    }
}

/// Count of escalating tags in a violation history
pub fn escalation_count(history: &[String]) -> usize {
    history
        .iter()
        .filter(|t| ESCALATING_TAGS.contains(&t.as_str()))
        .count()
}

/// Sum of all active factors
pub fn total_suspicion(factors: &BTreeMap<String, f64>) -> f64 {
    factors.values().sum()
}

/// Status ladder, evaluated top-down; exactly one status holds
pub fn derive_status(
    factors: &BTreeMap<String, f64>,
    history: &[String],
    rules: &SuspicionRules,
) -> Status {
    if escalation_count(history) >= rules.useless_escalation_threshold {
        return Status::DeadWeight;
    }

    let total = total_suspicion(factors);
    if total > rules.impostor_threshold {
        return Status::Impostor;
    }
    if factors.get("liar").copied().unwrap_or(0.0) > rules.liar_threshold {
        return Status::Liar;
    }
    if factors.get("biohazard").copied().unwrap_or(0.0) > rules.biohazard_threshold {
        return Status::Biohazard;
    }
    if total > rules.suspicious_threshold {
        return Status::Suspicious;
    }
    Status::Normal
}

/// Fold a verdict into the participant's factors and recompute its status
pub fn apply(participant: &mut Participant, verdict: &Verdict, rules: &SuspicionRules) {
    let tag = verdict.violation_tag.trim().to_lowercase();

    if verdict.is_violation() {
        participant.violations.push(tag.clone());
        if let Some(weight) = rules.weight(&tag) {
            let slot = participant.active_factors.entry(tag.clone()).or_insert(0.0);
            *slot = slot.max(weight);
        } else {
            tracing::debug!(participant = %participant.name, tag = %tag, "Unweighted violation tag");
        }
    }

    let multiplier = match verdict.argument_quality {
        ArgumentQuality::Strong => Some(rules.strong_multiplier),
        ArgumentQuality::Bad => Some(rules.bad_multiplier),
        ArgumentQuality::Weak => None,
    };
    if let Some(m) = multiplier {
        for value in participant.active_factors.values_mut() {
            *value *= m;
        }
    }

    // Penalty lands exactly once: on the verdict that reaches the threshold
    let escalating = ESCALATING_TAGS.contains(&tag.as_str());
    if escalating && escalation_count(&participant.violations) == rules.useless_escalation_threshold {
        let base = rules.weight(USELESS_TAG).unwrap_or(0.0);
        let slot = participant
            .active_factors
            .entry(USELESS_TAG.to_string())
            .or_insert(0.0);
        *slot = slot.max(base) + rules.useless_penalty;
        tracing::info!(participant = %participant.name, useless = *slot, "Uselessness escalation");
    }

    participant.status = derive_status(&participant.active_factors, &participant.violations, rules);
}

/// How dangerous `target` looks to `observer`, given the observer's personality
pub fn threat_score(observer: &PersonalityProfile, target: &Participant) -> f64 {
    target
        .active_factors
        .iter()
        .map(|(tag, weight)| weight * observer.multiplier(tag))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Attributes, Participant};

    fn subject() -> Participant {
        Participant::bot("Vera", Attributes::default())
    }

    #[test]
    fn test_high_water_mark_not_additive() {
        let rules = SuspicionRules::default();
        let mut p = subject();

        apply(&mut p, &Verdict::new("liar", ArgumentQuality::Weak), &rules);
        apply(&mut p, &Verdict::new("liar", ArgumentQuality::Weak), &rules);

        assert_eq!(p.active_factors["liar"], 40.0);
        assert_eq!(p.violations.len(), 2);
    }

    #[test]
    fn test_distinct_tags_accumulate() {
        let rules = SuspicionRules::default();
        let mut p = subject();

        apply(&mut p, &Verdict::new("liar", ArgumentQuality::Weak), &rules);
        apply(&mut p, &Verdict::new("aggressive", ArgumentQuality::Weak), &rules);

        assert_eq!(total_suspicion(&p.active_factors), 65.0);
        assert_eq!(p.status, Status::Suspicious);
    }

    #[test]
    fn test_quality_multipliers() {
        let rules = SuspicionRules::default();
        let mut p = subject();

        apply(&mut p, &Verdict::new("biohazard", ArgumentQuality::Strong), &rules);
        assert!((p.active_factors["biohazard"] - 35.0).abs() < 1e-9);

        apply(&mut p, &Verdict::new(NO_VIOLATION, ArgumentQuality::Bad), &rules);
        assert!((p.active_factors["biohazard"] - 45.5).abs() < 1e-9);
        assert_eq!(p.status, Status::Biohazard);
    }

    #[test]
    fn test_escalation_forces_dead_weight() {
        let rules = SuspicionRules::default();
        let mut p = subject();

        apply(&mut p, &Verdict::new("useless", ArgumentQuality::Weak), &rules);
        assert_eq!(p.status, Status::Suspicious);

        apply(&mut p, &Verdict::new("useless", ArgumentQuality::Weak), &rules);
        assert_eq!(p.status, Status::DeadWeight);
        assert!(p.active_factors["useless"] >= 150.0);

        // the penalty is not stacked again on later tags
        apply(&mut p, &Verdict::new("weird", ArgumentQuality::Weak), &rules);
        assert!(p.active_factors["useless"] < 250.0);
        assert_eq!(p.status, Status::DeadWeight);
    }

    #[test]
    fn test_status_is_pure_function_of_state() {
        let rules = SuspicionRules::default();
        let mut p = subject();
        for tag in ["liar", "weird", "contradiction", "none", "aggressive"] {
            apply(&mut p, &Verdict::new(tag, ArgumentQuality::Bad), &rules);
            assert_eq!(p.status, derive_status(&p.active_factors, &p.violations, &rules));
        }
    }

    #[test]
    fn test_threat_score_uses_observer_personality() {
        let rules = SuspicionRules::default();
        let mut target = subject();
        apply(&mut target, &Verdict::new("liar", ArgumentQuality::Weak), &rules);

        let neutral = PersonalityProfile::balanced();
        let mut paranoid = PersonalityProfile::balanced();
        paranoid.multipliers.insert("liar".to_string(), 1.5);

        assert_eq!(threat_score(&neutral, &target), 40.0);
        assert_eq!(threat_score(&paranoid, &target), 60.0);
    }

    #[test]
    fn test_quality_parse_is_lenient() {
        assert_eq!(ArgumentQuality::parse(" Strong "), ArgumentQuality::Strong);
        assert_eq!(ArgumentQuality::parse("BAD"), ArgumentQuality::Bad);
        assert_eq!(ArgumentQuality::parse("meh"), ArgumentQuality::Weak);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn tag_strategy() -> impl Strategy<Value = String> {
            prop::sample::select(vec![
                "liar",
                "biohazard",
                "useless",
                "weird",
                "aggressive",
                "contradiction",
                "passive",
                "none",
                "unknown_tag",
            ])
            .prop_map(str::to_string)
        }

        fn quality_strategy() -> impl Strategy<Value = ArgumentQuality> {
            prop_oneof![
                Just(ArgumentQuality::Strong),
                Just(ArgumentQuality::Weak),
                Just(ArgumentQuality::Bad),
            ]
        }

        proptest! {
            #[test]
            fn status_matches_ladder_after_every_apply(
                verdicts in prop::collection::vec((tag_strategy(), quality_strategy()), 1..20)
            ) {
                let rules = SuspicionRules::default();
                let mut p = subject();
                for (tag, quality) in verdicts {
                    apply(&mut p, &Verdict::new(&tag, quality), &rules);
                    prop_assert_eq!(p.status, derive_status(&p.active_factors, &p.violations, &rules));
                }
            }

            #[test]
            fn repeated_weak_tag_never_exceeds_weight(
                tag in prop::sample::select(vec!["liar", "biohazard", "aggressive", "contradiction", "passive"]),
                n in 1usize..10,
            ) {
                let rules = SuspicionRules::default();
                let mut p = subject();
                for _ in 0..n {
                    apply(&mut p, &Verdict::new(tag, ArgumentQuality::Weak), &rules);
                }
                prop_assert_eq!(p.active_factors[tag], rules.weight(tag).unwrap());
            }

            #[test]
            fn factors_never_negative(
                verdicts in prop::collection::vec((tag_strategy(), quality_strategy()), 0..30)
            ) {
                let rules = SuspicionRules::default();
                let mut p = subject();
                for (tag, quality) in verdicts {
                    apply(&mut p, &Verdict::new(&tag, quality), &rules);
                }
                prop_assert!(p.active_factors.values().all(|v| *v >= 0.0));
            }
        }
    }
}
