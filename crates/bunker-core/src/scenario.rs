//! Scenarios and round topics
//!
//! The topic of a round is derived from the round number alone: a fixed
//! opening theme, then a trait-reveal theme, then a cyclic walk through the
//! scenario's crisis topics.

use serde::{Deserialize, Serialize};

use crate::participant::PersonalityProfile;

/// Theme of round 1
pub const OPENING_THEME: &str =
    "Introductions: who are you, and what does your profession bring to the bunker?";
/// Theme of round 2
pub const TRAIT_REVEAL_THEME: &str =
    "Revelations: your personal traits are now public. Defend why you still belong here.";
/// Used when a scenario carries no crisis topics
const FALLBACK_CRISIS: &str = "Supplies are running out. Who is the weakest link?";

/// A catastrophe and its ordered list of crisis topics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub catastrophe: String,
    pub topics: Vec<String>,
}

impl Scenario {
    pub fn new(title: &str, catastrophe: &str, topics: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            catastrophe: catastrophe.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Topic of the given round (rounds start at 1)
    pub fn topic_for_round(&self, round: u32) -> &str {
        match round {
            0 | 1 => OPENING_THEME,
            2 => TRAIT_REVEAL_THEME,
            n => {
                if self.topics.is_empty() {
                    FALLBACK_CRISIS
                } else {
                    let idx = (n as usize - 3) % self.topics.len();
                    &self.topics[idx]
                }
            }
        }
    }
}

/// Pools dealt out at session start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioCatalog {
    pub scenarios: Vec<Scenario>,
    pub professions: Vec<String>,
    pub traits: Vec<String>,
    pub personalities: Vec<PersonalityProfile>,
    pub bot_names: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScenarioCatalog {
    fn default() -> Self {
        Self {
            scenarios: vec![
                Scenario::new(
                    "Nuclear Winter",
                    "A chain of detonations has buried the sky in ash. The bunker door seals in ten minutes.",
                    &[
                        "The air filters are clogging. Who can fix them, and who is wasting oxygen?",
                        "Someone has been hoarding rations. Who had the opportunity?",
                        "Radio contact with another shelter: they accept one person. Who should go?",
                        "The generator needs a risky repair outside. Who volunteers, and who hides?",
                    ],
                ),
                Scenario::new(
                    "The Grey Plague",
                    "An airborne pathogen has emptied the cities. Only the sealed bunker is safe.",
                    &[
                        "One of you coughed all night. Who might be infected?",
                        "The medicine cabinet was opened. Who took what?",
                        "A stranger knocks at the hatch asking for shelter. Do you let them in?",
                    ],
                ),
                Scenario::new(
                    "Rising Water",
                    "The ice caps have collapsed. The bunker sits on the last hill above the sea.",
                    &[
                        "Water is seeping through the east wall. Who is responsible for the leak?",
                        "Fresh water is running low. Who uses more than their share?",
                        "A boat was spotted on the horizon. Who gets to signal it?",
                    ],
                ),
            ],
            professions: strings(&[
                "Surgeon",
                "Electrician",
                "Farmer",
                "Chemist",
                "Soldier",
                "Teacher",
                "Plumber",
                "Psychologist",
                "Engineer",
                "Cook",
                "Pilot",
                "Lawyer",
            ]),
            traits: strings(&[
                "Asthmatic",
                "Speaks five languages",
                "Former convict",
                "Excellent marksman",
                "Afraid of the dark",
                "Trained paramedic",
                "Compulsive liar",
                "Knows edible plants",
                "Sleepwalker",
                "Carries a rare blood type",
            ]),
            personalities: vec![
                PersonalityProfile::new(
                    "Paranoid",
                    "Trusts nobody and hunts for lies.",
                    &[("liar", 1.5), ("contradiction", 1.4), ("weird", 1.2)],
                ),
                PersonalityProfile::new(
                    "Pragmatist",
                    "Judges people by what they contribute.",
                    &[("useless", 1.6), ("passive", 1.4), ("weird", 0.8)],
                ),
                PersonalityProfile::new(
                    "Hypochondriac",
                    "Terrified of disease and contamination.",
                    &[("biohazard", 1.8), ("aggressive", 0.9)],
                ),
                PersonalityProfile::new(
                    "Peacekeeper",
                    "Wants calm above all and punishes hostility.",
                    &[("aggressive", 1.7), ("liar", 0.8)],
                ),
                PersonalityProfile::new(
                    "Cynic",
                    "Expects the worst and sneers at strangeness.",
                    &[("weird", 1.5), ("useless", 1.2)],
                ),
            ],
            bot_names: strings(&[
                "Vera", "Oleg", "Mira", "Taras", "Lina", "Bogdan", "Zoya", "Gleb", "Nika", "Arkady",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_themes_for_first_rounds() {
        let scenario = Scenario::new("T", "C", &["a", "b"]);
        assert_eq!(scenario.topic_for_round(1), OPENING_THEME);
        assert_eq!(scenario.topic_for_round(2), TRAIT_REVEAL_THEME);
    }

    #[test]
    fn test_crisis_topics_rotate() {
        let scenario = Scenario::new("T", "C", &["a", "b", "c"]);
        assert_eq!(scenario.topic_for_round(3), "a");
        assert_eq!(scenario.topic_for_round(4), "b");
        assert_eq!(scenario.topic_for_round(5), "c");
        assert_eq!(scenario.topic_for_round(6), "a");
    }

    #[test]
    fn test_empty_topics_fall_back() {
        let scenario = Scenario::new("T", "C", &[]);
        assert_eq!(scenario.topic_for_round(7), FALLBACK_CRISIS);
    }

    #[test]
    fn test_default_catalog_is_populated() {
        let catalog = ScenarioCatalog::default();
        assert!(!catalog.scenarios.is_empty());
        assert!(catalog.scenarios.iter().all(|s| !s.topics.is_empty()));
        assert!(catalog.bot_names.len() >= 9);
    }
}
