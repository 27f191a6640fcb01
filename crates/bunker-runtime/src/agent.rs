//! Agent decision facade
//!
//! Speech, director nudges, votes, judging and scenario generation, all
//! through the deadline-guarded [`Generator`]. Every decision except scenario
//! generation has a local fallback, so the game always advances.

use rand::Rng;

use bunker_core::suspicion::NO_VIOLATION;
use bunker_core::{ArgumentQuality, GameConfig, OwnCard, PublicView, Scenario, ScenarioCatalog, Verdict};
use bunker_llm::{json, Generator, LlmRequest};
use bunker_vote::{choose_vote, VoteChoice};

use crate::context::GameContext;
use crate::engine::EngineError;
use crate::phase::Phase;
use crate::prompts;

/// Speech used when generation yields nothing
pub const SILENT_SPEECH: &str = "...";

/// Public situation an agent reasons about
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub round: u32,
    pub phase: Phase,
    pub topic: &'a str,
    pub catastrophe: &'a str,
    /// Visibility-gated views of every participant
    pub table: &'a [PublicView],
    /// Rendered recent transcript
    pub transcript: &'a str,
    pub runoff_candidates: &'a [String],
}

#[derive(Debug, Clone)]
pub struct AgentFacade<'a> {
    generator: &'a Generator,
    config: &'a GameConfig,
}

impl<'a> AgentFacade<'a> {
    pub fn new(ctx: &'a GameContext) -> Self {
        Self {
            generator: &ctx.generator,
            config: &ctx.config,
        }
    }

    /// In-character utterance; [`SILENT_SPEECH`] on failure
    pub async fn speech(
        &self,
        me: &OwnCard,
        last_speech: Option<&str>,
        scene: &Scene<'_>,
        nudge: Option<&str>,
    ) -> String {
        let request = LlmRequest::with_role(
            &prompts::persona(me, scene.catastrophe),
            &prompts::speech(scene, me, last_speech, nudge),
        );
        let text = self.generator.text(request).await;
        if text.is_empty() {
            tracing::debug!(participant = %me.name, "Empty speech, staying silent");
            SILENT_SPEECH.to_string()
        } else {
            text
        }
    }

    /// Whether a hidden nudge is injected this turn: always when a clear
    /// target exists, otherwise with the phase's probability
    pub fn wants_nudge<R: Rng + ?Sized>(&self, phase: Phase, clear_target: bool, rng: &mut R) -> bool {
        if clear_target {
            return true;
        }
        let probability = match phase {
            Phase::Presentation => self.config.director.presentation_probability,
            Phase::Discussion | Phase::Runoff => self.config.director.discussion_probability,
            Phase::Voting => 0.0,
        };
        rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Hidden instruction for an agent's next speech; `None` on failure
    pub async fn director_nudge(
        &self,
        me: &OwnCard,
        scene: &Scene<'_>,
        clear_target: Option<&str>,
    ) -> Option<String> {
        let request = LlmRequest::with_role(
            prompts::DIRECTOR_SYSTEM,
            &prompts::director(scene, me, clear_target),
        )
        .temperature(0.9);
        let nudge = self.generator.text(request).await;
        (!nudge.is_empty()).then_some(nudge)
    }

    /// Vote among `candidates`. The model's pick counts when valid; otherwise
    /// the top of `ranking`, or a random candidate without threat data.
    pub async fn vote<R: Rng + ?Sized>(
        &self,
        me: &OwnCard,
        scene: &Scene<'_>,
        candidates: &[String],
        ranking: &[(String, f64)],
        rng: &mut R,
    ) -> Option<VoteChoice> {
        let request = LlmRequest::json(
            &prompts::persona(me, scene.catastrophe),
            &prompts::vote(scene, me, candidates),
        );
        let answer = self.generator.json(request).await;
        let choice = choose_vote(json::str_field(&answer, "target"), ranking, candidates, rng);
        if let Some(choice) = &choice {
            tracing::debug!(voter = %me.name, target = %choice.target, source = ?choice.source, "Agent vote");
        }
        choice
    }

    /// Classify an utterance; a neutral verdict on failure
    pub async fn judge(&self, speaker: &OwnCard, text: &str, topic: &str, round: u32) -> Verdict {
        let tags = self.config.suspicion.known_tags();
        let request = LlmRequest::json(
            prompts::JUDGE_SYSTEM,
            &prompts::judge(speaker, text, topic, round, &tags),
        );
        let answer = self.generator.json(request).await;
        if answer.is_empty() {
            return Verdict::neutral();
        }

        Verdict {
            violation_tag: json::str_field(&answer, "violation")
                .unwrap_or(NO_VIOLATION)
                .to_lowercase(),
            argument_quality: json::str_field(&answer, "argument_quality")
                .map(ArgumentQuality::parse)
                .unwrap_or_default(),
            commentary: json::str_field(&answer, "commentary")
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Fresh scenario from the model. No fallback: an unusable answer aborts
    /// session creation.
    pub async fn scenario(&self, catalog: &ScenarioCatalog) -> Result<Scenario, EngineError> {
        let known: Vec<String> = catalog.scenarios.iter().map(|s| s.title.clone()).collect();
        let request = LlmRequest::json(prompts::SCENARIO_SYSTEM, &prompts::scenario(&known)).temperature(0.9);
        let answer = self.generator.json(request).await;

        let catastrophe = json::str_field(&answer, "catastrophe")
            .ok_or_else(|| EngineError::ScenarioGeneration("no catastrophe in model answer".into()))?;
        let topics: Vec<String> = answer
            .get("topics")
            .and_then(|t| t.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|t| t.as_str())
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if topics.is_empty() {
            return Err(EngineError::ScenarioGeneration("no crisis topics in model answer".into()));
        }

        Ok(Scenario {
            title: "Generated".to_string(),
            catastrophe: catastrophe.to_string(),
            topics,
        })
    }
}
