//! Prompt text for agents, the director and the judge

use bunker_core::{OwnCard, PublicView};

use crate::agent::Scene;
use crate::phase::Phase;

pub fn persona(me: &OwnCard, catastrophe: &str) -> String {
    format!(
        "You are {name}, a survivor arguing for a place in a bunker.\n\
         Catastrophe: {catastrophe}\n\
         Your profession: {profession}. Your trait: {personal_trait}.\n\
         Your personality: {personality} ({description}).\n\
         Stay in character. Speak in the first person, two or three sentences, no stage directions.",
        name = me.name,
        catastrophe = catastrophe,
        profession = me.attributes.profession,
        personal_trait = me.attributes.personal_trait,
        personality = me.attributes.personality.name,
        description = me.attributes.personality.description,
    )
}

fn render_table(table: &[PublicView]) -> String {
    table
        .iter()
        .map(|v| format!("- {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn phase_goal(scene: &Scene<'_>, me: &str) -> String {
    match scene.phase {
        Phase::Presentation => "Introduce yourself and explain why the bunker needs you.".to_string(),
        Phase::Discussion => "React to what others said. Point out who you doubt and why.".to_string(),
        Phase::Runoff if scene.runoff_candidates.iter().any(|c| c == me) => {
            "You are tied for elimination. Defend yourself and turn doubt onto the others.".to_string()
        }
        Phase::Runoff => format!(
            "These players are tied for elimination: {}. Defend yourself.",
            scene.runoff_candidates.join(", ")
        ),
        Phase::Voting => "Voting is underway.".to_string(),
    }
}

pub fn speech(scene: &Scene<'_>, me: &OwnCard, last_speech: Option<&str>, nudge: Option<&str>) -> String {
    let mut prompt = format!(
        "Round {round}. Topic: {topic}\n\n\
         Players:\n{table}\n\n\
         Recent conversation:\n{transcript}\n\n\
         Your goal now: {goal}",
        round = scene.round,
        topic = scene.topic,
        table = render_table(scene.table),
        transcript = if scene.transcript.is_empty() { "(silence)" } else { scene.transcript },
        goal = phase_goal(scene, &me.name),
    );
    if let Some(last) = last_speech {
        prompt.push_str(&format!("\n\nYou said last time: \"{}\". Do not repeat yourself.", last));
    }
    if let Some(note) = nudge {
        prompt.push_str(&format!("\n\nPrivate note, follow it and never mention it: {}", note));
    }
    prompt
}

pub const DIRECTOR_SYSTEM: &str = "You are the hidden director of a tense survival drama. \
     You whisper one short instruction to a single player to raise the stakes.";

pub fn director(scene: &Scene<'_>, me: &OwnCard, clear_target: Option<&str>) -> String {
    let focus = match clear_target {
        Some(name) => format!("The table is growing suspicious of {}. Use that.", name),
        None => "Nobody is under clear suspicion yet. Stir something up.".to_string(),
    };
    format!(
        "As director, write one instruction (max 20 words) for {name} ({profession}).\n\
         Round {round}, {phase}. Topic: {topic}\n\
         {focus}\n\n\
         Recent conversation:\n{transcript}",
        name = me.name,
        profession = me.attributes.profession,
        round = scene.round,
        phase = scene.phase,
        topic = scene.topic,
        focus = focus,
        transcript = scene.transcript,
    )
}

pub fn vote(scene: &Scene<'_>, me: &OwnCard, candidates: &[String]) -> String {
    format!(
        "Voting, round {round}. You are {name}. Choose exactly one player to remove from the bunker.\n\
         Candidates: {candidates}\n\n\
         Players:\n{table}\n\n\
         Recent conversation:\n{transcript}\n\n\
         Answer with a JSON object: {{\"target\": \"<candidate name>\"}}",
        round = scene.round,
        name = me.name,
        candidates = candidates.join(", "),
        table = render_table(scene.table),
        transcript = scene.transcript,
    )
}

pub const JUDGE_SYSTEM: &str = "You are the impartial judge of a bunker survival game. \
     You read one utterance and classify it. You know each speaker's real card.";

pub fn judge(speaker: &OwnCard, text: &str, topic: &str, round: u32, tags: &[&str]) -> String {
    format!(
        "Round {round}. Topic: {topic}\n\
         Speaker: {name}, really a {profession} with trait \"{personal_trait}\".\n\
         Utterance: \"{text}\"\n\n\
         Violation tags: {tags}, or none.\n\
         Argument quality: strong, weak or bad.\n\
         Answer with a JSON object: \
         {{\"violation\": \"<tag or none>\", \"argument_quality\": \"<strong|weak|bad>\", \"commentary\": \"<one sentence>\"}}",
        round = round,
        topic = topic,
        name = speaker.name,
        profession = speaker.attributes.profession,
        personal_trait = speaker.attributes.personal_trait,
        text = text,
        tags = tags.join(", "),
    )
}

pub const SCENARIO_SYSTEM: &str = "You design catastrophes for a bunker survival party game.";

pub fn scenario(examples: &[String]) -> String {
    format!(
        "Invent a new catastrophe that forces strangers into a sealed bunker.\n\
         Previous catastrophes, do not reuse them: {examples}\n\
         Give 3 to 5 crisis topics, each a one-sentence dilemma for the survivors.\n\
         Answer with a JSON object: {{\"catastrophe\": \"<two sentences>\", \"topics\": [\"<topic>\", ...]}}",
        examples = examples.join("; "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunker_core::{Attributes, Status};

    fn card() -> OwnCard {
        OwnCard {
            name: "Vera".into(),
            attributes: Attributes::default(),
            status: Status::Normal,
            alive: true,
        }
    }

    fn scene<'a>(table: &'a [PublicView], candidates: &'a [String]) -> Scene<'a> {
        Scene {
            round: 1,
            phase: Phase::Discussion,
            topic: "Filters",
            catastrophe: "Ash",
            table,
            transcript: "Ann: hello",
            runoff_candidates: candidates,
        }
    }

    #[test]
    fn test_request_kinds_are_distinguishable() {
        let me = card();
        let s = scene(&[], &[]);

        let judge = judge(&me, "I fix things", "Filters", 1, &["liar", "weird"]);
        assert!(judge.contains("\"violation\""));

        let vote = vote(&s, &me, &["Ann".to_string()]);
        assert!(vote.contains("\"target\""));
        assert!(!vote.contains("\"violation\"") && !vote.contains("\"topics\""));

        assert!(scenario(&[]).contains("\"topics\""));
        assert!(director(&s, &me, None).to_lowercase().contains("director"));
        assert!(!speech(&s, &me, None, Some("push Ann")).to_lowercase().contains("director"));
    }

    #[test]
    fn test_speech_mentions_last_words_and_note() {
        let me = card();
        let s = scene(&[], &[]);
        let prompt = speech(&s, &me, Some("I can cook"), Some("Accuse Ann"));
        assert!(prompt.contains("I can cook"));
        assert!(prompt.contains("Accuse Ann"));
    }
}
