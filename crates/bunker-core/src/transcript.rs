//! Append-only transcript of a session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Kind of transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Speech,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub round: u32,
    pub kind: LineKind,
    pub speaker_id: Option<ParticipantId>,
    /// Speaker tag as displayed; rewritten when the speaker is eliminated
    pub speaker: String,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptLine {
    pub fn render(&self) -> String {
        match self.kind {
            LineKind::Speech => format!("{}: {}", self.speaker, self.text),
            LineKind::System => format!("[{}]", self.text),
        }
    }
}

/// Ordered utterances; never pruned during a game
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<TranscriptLine>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn speech(&mut self, round: u32, speaker_id: ParticipantId, speaker: &str, text: &str) {
        self.lines.push(TranscriptLine {
            round,
            kind: LineKind::Speech,
            speaker_id: Some(speaker_id),
            speaker: speaker.to_string(),
            text: text.to_string(),
            at: Utc::now(),
        });
    }

    pub fn system(&mut self, round: u32, text: &str) {
        self.lines.push(TranscriptLine {
            round,
            kind: LineKind::System,
            speaker_id: None,
            speaker: String::new(),
            text: text.to_string(),
            at: Utc::now(),
        });
    }

    /// Retag every prior line of `speaker_id` as eliminated
    pub fn mark_eliminated(&mut self, speaker_id: ParticipantId, name: &str) {
        let tag = format!("{} (eliminated)", name);
        for line in self
            .lines
            .iter_mut()
            .filter(|l| l.speaker_id == Some(speaker_id))
        {
            line.speaker = tag.clone();
        }
    }

    pub fn lines(&self) -> &[TranscriptLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last `n` lines, oldest first
    pub fn window(&self, n: usize) -> &[TranscriptLine] {
        let start = self.lines.len().saturating_sub(n);
        &self.lines[start..]
    }

    pub fn render_window(&self, n: usize) -> String {
        self.window(n)
            .iter()
            .map(TranscriptLine::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_window_and_render() {
        let mut t = Transcript::new();
        let a = Uuid::new_v4();
        t.speech(1, a, "Ann", "hello");
        t.system(1, "Round 1 begins");
        t.speech(1, a, "Ann", "again");

        assert_eq!(t.window(2).len(), 2);
        assert_eq!(t.window(10).len(), 3);
        assert_eq!(t.render_window(2), "[Round 1 begins]\nAnn: again");
    }

    #[test]
    fn test_mark_eliminated_rewrites_only_that_speaker() {
        let mut t = Transcript::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        t.speech(1, a, "Ann", "one");
        t.speech(1, b, "Bo", "two");
        t.mark_eliminated(a, "Ann");

        assert_eq!(t.lines()[0].speaker, "Ann (eliminated)");
        assert_eq!(t.lines()[1].speaker, "Bo");
        assert_eq!(t.len(), 2);
    }
}
