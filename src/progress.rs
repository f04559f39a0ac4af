//! Learning progress tracking
//!
//! Durable, typed learning artifacts extracted from tagged model output,
//! plus aggregate counters for the session.

use serde::{Deserialize, Serialize};

/// A typed learning artifact extracted from a tag in model output
///
/// Created only by the tag extractor; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LearningRecord {
    /// A new vocabulary word with meaning and example usage
    Vocabulary {
        word: String,
        meaning: String,
        example: String,
    },
    /// An idiom or phrasal verb with meaning and usage
    Idiom {
        phrase: String,
        meaning: String,
        usage: String,
    },
    /// A grammar rule with an example
    GrammarTip { rule: String, example: String },
    /// A pronunciation tip
    PronunciationNote { tip: String },
    /// A cultural usage note
    CultureNote { note: String },
    /// A milestone the learner reached
    Achievement { description: String },
}

impl LearningRecord {
    /// The tag kind this record was extracted from
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Vocabulary { .. } => "VOCAB",
            Self::Idiom { .. } => "IDIOM",
            Self::GrammarTip { .. } => "GRAMMAR",
            Self::PronunciationNote { .. } => "PRONUN",
            Self::CultureNote { .. } => "CULTURE",
            Self::Achievement { .. } => "ACHIEVE",
        }
    }
}

/// Aggregate learning progress for one session
///
/// Counters are monotonically non-decreasing within a session. Record lists
/// are append-only. Progress survives a transcript reset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Number of sessions started
    pub sessions_count: u64,

    /// Total words the learner has spoken (transcript word count)
    pub total_words_spoken: u64,

    /// Number of corrections the tutor has made
    pub corrections_made: u64,

    /// Vocabulary words introduced
    #[serde(default)]
    pub vocabulary: Vec<LearningRecord>,

    /// Idioms and phrasal verbs introduced
    #[serde(default)]
    pub idioms: Vec<LearningRecord>,

    /// Grammar tips given
    #[serde(default)]
    pub grammar_tips: Vec<LearningRecord>,

    /// Pronunciation notes given
    #[serde(default)]
    pub pronunciation_notes: Vec<LearningRecord>,

    /// Cultural notes given
    #[serde(default)]
    pub culture_notes: Vec<LearningRecord>,

    /// Achievements unlocked
    #[serde(default)]
    pub achievements: Vec<LearningRecord>,
}

impl Progress {
    /// Append a learning record to the list for `kind`
    ///
    /// Unrecognized kinds are dropped silently so malformed model output
    /// never fails the turn that carried it.
    pub fn append(&mut self, kind: &str, record: LearningRecord) {
        let list = match kind {
            "VOCAB" => &mut self.vocabulary,
            "IDIOM" => &mut self.idioms,
            "GRAMMAR" => &mut self.grammar_tips,
            "PRONUN" => &mut self.pronunciation_notes,
            "CULTURE" => &mut self.culture_notes,
            "ACHIEVE" => &mut self.achievements,
            other => {
                tracing::debug!(kind = %other, "dropping record with unrecognized kind");
                return;
            }
        };
        list.push(record);
    }

    /// Total number of learning records across all kinds
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.vocabulary.len()
            + self.idioms.len()
            + self.grammar_tips.len()
            + self.pronunciation_notes.len()
            + self.culture_notes.len()
            + self.achievements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vocab() -> LearningRecord {
        LearningRecord::Vocabulary {
            word: "ubiquitous".to_string(),
            meaning: "found everywhere".to_string(),
            example: "Smartphones are ubiquitous.".to_string(),
        }
    }

    #[test]
    fn append_routes_to_kind_list() {
        let mut progress = Progress::default();
        progress.append("VOCAB", sample_vocab());
        assert_eq!(progress.vocabulary.len(), 1);
        assert_eq!(progress.record_count(), 1);
    }

    #[test]
    fn unknown_kind_is_a_silent_no_op() {
        let mut progress = Progress::default();
        progress.append("UNKNOWN_KIND", sample_vocab());
        assert_eq!(progress.record_count(), 0);
    }

    #[test]
    fn record_kind_matches_tag_names() {
        assert_eq!(sample_vocab().kind(), "VOCAB");
        let tip = LearningRecord::PronunciationNote {
            tip: "stress the second syllable".to_string(),
        };
        assert_eq!(tip.kind(), "PRONUN");
    }
}
