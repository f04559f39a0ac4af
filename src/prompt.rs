//! Instruction composition for the tutor model
//!
//! `build_instruction` is a pure function of the tutor settings: the same
//! config always produces byte-identical instruction text. The pedagogical
//! sequence and the tag grammar are content contracts — the external model is
//! instructed to follow them, not forced to.

use crate::config::{ProficiencyLevel, TeachingStyle, TutorConfig};
use crate::llm::ChatMessage;
use crate::session::Session;
use crate::{Error, Result};

/// Tone phrase per teaching style, injected verbatim into the instruction
const STYLE_TONES: &[(TeachingStyle, &str)] = &[
    (
        TeachingStyle::Friendly,
        "Be warm and encouraging, like a supportive friend. Celebrate small wins.",
    ),
    (
        TeachingStyle::Strict,
        "Be exacting and direct. Point out every error and expect precision.",
    ),
    (
        TeachingStyle::Professional,
        "Be polished and businesslike. Favor formal register and workplace examples.",
    ),
    (
        TeachingStyle::Motivational,
        "Be energetic and inspiring. Frame every correction as progress toward fluency.",
    ),
    (
        TeachingStyle::Humorous,
        "Be playful and light. Use gentle humor to make corrections memorable.",
    ),
];

/// Focus phrase per proficiency level, injected verbatim into the instruction
const LEVEL_FOCUS: &[(ProficiencyLevel, &str)] = &[
    (
        ProficiencyLevel::Beginner,
        "The learner is a beginner: suggest one slightly better everyday word, and keep \
         corrections to articles, prepositions, and basic verb tenses.",
    ),
    (
        ProficiencyLevel::Intermediate,
        "The learner is intermediate: introduce one common idiom or phrasal verb related \
         to the topic.",
    ),
    (
        ProficiencyLevel::Advanced,
        "The learner is advanced: challenge nuance, register, and formal versus informal \
         tone.",
    ),
];

/// The tag-emission grammar the model must use, bit-exact with the extractor
const TAG_GRAMMAR: &str = "\
[VOCAB: <word>|<meaning>|<example>]
[IDIOM: <phrase>|<meaning>|<usage>]
[GRAMMAR: <rule>|<example...>]
[PRONUN: <tip...>]
[CULTURE: <note...>]
[ACHIEVE: <description...>]";

/// Look up the tone phrase for a style
///
/// # Errors
///
/// Returns `Error::Config` if the style has no entry in the tone table
pub fn style_tone(style: TeachingStyle) -> Result<&'static str> {
    STYLE_TONES
        .iter()
        .find(|(s, _)| *s == style)
        .map(|(_, phrase)| *phrase)
        .ok_or_else(|| Error::Config(format!("no tone phrase for style '{style}'")))
}

/// Look up the focus phrase for a proficiency level
///
/// # Errors
///
/// Returns `Error::Config` if the level has no entry in the focus table
pub fn level_focus(level: ProficiencyLevel) -> Result<&'static str> {
    LEVEL_FOCUS
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, phrase)| *phrase)
        .ok_or_else(|| Error::Config(format!("no focus phrase for level '{level}'")))
}

/// Build the instruction text sent as the system message
///
/// Deterministic: equal configs produce byte-identical output. Conversation
/// history is never embedded here; it is supplied as prior messages by
/// [`compose_messages`].
///
/// # Errors
///
/// Returns `Error::Config` if the style or level lookup fails
pub fn build_instruction(config: &TutorConfig) -> Result<String> {
    let tone = style_tone(config.style)?;
    let focus = level_focus(config.level)?;

    Ok(format!(
        "### IDENTITY\n\
         You are an expert adaptive English language coach moving the learner toward \
         native-like fluency through natural conversation.\n\n\
         ### RESPONSE SEQUENCE\n\
         For every learner message, follow this order exactly:\n\
         1. SCAN: check the message for grammar, word-choice, or phrasing mistakes.\n\
         2. CORRECT: if there is a mistake, start with \"Correction: <natural version>\" \
         and briefly say why. If there is no mistake, skip this step.\n\
         3. ACKNOWLEDGE: react briefly to what the learner actually said.\n\
         4. LEVEL UP: introduce exactly ONE new vocabulary word, idiom, or grammar \
         element slightly above the learner's current level (the i+1 principle). {focus}\n\
         5. HOOK: always end with an open-ended question to keep them speaking.\n\n\
         ### STYLE\n\
         {tone}\n\
         Keep the whole reply to 3-4 sentences at most. Use natural spoken \
         contractions unless teaching formal English.\n\n\
         ### LEARNING TAGS\n\
         When you introduce or correct something durable, also emit it as a bracketed \
         tag, using exactly this grammar (fields separated by '|'):\n\
         {TAG_GRAMMAR}\n\
         Tags are machine-read and stripped before your reply is spoken aloud; never \
         refer to them in prose."
    ))
}

/// Compose the ordered message list for a completion request: the instruction
/// as the leading system message, then the most recent turns of the session.
///
/// Only the last `history_window` turns are sent; older history is
/// deliberately dropped to bound token cost.
///
/// # Errors
///
/// Returns `Error::Config` if the instruction cannot be built
pub fn compose_messages(config: &TutorConfig, session: &Session) -> Result<Vec<ChatMessage>> {
    let mut messages = Vec::with_capacity(config.history_window + 1);
    messages.push(ChatMessage::system(build_instruction(config)?));

    for turn in session.recent_turns(config.history_window) {
        messages.push(ChatMessage {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        });
    }

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccentRegion;
    use crate::session::{Turn, TurnRole};

    fn config(style: TeachingStyle, level: ProficiencyLevel) -> TutorConfig {
        TutorConfig {
            style,
            level,
            accent: AccentRegion::Us,
            model: "llama-3.3-70b-versatile".to_string(),
            history_window: 3,
        }
    }

    #[test]
    fn instruction_is_deterministic() {
        let cfg = config(TeachingStyle::Strict, ProficiencyLevel::Advanced);
        let a = build_instruction(&cfg).unwrap();
        let b = build_instruction(&cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn instruction_contains_lookup_phrases_verbatim() {
        let cfg = config(TeachingStyle::Humorous, ProficiencyLevel::Beginner);
        let instruction = build_instruction(&cfg).unwrap();

        assert!(instruction.contains(style_tone(TeachingStyle::Humorous).unwrap()));
        assert!(instruction.contains(level_focus(ProficiencyLevel::Beginner).unwrap()));
    }

    #[test]
    fn instruction_carries_the_tag_grammar() {
        let cfg = config(TeachingStyle::Friendly, ProficiencyLevel::Intermediate);
        let instruction = build_instruction(&cfg).unwrap();

        assert!(instruction.contains("[VOCAB: <word>|<meaning>|<example>]"));
        assert!(instruction.contains("[ACHIEVE: <description...>]"));
    }

    #[test]
    fn every_style_and_level_has_a_phrase() {
        for style in [
            TeachingStyle::Friendly,
            TeachingStyle::Strict,
            TeachingStyle::Professional,
            TeachingStyle::Motivational,
            TeachingStyle::Humorous,
        ] {
            assert!(style_tone(style).is_ok());
        }
        for level in [
            ProficiencyLevel::Beginner,
            ProficiencyLevel::Intermediate,
            ProficiencyLevel::Advanced,
        ] {
            assert!(level_focus(level).is_ok());
        }
    }

    #[test]
    fn compose_messages_windows_history() {
        let cfg = config(TeachingStyle::Friendly, ProficiencyLevel::Intermediate);
        let mut session = Session::new();
        for i in 0..6 {
            session.append_turn(Turn::new(TurnRole::User, format!("message {i}")));
        }

        let messages = compose_messages(&cfg, &session).unwrap();

        // system + history_window turns
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "message 3");
        assert_eq!(messages[3].content, "message 5");
    }

    #[test]
    fn current_config_is_used_each_call() {
        let session = Session::new();
        let mut cfg = config(TeachingStyle::Friendly, ProficiencyLevel::Beginner);
        let before = compose_messages(&cfg, &session).unwrap();

        cfg.style = TeachingStyle::Strict;
        let after = compose_messages(&cfg, &session).unwrap();

        assert_ne!(before[0].content, after[0].content);
    }
}
