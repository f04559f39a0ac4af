//! Structured tag extraction from model output
//!
//! The tutor model is instructed to embed learning annotations in its replies
//! using a bracketed grammar:
//!
//! ```text
//! [VOCAB: <word>|<meaning>|<example>]
//! [IDIOM: <phrase>|<meaning>|<usage>]
//! [GRAMMAR: <rule>|<example...>]
//! [PRONUN: <tip...>]
//! [CULTURE: <note...>]
//! [ACHIEVE: <description...>]
//! ```
//!
//! `extract` parses every tag of this grammar out of a reply, producing typed
//! [`LearningRecord`]s and the clean text handed to speech synthesis and the
//! transcript. The extractor is pure; the turn controller persists the
//! records. Malformed tags are tolerated, never raised: a tag with too few
//! fields is dropped (but still stripped from the text), and an unclosed tag
//! is left in the text untouched.

use crate::progress::LearningRecord;

/// Result of extracting tags from one model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Reply text with every well-formed tag span removed
    pub clean_text: String,

    /// Records parsed from the tags, in order of appearance
    pub records: Vec<LearningRecord>,
}

/// One entry in the fixed kind table: tag name and minimum field count.
/// Fields beyond the minimum are joined with `" | "` into the final field
/// for open-ended kinds.
struct TagRule {
    kind: &'static str,
    min_fields: usize,
}

const TAG_RULES: &[TagRule] = &[
    TagRule { kind: "VOCAB", min_fields: 3 },
    TagRule { kind: "IDIOM", min_fields: 3 },
    TagRule { kind: "GRAMMAR", min_fields: 2 },
    TagRule { kind: "PRONUN", min_fields: 1 },
    TagRule { kind: "CULTURE", min_fields: 1 },
    TagRule { kind: "ACHIEVE", min_fields: 1 },
];

/// Extract all learning tags from a model reply
///
/// Returns the reply with tag spans cut out verbatim (surrounding whitespace
/// is preserved) and the records parsed from them. Text without tags comes
/// back byte-identical.
#[must_use]
pub fn extract(model_text: &str) -> Extraction {
    let mut clean_text = String::with_capacity(model_text.len());
    let mut records = Vec::new();
    let mut rest = model_text;

    while let Some(open) = rest.find('[') {
        let (prefix, tail) = rest.split_at(open);
        clean_text.push_str(prefix);

        // tail starts at '['; inner is everything after it
        let inner = &tail[1..];
        match parse_tag(inner) {
            TagParse::Tag { consumed, record } => {
                if let Some(record) = record {
                    records.push(record);
                }
                rest = &inner[consumed..];
            }
            TagParse::NotATag => {
                clean_text.push('[');
                rest = inner;
            }
        }
    }
    clean_text.push_str(rest);

    Extraction {
        clean_text,
        records,
    }
}

/// Outcome of attempting to parse a tag at the start of `inner`
enum TagParse {
    /// A tag of the grammar was found; `consumed` bytes of `inner` (through
    /// the closing `]`) belong to it. `record` is `None` for a malformed tag
    /// that was recognized but discarded.
    Tag {
        consumed: usize,
        record: Option<LearningRecord>,
    },
    /// Not part of the grammar; leave the text as-is
    NotATag,
}

/// Try to parse one tag from `inner`, the text immediately after a `[`
fn parse_tag(inner: &str) -> TagParse {
    // An unclosed tag is ignored entirely, not partially parsed
    let Some(close) = inner.find(']') else {
        return TagParse::NotATag;
    };

    let body = &inner[..close];
    let Some((kind, fields_text)) = body.split_once(':') else {
        return TagParse::NotATag;
    };

    let kind = kind.trim();
    let Some(rule) = TAG_RULES.iter().find(|r| r.kind == kind) else {
        return TagParse::NotATag;
    };

    let consumed = close + 1;
    let fields: Vec<&str> = fields_text.split('|').map(str::trim).collect();
    if fields.len() < rule.min_fields {
        tracing::debug!(kind = %kind, fields = fields.len(), "dropping malformed tag");
        return TagParse::Tag {
            consumed,
            record: None,
        };
    }

    TagParse::Tag {
        consumed,
        record: Some(build_record(kind, &fields)),
    }
}

/// Construct the record for a validated tag. `fields` meets the minimum
/// count for `kind`.
fn build_record(kind: &str, fields: &[&str]) -> LearningRecord {
    match kind {
        "VOCAB" => LearningRecord::Vocabulary {
            word: fields[0].to_string(),
            meaning: fields[1].to_string(),
            example: fields[2].to_string(),
        },
        "IDIOM" => LearningRecord::Idiom {
            phrase: fields[0].to_string(),
            meaning: fields[1].to_string(),
            usage: fields[2].to_string(),
        },
        "GRAMMAR" => LearningRecord::GrammarTip {
            rule: fields[0].to_string(),
            example: fields[1..].join(" | "),
        },
        "PRONUN" => LearningRecord::PronunciationNote {
            tip: fields.join(" | "),
        },
        "CULTURE" => LearningRecord::CultureNote {
            note: fields.join(" | "),
        },
        "ACHIEVE" => LearningRecord::Achievement {
            description: fields.join(" | "),
        },
        other => unreachable!("kind {other} not in tag table"),
    }
}
