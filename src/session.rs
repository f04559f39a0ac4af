//! In-memory session state
//!
//! One `Session` holds the ordered conversation transcript and the learning
//! progress for a single live tutoring session. There is no persistence
//! across process restarts; the session is passed by handle into the turn
//! controller rather than living in a global.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::Progress;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Wire name used in chat-completion requests and exports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One utterance in the conversation, immutable once created
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current wall-clock time
    #[must_use]
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A single live tutoring session
///
/// The transcript and progress both belong to the session; the transcript can
/// be cleared independently (the "clear chat" affordance) while progress
/// counters and records survive.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    turns: Vec<Turn>,
    /// Learning progress, mutated only by the turn controller
    pub progress: Progress,
}

impl Session {
    /// Create a fresh session with zeroed progress
    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            progress: Progress {
                sessions_count: 1,
                ..Progress::default()
            },
        }
    }

    /// Append a turn to the transcript. Never fails.
    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The full ordered transcript
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Iterator over the last `n` turns in chronological order
    pub fn recent_turns(&self, n: usize) -> impl Iterator<Item = &Turn> {
        let start = self.turns.len().saturating_sub(n);
        self.turns[start..].iter()
    }

    /// The user turn still awaiting an assistant reply, if the transcript
    /// ends with one. Used by the turn controller to resume idempotently.
    #[must_use]
    pub fn pending_user_turn(&self) -> Option<&Turn> {
        self.turns
            .last()
            .filter(|turn| turn.role == TurnRole::User)
    }

    /// Clear the transcript. Progress counters and records survive.
    pub fn reset(&mut self) {
        self.turns.clear();
        tracing::info!("session transcript cleared");
    }

    /// Export the transcript as one mapping per turn with
    /// `role`, `content` and an RFC 3339 `timestamp`
    #[must_use]
    pub fn export(&self) -> Vec<serde_json::Value> {
        self.turns
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "content": turn.content,
                    "timestamp": turn.timestamp.to_rfc3339(),
                })
            })
            .collect()
    }
}
