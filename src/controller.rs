//! Turn controller
//!
//! The explicit state machine driving one conversation turn:
//!
//! ```text
//! Idle --audio captured--> transcribing --user turn appended--> AwaitingModelReply --reply appended--> Idle
//! ```
//!
//! Transcription happens inline and appends the user turn in the same call,
//! so only `Idle` and `AwaitingModelReply` survive between invocations.
//!
//! Errors from the external collaborators surface immediately; the partial
//! mutations of the failing step are discarded and the machine resumes from
//! the session shape on the next trigger. Because the session records which
//! step last completed (a trailing user turn means a reply is still owed),
//! re-invoking the controller never duplicates work: a pending user turn is
//! picked up at `AwaitingModelReply` without re-transcribing.

use std::sync::Arc;

use crate::config::TutorConfig;
use crate::llm::{ChatCompleter, SamplingParams};
use crate::prompt;
use crate::session::{Session, Turn, TurnRole};
use crate::tags;
use crate::voice::{SpeechSynthesizer, Transcriber};
use crate::Result;

/// Observable phase of the turn state machine, derived from session shape
///
/// Transcription is transient inside a single controller call and leaves no
/// session mutation behind, so it is never observable from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No work owed; waiting for the next utterance
    Idle,
    /// User turn appended, assistant reply not yet appended
    AwaitingModelReply,
}

/// Result of one controller invocation
#[derive(Debug)]
pub enum TurnOutcome {
    /// Transcription produced no speech; nothing was mutated
    NoSpeech,
    /// A full turn completed
    Reply {
        /// What the learner said
        transcript: String,
        /// Clean assistant reply (tags stripped), already appended
        reply: String,
        /// Learning records persisted this turn
        records_added: usize,
        /// Synthesized reply audio; `None` when synthesis is disabled or
        /// failed (text-only degradation)
        audio: Option<Vec<u8>>,
    },
}

/// Orchestrates the transcribe → complete → extract → synthesize sequence
pub struct TurnController {
    transcriber: Arc<dyn Transcriber>,
    completer: Arc<dyn ChatCompleter>,
    /// Absent when voice output is disabled
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    params: SamplingParams,
}

impl TurnController {
    /// Create a controller over the three external collaborators
    #[must_use]
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        completer: Arc<dyn ChatCompleter>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    ) -> Self {
        Self {
            transcriber,
            completer,
            synthesizer,
            params: SamplingParams::default(),
        }
    }

    /// Where the machine would resume for this session
    #[must_use]
    pub fn phase(session: &Session) -> TurnPhase {
        if session.pending_user_turn().is_some() {
            TurnPhase::AwaitingModelReply
        } else {
            TurnPhase::Idle
        }
    }

    /// Run a turn from captured audio
    ///
    /// If the session already ends with a user turn awaiting its reply (a
    /// previous invocation failed after transcription), the audio is ignored
    /// and the turn resumes at the model-reply step.
    ///
    /// # Errors
    ///
    /// Returns the collaborator error; the session keeps only the mutations
    /// of steps that fully completed
    pub async fn run_audio_turn(
        &self,
        session: &mut Session,
        config: &TutorConfig,
        audio: &[u8],
    ) -> Result<TurnOutcome> {
        let transcript = if let Some(pending) = session.pending_user_turn() {
            tracing::info!("resuming turn with pending user transcript");
            pending.content.clone()
        } else {
            let text = self.transcriber.transcribe(audio, Some("en")).await?;
            if text.trim().is_empty() {
                tracing::info!("no speech detected, session untouched");
                return Ok(TurnOutcome::NoSpeech);
            }
            session.append_turn(Turn::new(TurnRole::User, text.trim()));
            text.trim().to_string()
        };

        self.finish_turn(session, config, transcript).await
    }

    /// Run a turn from already-transcribed text (clients without a recorder)
    ///
    /// Re-entrancy matches `run_audio_turn`: a pending user turn wins over
    /// the supplied text.
    ///
    /// # Errors
    ///
    /// Returns the collaborator error; completed steps are kept
    pub async fn run_text_turn(
        &self,
        session: &mut Session,
        config: &TutorConfig,
        text: &str,
    ) -> Result<TurnOutcome> {
        let transcript = if let Some(pending) = session.pending_user_turn() {
            tracing::info!("resuming turn with pending user transcript");
            pending.content.clone()
        } else {
            if text.trim().is_empty() {
                return Ok(TurnOutcome::NoSpeech);
            }
            session.append_turn(Turn::new(TurnRole::User, text.trim()));
            text.trim().to_string()
        };

        self.finish_turn(session, config, transcript).await
    }

    /// The `AwaitingModelReply` half of the turn: complete, extract tags,
    /// persist records, append the assistant turn, update counters, then
    /// optionally synthesize.
    async fn finish_turn(
        &self,
        session: &mut Session,
        config: &TutorConfig,
        transcript: String,
    ) -> Result<TurnOutcome> {
        let messages = prompt::compose_messages(config, session)?;
        let raw_reply = self
            .completer
            .complete(&config.model, &messages, self.params)
            .await?;

        let extraction = tags::extract(&raw_reply);
        let records_added = extraction.records.len();
        for record in extraction.records {
            session.progress.append(record.kind(), record);
        }

        session.append_turn(Turn::new(TurnRole::Assistant, extraction.clean_text.clone()));
        session.progress.total_words_spoken += transcript.split_whitespace().count() as u64;
        if extraction.clean_text.contains("Correction:") {
            session.progress.corrections_made += 1;
        }

        // Synthesis failure never discards the assistant turn: the text
        // reply is salvageable, voice degrades silently.
        let audio = match &self.synthesizer {
            Some(synthesizer) => match synthesizer
                .synthesize(&extraction.clean_text, config.accent)
                .await
            {
                Ok(audio) => Some(audio),
                Err(e) => {
                    tracing::warn!(error = %e, "synthesis failed, degrading to text-only");
                    None
                }
            },
            None => None,
        };

        tracing::info!(records_added, "turn complete");
        Ok(TurnOutcome::Reply {
            transcript,
            reply: extraction.clean_text,
            records_added,
            audio,
        })
    }
}
