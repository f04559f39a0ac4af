//! Lingo Tutor - Voice-driven conversational English tutoring gateway
//!
//! This library provides the core of a voice tutoring loop:
//! - Session state (transcript + learning progress)
//! - Deterministic instruction composition from tutor settings
//! - Structured tag extraction from model replies into learning records
//! - A turn controller sequencing the external collaborators
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │            Client UI (not in this crate)             │
//! │        recorder  │  transcript UI  │  settings       │
//! └────────────────────┬────────────────────────────────┘
//!                      │ HTTP
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Turn Controller                      │
//! │  Session Store │ Prompt Composer │ Tag Extractor    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │           External collaborators (HTTP)              │
//! │        STT  │  chat completion  │  TTS              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Speech recognition, language modeling, and audio synthesis are all
//! delegated; nothing here processes audio or runs inference.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod llm;
pub mod progress;
pub mod prompt;
pub mod session;
pub mod tags;
pub mod voice;

pub use config::{AccentRegion, Config, ProficiencyLevel, TeachingStyle, TutorConfig};
pub use controller::{TurnController, TurnOutcome, TurnPhase};
pub use error::{Error, Result};
pub use llm::{ChatClient, ChatCompleter, ChatMessage, SamplingParams};
pub use progress::{LearningRecord, Progress};
pub use session::{Session, Turn, TurnRole};
pub use tags::{Extraction, extract};
pub use voice::{SpeechSynthesizer, SpeechToText, TextToSpeech, Transcriber};
