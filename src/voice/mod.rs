//! Voice processing module
//!
//! HTTP clients for the external speech collaborators. Audio capture and
//! playback belong to the presentation layer and are delegated entirely.

mod stt;
mod tts;

pub use stt::{SpeechToText, Transcriber};
pub use tts::{SpeechSynthesizer, TextToSpeech};
