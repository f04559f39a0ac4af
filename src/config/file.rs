//! TOML configuration file loading
//!
//! All fields are optional — the file is a partial overlay on top of defaults.

use serde::Deserialize;

use super::{AccentRegion, ProficiencyLevel, TeachingStyle};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TutorConfigFile {
    /// Tutor settings
    #[serde(default)]
    pub tutor: TutorFileSection,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileSection,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileSection,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileSection,
}

/// Tutor-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct TutorFileSection {
    /// Teaching style ("friendly", "strict", ...)
    pub style: Option<TeachingStyle>,

    /// Proficiency level ("beginner", "intermediate", "advanced")
    pub level: Option<ProficiencyLevel>,

    /// Accent region ("us", "uk", "au", "in")
    pub accent: Option<AccentRegion>,

    /// Chat model identifier (e.g. "llama-3.3-70b-versatile")
    pub model: Option<String>,

    /// Turns of history sent with each completion request
    pub history_window: Option<usize>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileSection {
    /// STT model (e.g. "whisper-large-v3-turbo")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "gtranslate")
    pub tts_provider: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Whether replies are synthesized at all
    pub enabled: Option<bool>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileSection {
    pub groq: Option<String>,
    pub openai: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileSection {
    /// HTTP server port
    pub port: Option<u16>,
}
