//! Configuration management for the tutoring gateway

pub mod file;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use file::TutorConfigFile;

/// Teaching style, controls the tone phrase injected into the instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TeachingStyle {
    Friendly,
    Strict,
    Professional,
    Motivational,
    Humorous,
}

/// Learner proficiency level, controls the focus phrase and the i+1 challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// English accent region for speech synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccentRegion {
    Us,
    Uk,
    Au,
    In,
}

impl AccentRegion {
    /// Google Translate TTS top-level domain for this accent
    #[must_use]
    pub const fn tts_tld(self) -> &'static str {
        match self {
            Self::Us => "com",
            Self::Uk => "co.uk",
            Self::Au => "com.au",
            Self::In => "co.in",
        }
    }
}

impl fmt::Display for TeachingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Friendly => "friendly",
            Self::Strict => "strict",
            Self::Professional => "professional",
            Self::Motivational => "motivational",
            Self::Humorous => "humorous",
        };
        f.write_str(s)
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl fmt::Display for AccentRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Us => "us",
            Self::Uk => "uk",
            Self::Au => "au",
            Self::In => "in",
        };
        f.write_str(s)
    }
}

/// Tutor settings that shape each conversation turn
///
/// May change between turns via the settings API; the prompt composer reads
/// the current values on every call rather than caching them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TutorConfig {
    /// Teaching style
    pub style: TeachingStyle,

    /// Learner proficiency level
    pub level: ProficiencyLevel,

    /// English accent region for synthesized speech
    pub accent: AccentRegion,

    /// Chat model identifier sent to the completion service
    pub model: String,

    /// Number of most recent turns included with each completion request.
    /// Older history is deliberately dropped to bound token cost.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            style: TeachingStyle::Friendly,
            level: ProficiencyLevel::Intermediate,
            accent: AccentRegion::Us,
            model: default_chat_model(),
            history_window: default_history_window(),
        }
    }
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT model identifier (e.g. "whisper-large-v3-turbo")
    pub stt_model: String,

    /// TTS provider ("openai" or "gtranslate")
    pub tts_provider: String,

    /// TTS voice identifier (OpenAI provider only)
    pub tts_voice: String,

    /// TTS speed multiplier (OpenAI provider only)
    pub tts_speed: f32,

    /// Whether to synthesize replies at all
    pub enabled: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            stt_model: "whisper-large-v3-turbo".to_string(),
            tts_provider: "gtranslate".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            enabled: true,
        }
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Groq API key (Whisper transcription + chat completions)
    pub groq: Option<String>,

    /// `OpenAI` API key (Whisper, chat, TTS)
    pub openai: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 18990 }
    }
}

/// Top-level gateway configuration
///
/// Built from defaults, overlaid by an optional TOML file, overlaid by
/// environment variables. The file and every field in it are optional.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Tutor settings (style, level, accent, model, history window)
    pub tutor: TutorConfig,

    /// Voice settings (STT/TTS models and toggles)
    pub voice: VoiceConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,

    /// HTTP server settings
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration: defaults, then optional TOML overlay, then env vars
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let overlay: TutorConfigFile = toml::from_str(&content)?;
                config.apply_file(overlay);
                tracing::info!(path = %path.display(), "loaded config file");
            } else {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Overlay values from a parsed TOML file
    fn apply_file(&mut self, overlay: TutorConfigFile) {
        if let Some(style) = overlay.tutor.style {
            self.tutor.style = style;
        }
        if let Some(level) = overlay.tutor.level {
            self.tutor.level = level;
        }
        if let Some(accent) = overlay.tutor.accent {
            self.tutor.accent = accent;
        }
        if let Some(model) = overlay.tutor.model {
            self.tutor.model = model;
        }
        if let Some(window) = overlay.tutor.history_window {
            self.tutor.history_window = window;
        }

        if let Some(model) = overlay.voice.stt_model {
            self.voice.stt_model = model;
        }
        if let Some(provider) = overlay.voice.tts_provider {
            self.voice.tts_provider = provider;
        }
        if let Some(voice) = overlay.voice.tts_voice {
            self.voice.tts_voice = voice;
        }
        if let Some(speed) = overlay.voice.tts_speed {
            self.voice.tts_speed = speed;
        }
        if let Some(enabled) = overlay.voice.enabled {
            self.voice.enabled = enabled;
        }

        if let Some(key) = overlay.api_keys.groq {
            self.api_keys.groq = Some(key);
        }
        if let Some(key) = overlay.api_keys.openai {
            self.api_keys.openai = Some(key);
        }

        if let Some(port) = overlay.server.port {
            self.server.port = port;
        }
    }

    /// Overlay values from environment variables
    fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Env overlay over an injectable lookup, so tests stay off the
    /// process-global environment
    fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GROQ_API_KEY").filter(|v| !v.is_empty()) {
            self.api_keys.groq = Some(key);
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.api_keys.openai = Some(key);
        }
        if let Some(model) = lookup("LINGO_CHAT_MODEL").filter(|v| !v.is_empty()) {
            self.tutor.model = model;
        }
    }
}

fn default_chat_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

const fn default_history_window() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_friendly_intermediate_us() {
        let config = Config::default();
        assert_eq!(config.tutor.style, TeachingStyle::Friendly);
        assert_eq!(config.tutor.level, ProficiencyLevel::Intermediate);
        assert_eq!(config.tutor.accent, AccentRegion::Us);
        assert_eq!(config.tutor.history_window, 8);
    }

    #[test]
    fn accent_maps_to_gtranslate_tld() {
        assert_eq!(AccentRegion::Us.tts_tld(), "com");
        assert_eq!(AccentRegion::Uk.tts_tld(), "co.uk");
        assert_eq!(AccentRegion::Au.tts_tld(), "com.au");
        assert_eq!(AccentRegion::In.tts_tld(), "co.in");
    }

    #[test]
    fn toml_overlay_is_partial() {
        let overlay: TutorConfigFile = toml::from_str(
            r#"
            [tutor]
            style = "strict"
            level = "beginner"

            [server]
            port = 9999
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.apply_file(overlay);

        assert_eq!(config.tutor.style, TeachingStyle::Strict);
        assert_eq!(config.tutor.level, ProficiencyLevel::Beginner);
        // Untouched fields keep defaults
        assert_eq!(config.tutor.accent, AccentRegion::Us);
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn env_overrides_file_values() {
        let overlay: TutorConfigFile =
            toml::from_str("[tutor]\nmodel = \"from-file\"\n").unwrap();

        let mut config = Config::default();
        config.apply_file(overlay);
        assert_eq!(config.tutor.model, "from-file");

        config.apply_env_with(|name| {
            (name == "LINGO_CHAT_MODEL").then(|| "from-env".to_string())
        });
        assert_eq!(config.tutor.model, "from-env");

        // Empty env values never clobber earlier layers
        config.apply_env_with(|_| Some(String::new()));
        assert_eq!(config.tutor.model, "from-env");
    }

    #[test]
    fn load_reads_toml_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lingo.toml");
        std::fs::write(&path, "[tutor]\naccent = \"uk\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tutor.accent, AccentRegion::Uk);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = Config::load(Some(std::path::Path::new("/nonexistent/lingo.toml")));
        assert!(result.is_err());
    }
}
