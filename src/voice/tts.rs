//! Text-to-speech (TTS) processing

use async_trait::async_trait;

use crate::config::AccentRegion;
use crate::{Error, Result};

/// Abstract speech-synthesis collaborator
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize text to speech (MP3 bytes)
    ///
    /// # Errors
    ///
    /// Returns `Error::Synthesis` on network, auth, or API failure
    async fn synthesize(&self, text: &str, accent: AccentRegion) -> Result<Vec<u8>>;
}

/// TTS provider backend
#[derive(Clone, Copy, Debug)]
enum TtsProvider {
    OpenAI,
    /// Google Translate's TTS endpoint; the accent region selects the
    /// top-level domain, which selects the regional voice
    GoogleTranslate,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: String,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a new TTS instance using `OpenAI`
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new_openai(api_key: String, voice: String, speed: f32) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("OpenAI API key required for TTS".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice,
            speed,
            model: "tts-1".to_string(),
            provider: TtsProvider::OpenAI,
        })
    }

    /// Create a new TTS instance using Google Translate (no API key needed)
    #[must_use]
    pub fn new_gtranslate() -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: String::new(),
            voice: String::new(),
            speed: 1.0,
            model: String::new(),
            provider: TtsProvider::GoogleTranslate,
        }
    }

    /// Synthesize using OpenAI TTS
    async fn synthesize_openai(&self, text: &str) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!("OpenAI TTS error {status}: {body}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        Ok(audio.to_vec())
    }

    /// Synthesize using the Google Translate TTS endpoint
    async fn synthesize_gtranslate(&self, text: &str, accent: AccentRegion) -> Result<Vec<u8>> {
        let url = format!(
            "https://translate.google.{}/translate_tts?ie=UTF-8&client=tw-ob&tl=en&q={}",
            accent.tts_tld(),
            urlencoding::encode(text)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Synthesis(format!(
                "Google Translate TTS error {status}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        Ok(audio.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for TextToSpeech {
    async fn synthesize(&self, text: &str, accent: AccentRegion) -> Result<Vec<u8>> {
        tracing::debug!(
            chars = text.len(),
            accent = %accent,
            provider = ?self.provider,
            "starting synthesis"
        );

        match self.provider {
            TtsProvider::OpenAI => self.synthesize_openai(text).await,
            TtsProvider::GoogleTranslate => self.synthesize_gtranslate(text, accent).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_api_key() {
        assert!(TextToSpeech::new_openai(String::new(), "alloy".to_string(), 1.0).is_err());
    }
}
