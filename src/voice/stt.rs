//! Speech-to-text (STT) processing

use async_trait::async_trait;

use crate::{Error, Result};

/// Abstract transcription collaborator
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns `Error::Transcription` on network, auth, or API failure
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<String>;
}

/// Response from Whisper-style transcription APIs
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// STT provider backend
#[derive(Clone, Copy, Debug)]
enum SttProvider {
    Groq,
    OpenAI,
}

impl SttProvider {
    const fn transcriptions_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1/audio/transcriptions",
            Self::OpenAI => "https://api.openai.com/v1/audio/transcriptions",
        }
    }
}

/// Transcribes speech to text via a hosted Whisper endpoint
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT instance using Groq's hosted Whisper
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new_groq(api_key: String, model: String) -> Result<Self> {
        Self::new(api_key, model, SttProvider::Groq, "Groq")
    }

    /// Create a new STT instance using `OpenAI` Whisper
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new_openai(api_key: String, model: String) -> Result<Self> {
        Self::new(api_key, model, SttProvider::OpenAI, "OpenAI")
    }

    fn new(api_key: String, model: String, provider: SttProvider, label: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "{label} API key required for transcription"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider,
        })
    }
}

#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, audio: &[u8], language_hint: Option<&str>) -> Result<String> {
        tracing::debug!(
            audio_bytes = audio.len(),
            provider = ?self.provider,
            "starting transcription"
        );

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec())
                    .file_name("audio.wav")
                    .mime_str("audio/wav")
                    .map_err(|e| Error::Transcription(e.to_string()))?,
            )
            .text("model", self.model.clone())
            .text("response_format", "json");

        if let Some(language) = language_hint {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(self.provider.transcriptions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                Error::Transcription(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription API error");
            return Err(Error::Transcription(format!(
                "transcription API error {status}: {body}"
            )));
        }

        let result: WhisperResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("failed to parse response: {e}")))?;

        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}
