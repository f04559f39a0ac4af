//! Chat-completion client
//!
//! Talks to OpenAI-compatible `/chat/completions` endpoints (Groq by
//! default; plain OpenAI as the alternative).

use async_trait::async_trait;

use crate::{Error, Result};

/// One message in a completion request
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters forwarded to the completion endpoint
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
        }
    }
}

/// Abstract chat-completion collaborator
///
/// The turn controller depends on this seam so tests can drive it without a
/// network.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Request a completion for the ordered message list
    ///
    /// # Errors
    ///
    /// Returns `Error::Completion` on network, auth, or API failure
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: SamplingParams,
    ) -> Result<String>;
}

/// Chat provider backend
#[derive(Clone, Copy, Debug)]
enum ChatProvider {
    Groq,
    OpenAI,
}

impl ChatProvider {
    const fn completions_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Self::OpenAI => "https://api.openai.com/v1/chat/completions",
        }
    }
}

/// Response shape shared by OpenAI-compatible completion APIs
#[derive(serde::Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(serde::Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(serde::Deserialize)]
struct CompletionMessage {
    content: String,
}

/// HTTP chat-completion client
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    provider: ChatProvider,
}

impl ChatClient {
    /// Create a client for the Groq completion API
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new_groq(api_key: String) -> Result<Self> {
        Self::new(api_key, ChatProvider::Groq, "Groq")
    }

    /// Create a client for the `OpenAI` completion API
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(api_key, ChatProvider::OpenAI, "OpenAI")
    }

    fn new(api_key: String, provider: ChatProvider, label: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(format!(
                "{label} API key required for chat completions"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            provider,
        })
    }
}

#[async_trait]
impl ChatCompleter for ChatClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        params: SamplingParams,
    ) -> Result<String> {
        #[derive(serde::Serialize)]
        struct CompletionRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
            max_tokens: u32,
        }

        tracing::debug!(
            model = %model,
            messages = messages.len(),
            provider = ?self.provider,
            "requesting completion"
        );

        let request = CompletionRequest {
            model,
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(self.provider.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Completion(format!(
                "completion API error {status}: {body}"
            )));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Completion(format!("failed to parse response: {e}")))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Completion("completion response had no choices".to_string()))?;

        tracing::info!(chars = text.len(), "completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(ChatClient::new_groq(String::new()).is_err());
        assert!(ChatClient::new_openai(String::new()).is_err());
    }

    #[test]
    fn system_message_helper_sets_role() {
        let msg = ChatMessage::system("be brief");
        assert_eq!(msg.role, "system");
        assert_eq!(msg.content, "be brief");
    }
}
