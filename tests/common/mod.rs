//! Shared test utilities: scripted collaborator mocks

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use lingo_tutor::config::AccentRegion;
use lingo_tutor::voice::{SpeechSynthesizer, Transcriber};
use lingo_tutor::{ChatCompleter, ChatMessage, Error, Result, SamplingParams};

/// Transcriber that returns a fixed transcript and counts invocations
pub struct MockTranscriber {
    transcript: String,
    pub calls: AtomicUsize,
}

impl MockTranscriber {
    pub fn new(transcript: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            transcript: transcript.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8], _language_hint: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.clone())
    }
}

/// Completer that plays back a script of replies or failures
pub struct MockCompleter {
    script: Mutex<VecDeque<Result<String>>>,
    pub calls: AtomicUsize,
    /// Message lists seen by each call
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockCompleter {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Self::scripted(vec![Ok(reply.into())])
    }

    pub fn scripted(script: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompleter for MockCompleter {
    async fn complete(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _params: SamplingParams,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(messages.to_vec());
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(Error::Completion("script exhausted".to_string())))
    }
}

/// Synthesizer that returns canned bytes or always fails
pub struct MockSynthesizer {
    fail: bool,
    pub calls: AtomicUsize,
}

impl MockSynthesizer {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, _text: &str, _accent: AccentRegion) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Synthesis("tts unavailable".to_string()))
        } else {
            Ok(vec![0x49, 0x44, 0x33]) // "ID3"
        }
    }
}
