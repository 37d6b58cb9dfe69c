//! Transcription boundary: finalized utterances in, text out.
//!
//! `Transcriber` is the seam; `HttpTranscriber` speaks to an OpenAI-compatible
//! transcription endpoint with a WAV multipart upload. Failures are scoped to
//! one turn and surface as `AgentError::Stt`.

use crate::config::SpeechServiceConfig;
use crate::error::{AgentError, AgentResult};
use crate::frame::SAMPLE_RATE;
use crate::segmenter::Utterance;
use crate::wav;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Converts one utterance's PCM to text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, utterance: &Utterance) -> AgentResult<String>;
}

/// OpenAI-compatible transcription client (`POST {base}/audio/transcriptions`).
#[derive(Debug, Clone)]
pub struct HttpTranscriber {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpTranscriber {
    pub fn new(speech: &SpeechServiceConfig) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AgentError::Stt(e.to_string()))?;
        Ok(Self {
            base_url: speech.base_url.clone(),
            api_key: speech.api_key.clone(),
            model: speech.stt_model.clone(),
            client,
        })
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, utterance: &Utterance) -> AgentResult<String> {
        if utterance.audio.is_empty() {
            return Ok(String::new());
        }
        let wav_bytes = wav::encode(&utterance.audio, SAMPLE_RATE);
        let url = format!(
            "{}/audio/transcriptions",
            self.base_url.trim_end_matches('/')
        );
        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| AgentError::Stt(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AgentError::Stt(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::Stt(format!(
                "transcription API error {status}: {body}"
            )));
        }
        let json: serde_json::Value = res
            .json()
            .await
            .map_err(|e| AgentError::Stt(e.to_string()))?;
        let text = json
            .get("text")
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        Ok(text)
    }
}

/// Canned transcriber for tests and dry runs: returns a fixed transcript and
/// counts how many times it was asked.
#[derive(Debug, Default)]
pub struct FixedTranscriber {
    response: String,
    calls: AtomicUsize,
}

impl FixedTranscriber {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many utterances reached this transcriber.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _utterance: &Utterance) -> AgentResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
