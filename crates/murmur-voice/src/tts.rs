//! Speech synthesis boundary: reply text in, WAV bytes out.

use crate::config::SpeechServiceConfig;
use crate::error::{AgentError, AgentResult};
use async_trait::async_trait;
use std::time::Duration;

/// Turns reply text into WAV-encoded audio.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize text to WAV bytes. An empty result means nothing to say.
    async fn synthesize(&self, text: &str) -> AgentResult<Vec<u8>>;
}

/// OpenAI-compatible synthesis client (`POST {base}/audio/speech`).
#[derive(Debug, Clone)]
pub struct HttpSynthesizer {
    base_url: String,
    api_key: String,
    model: String,
    voice: String,
    client: reqwest::Client,
}

impl HttpSynthesizer {
    pub fn new(speech: &SpeechServiceConfig) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AgentError::Tts(e.to_string()))?;
        Ok(Self {
            base_url: speech.base_url.clone(),
            api_key: speech.api_key.clone(),
            model: speech.tts_model.clone(),
            voice: speech.tts_voice.clone(),
            client,
        })
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> AgentResult<Vec<u8>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/audio/speech", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
            "voice": self.voice,
            "response_format": "wav",
        });
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Tts(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AgentError::Tts(format!(
                "synthesis API error {status}: {body}"
            )));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|e| AgentError::Tts(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Synthesizer that never speaks. Useful for exercising the turn loop
/// without an audio backend.
#[derive(Debug, Default)]
pub struct SilentSynthesizer;

#[async_trait]
impl Synthesizer for SilentSynthesizer {
    async fn synthesize(&self, _text: &str) -> AgentResult<Vec<u8>> {
        Ok(Vec::new())
    }
}
