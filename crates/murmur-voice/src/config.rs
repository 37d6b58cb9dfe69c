//! Agent configuration loaded from `.env`.
//!
//! Everything the agent needs at startup lives in one explicit struct that is
//! built once and passed to component constructors. Nothing downstream reads
//! the process environment.

use crate::error::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default minimum finalized utterance size in bytes (~0.4s of 16-bit mono
/// PCM at 48kHz). Shorter segments are treated as noise and dropped.
pub const DEFAULT_MIN_UTTERANCE_BYTES: usize = 40_000;

const DEFAULT_VAD_MODE: u8 = 2;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Room server settings and signing credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// WebSocket URL of the room server.
    pub url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    /// Room the agent joins.
    pub room_name: String,
    /// Join token lifetime in seconds.
    pub token_ttl_seconds: u64,
}

impl fmt::Debug for RoomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("room_name", &self.room_name)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

/// OpenAI-compatible transcription/synthesis service settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechServiceConfig {
    /// Base URL without trailing slash (e.g. https://api.openai.com/v1).
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub stt_model: String,
    pub tts_model: String,
    pub tts_voice: String,
}

impl fmt::Debug for SpeechServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("stt_model", &self.stt_model)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .finish()
    }
}

/// Tuning for the segmentation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// WebRTC VAD aggressiveness (0-3, where 3 is most aggressive).
    pub vad_mode: u8,
    /// Finalized utterances below this byte count are dropped as noise.
    pub min_utterance_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vad_mode: DEFAULT_VAD_MODE,
            min_utterance_bytes: DEFAULT_MIN_UTTERANCE_BYTES,
        }
    }
}

/// Complete agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub room: RoomConfig,
    /// Participant identity the agent publishes under.
    pub identity: String,
    pub speech: SpeechServiceConfig,
    pub pipeline: PipelineConfig,
}

impl AgentConfig {
    /// Load the agent configuration from environment.
    ///
    /// | Env | Default | Description |
    /// |-----|---------|-------------|
    /// | LIVEKIT_URL | required | WebSocket URL of the room server. |
    /// | LIVEKIT_API_KEY | required | API key used to sign join tokens. |
    /// | LIVEKIT_API_SECRET | required | API secret used to sign join tokens. |
    /// | ROOM_NAME | required | Room the agent joins. |
    /// | AGENT_NAME | murmur | Participant identity of the agent. |
    /// | LIVEKIT_TOKEN_TTL_SECS | 3600 | Join token lifetime in seconds. |
    /// | OPENAI_API_KEY | required | Bearer key for the speech services. |
    /// | SPEECH_API_URL | https://api.openai.com/v1 | OpenAI-compatible base URL. |
    /// | STT_MODEL | gpt-4o-mini-transcribe | Transcription model. |
    /// | TTS_MODEL | gpt-4o-mini-tts | Synthesis model. |
    /// | TTS_VOICE | alloy | Synthesis voice. |
    /// | MURMUR_VAD_MODE | 2 | WebRTC VAD aggressiveness (0-3). |
    /// | MURMUR_MIN_UTTERANCE_BYTES | 40000 | Minimum utterance size (~0.4s). |
    pub fn from_env() -> AgentResult<Self> {
        Ok(Self {
            room: RoomConfig {
                url: env_required("LIVEKIT_URL")?,
                api_key: env_required("LIVEKIT_API_KEY")?,
                api_secret: env_required("LIVEKIT_API_SECRET")?,
                room_name: env_required("ROOM_NAME")?,
                token_ttl_seconds: env_parse("LIVEKIT_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            },
            identity: env_or("AGENT_NAME", "murmur"),
            speech: SpeechServiceConfig {
                base_url: env_or("SPEECH_API_URL", "https://api.openai.com/v1"),
                api_key: env_required("OPENAI_API_KEY")?,
                stt_model: env_or("STT_MODEL", "gpt-4o-mini-transcribe"),
                tts_model: env_or("TTS_MODEL", "gpt-4o-mini-tts"),
                tts_voice: env_or("TTS_VOICE", "alloy"),
            },
            pipeline: PipelineConfig {
                vad_mode: env_parse("MURMUR_VAD_MODE", DEFAULT_VAD_MODE),
                min_utterance_bytes: env_parse(
                    "MURMUR_MIN_UTTERANCE_BYTES",
                    DEFAULT_MIN_UTTERANCE_BYTES,
                ),
            },
        })
    }
}

fn env_required(key: &str) -> AgentResult<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AgentError::Config(format!("{key} is not set"))),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults() {
        let p = PipelineConfig::default();
        assert_eq!(p.vad_mode, 2);
        assert_eq!(p.min_utterance_bytes, 40_000);
    }

    #[test]
    fn from_env_requires_room_credentials() {
        std::env::remove_var("LIVEKIT_URL");
        assert!(AgentConfig::from_env().is_err());

        std::env::set_var("LIVEKIT_URL", "wss://rooms.example.com");
        std::env::set_var("LIVEKIT_API_KEY", "key");
        std::env::set_var("LIVEKIT_API_SECRET", "secret");
        std::env::set_var("ROOM_NAME", "lobby");
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("MURMUR_MIN_UTTERANCE_BYTES", "12345");

        let config = AgentConfig::from_env().unwrap();
        assert_eq!(config.room.room_name, "lobby");
        assert_eq!(config.identity, "murmur");
        assert_eq!(config.speech.tts_voice, "alloy");
        assert_eq!(config.pipeline.min_utterance_bytes, 12_345);
    }

    #[test]
    fn debug_redacts_secrets() {
        let room = RoomConfig {
            url: "wss://rooms.example.com".into(),
            api_key: "key".into(),
            api_secret: "very-secret".into(),
            room_name: "lobby".into(),
            token_ttl_seconds: 3600,
        };
        let rendered = format!("{room:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("very-secret"));
    }
}
