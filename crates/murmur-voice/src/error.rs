//! Error types for the murmur voice agent

use thiserror::Error;

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur in the voice agent pipeline
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("VAD error: {0}")]
    Vad(String),

    #[error("transcription error: {0}")]
    Stt(String),

    #[error("speech synthesis error: {0}")]
    Tts(String),

    #[error("room error: {0}")]
    Room(String),

    #[error("audio format error: {0}")]
    Audio(String),

    #[error("channel send error: {0}")]
    ChannelSend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
