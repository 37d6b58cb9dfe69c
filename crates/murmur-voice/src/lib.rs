//! # murmur-voice — room voice agent pipeline
//!
//! A voice agent that sits in a real-time audio room, listens to a remote
//! participant, and answers out loud. Raw PCM chunks are sliced into 10ms
//! analysis windows, classified by WebRTC VAD, and folded into utterances;
//! each utterance is transcribed and the reply is synthesized back into the
//! room.
//!
//! ## Architecture
//!
//! ```text
//!  room track ──► FrameAccumulator ──► VadClassifier ──► UtteranceSegmenter
//!  (PCM chunks)   (960-byte windows)   (speech/silence)    (utterances)
//!                                                               │
//!  room track ◄── Synthesizer ◄── "You said: …" ◄── Transcriber ◄┘
//!  (PCM frames)    (WAV reply)                       (WAV upload)
//! ```
//!
//! Each subscribed track gets its own segmenter, driven sequentially from a
//! single task; only the transcription and synthesis calls suspend, and they
//! run per-turn in detached tasks so listening never stops.

pub mod agent;
pub mod config;
pub mod error;
pub mod frame;
pub mod room;
pub mod segmenter;
pub mod stt;
pub mod tts;
pub mod vad;
pub mod wav;

pub use agent::{respond_turn, run_agent};
pub use config::{
    AgentConfig, PipelineConfig, RoomConfig, SpeechServiceConfig, DEFAULT_MIN_UTTERANCE_BYTES,
};
pub use error::{AgentError, AgentResult};
pub use frame::{FrameAccumulator, BYTES_PER_SAMPLE, SAMPLE_RATE, WINDOW_BYTES};
pub use room::{mint_join_token, RoomClient, RoomEvent};
pub use segmenter::{SegmenterEvent, Utterance, UtteranceSegmenter};
pub use stt::{FixedTranscriber, HttpTranscriber, Transcriber};
pub use tts::{HttpSynthesizer, SilentSynthesizer, Synthesizer};
pub use vad::{ScriptedClassifier, VadClassifier, VadDecision, WindowClassifier};
