//! Utterance boundaries from per-window speech flags.
//!
//! The segmenter is the only stateful piece of the pipeline: a two-state
//! machine (`Silence`/`Speaking`) fed by the classifier, with the raw chunk
//! stream accumulated alongside. Raw bytes follow chunk arrival, not window
//! alignment, so the buffer content can trail the VAD boundary by up to one
//! window's worth of audio.

use crate::config::PipelineConfig;
use crate::error::AgentResult;
use crate::frame::{FrameAccumulator, BYTES_PER_SAMPLE, SAMPLE_RATE};
use crate::vad::{VadClassifier, VadDecision, WindowClassifier};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info};

/// A finalized stretch of speech, bounded by silence on both sides.
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Raw PCM (16-bit LE mono at `SAMPLE_RATE`) collected while speaking.
    pub audio: Vec<u8>,
    /// When the closing silence window was classified.
    pub captured_at: DateTime<Utc>,
    /// Playback duration implied by the byte length.
    pub duration: Duration,
}

/// Events emitted while consuming the chunk stream.
#[derive(Debug, Clone)]
pub enum SegmenterEvent {
    /// A speech window arrived while idle; the utterance buffer was reset.
    SpeechStarted { at: DateTime<Utc> },
    /// A silence window closed the utterance; `len` is the finalized byte
    /// count, whether or not it clears the minimum-length gate.
    SpeechEnded { at: DateTime<Utc>, len: usize },
    /// Finalized audio at or above the minimum-length gate, ready for
    /// transcription.
    UtteranceReady(Utterance),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmenterState {
    Silence,
    Speaking,
}

/// Consumes raw PCM chunks and emits utterance boundaries.
///
/// One segmenter per audio stream; it owns its state and is driven from a
/// single task. Transitions are pure over the classifier's flags, so the
/// segmenter itself cannot fail once constructed.
pub struct UtteranceSegmenter<C = VadClassifier> {
    classifier: C,
    accumulator: FrameAccumulator,
    state: SegmenterState,
    full_audio: Vec<u8>,
    min_utterance_bytes: usize,
}

impl UtteranceSegmenter {
    /// Build a segmenter backed by the WebRTC VAD classifier.
    pub fn new(pipeline: &PipelineConfig) -> AgentResult<Self> {
        Ok(Self::with_classifier(
            VadClassifier::new(pipeline.vad_mode)?,
            pipeline.min_utterance_bytes,
        ))
    }
}

impl<C: WindowClassifier> UtteranceSegmenter<C> {
    /// Build a segmenter around any classifier implementation.
    pub fn with_classifier(classifier: C, min_utterance_bytes: usize) -> Self {
        Self {
            classifier,
            accumulator: FrameAccumulator::new(),
            state: SegmenterState::Silence,
            full_audio: Vec::new(),
            min_utterance_bytes,
        }
    }

    /// Feed one raw chunk and collect whatever events it produces.
    ///
    /// The chunk's bytes join the open utterance before its windows are
    /// classified, so a window the classifier cannot judge still contributes
    /// audio. Outside an utterance nothing is retained.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SegmenterEvent> {
        if self.state == SegmenterState::Speaking {
            self.full_audio.extend_from_slice(chunk);
        }
        self.accumulator.push(chunk);

        let mut events = Vec::new();
        for window in self.accumulator.drain_windows() {
            match (self.state, self.classifier.classify(&window)) {
                (SegmenterState::Silence, VadDecision::Speech) => {
                    self.state = SegmenterState::Speaking;
                    // Anything heard before this window is not part of the
                    // utterance.
                    self.full_audio.clear();
                    let at = Utc::now();
                    info!("speech started");
                    events.push(SegmenterEvent::SpeechStarted { at });
                }
                (SegmenterState::Speaking, VadDecision::Silence) => {
                    self.state = SegmenterState::Silence;
                    let audio = std::mem::take(&mut self.full_audio);
                    let len = audio.len();
                    let at = Utc::now();
                    info!(len, "speech ended");
                    events.push(SegmenterEvent::SpeechEnded { at, len });
                    if len >= self.min_utterance_bytes {
                        events.push(SegmenterEvent::UtteranceReady(Utterance {
                            audio,
                            captured_at: at,
                            duration: duration_of(len),
                        }));
                    } else {
                        debug!(
                            len,
                            min = self.min_utterance_bytes,
                            "utterance below minimum length, dropping"
                        );
                    }
                }
                // Same-state flags and inconclusive windows change nothing.
                _ => {}
            }
        }
        events
    }

    /// Whether an utterance is currently open.
    pub fn is_speaking(&self) -> bool {
        self.state == SegmenterState::Speaking
    }
}

fn duration_of(len: usize) -> Duration {
    Duration::from_secs_f64(len as f64 / (SAMPLE_RATE as f64 * BYTES_PER_SAMPLE as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::WINDOW_BYTES;
    use crate::vad::ScriptedClassifier;

    fn window_chunk(fill: u8) -> Vec<u8> {
        vec![fill; WINDOW_BYTES]
    }

    fn ready_audio(events: &[SegmenterEvent]) -> Vec<Vec<u8>> {
        events
            .iter()
            .filter_map(|e| match e {
                SegmenterEvent::UtteranceReady(u) => Some(u.audio.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_cycle_emits_one_start_and_one_end() {
        let script = ScriptedClassifier::new([
            VadDecision::Silence,
            VadDecision::Speech,
            VadDecision::Speech,
            VadDecision::Silence,
        ]);
        let mut seg = UtteranceSegmenter::with_classifier(script, 0);

        let mut events = Vec::new();
        for fill in [1u8, 2, 3, 4] {
            events.extend(seg.push_chunk(&window_chunk(fill)));
        }

        let starts = events
            .iter()
            .filter(|e| matches!(e, SegmenterEvent::SpeechStarted { .. }))
            .count();
        let ends = events
            .iter()
            .filter(|e| matches!(e, SegmenterEvent::SpeechEnded { .. }))
            .count();
        assert_eq!(starts, 1);
        assert_eq!(ends, 1);
        assert!(!seg.is_speaking());

        // The chunk carrying the first speech window is cleared by the reset;
        // the utterance holds everything pushed after it, closing chunk
        // included.
        let ready = ready_audio(&events);
        assert_eq!(ready.len(), 1);
        let expected: Vec<u8> = [window_chunk(3), window_chunk(4)].concat();
        assert_eq!(ready[0], expected);
    }

    #[test]
    fn start_transition_discards_prior_audio() {
        let script = ScriptedClassifier::new([
            VadDecision::Silence,
            VadDecision::Silence,
            VadDecision::Speech,
            VadDecision::Speech,
            VadDecision::Silence,
        ]);
        let mut seg = UtteranceSegmenter::with_classifier(script, 0);

        let mut events = Vec::new();
        for fill in [9u8, 9, 9, 5, 6] {
            events.extend(seg.push_chunk(&window_chunk(fill)));
        }

        let ready = ready_audio(&events);
        assert_eq!(ready.len(), 1);
        assert!(!ready[0].contains(&9u8));
        let expected: Vec<u8> = [window_chunk(5), window_chunk(6)].concat();
        assert_eq!(ready[0], expected);
    }

    #[test]
    fn inconclusive_windows_keep_the_utterance_open() {
        let script = ScriptedClassifier::new([
            VadDecision::Speech,
            VadDecision::Inconclusive,
            VadDecision::Inconclusive,
            VadDecision::Silence,
        ]);
        let mut seg = UtteranceSegmenter::with_classifier(script, 0);

        let mut events = Vec::new();
        events.extend(seg.push_chunk(&window_chunk(1)));
        assert!(seg.is_speaking());
        events.extend(seg.push_chunk(&window_chunk(2)));
        events.extend(seg.push_chunk(&window_chunk(3)));
        assert!(seg.is_speaking());
        events.extend(seg.push_chunk(&window_chunk(4)));
        assert!(!seg.is_speaking());

        // Bytes under inconclusive windows still made it into the utterance.
        let ready = ready_audio(&events);
        let expected: Vec<u8> =
            [window_chunk(2), window_chunk(3), window_chunk(4)].concat();
        assert_eq!(ready[0], expected);
    }

    #[test]
    fn inconclusive_while_idle_never_starts_speech() {
        let script = ScriptedClassifier::new([
            VadDecision::Inconclusive,
            VadDecision::Inconclusive,
        ]);
        let mut seg = UtteranceSegmenter::with_classifier(script, 0);
        let events: Vec<_> = seg
            .push_chunk(&window_chunk(1))
            .into_iter()
            .chain(seg.push_chunk(&window_chunk(2)))
            .collect();
        assert!(events.is_empty());
        assert!(!seg.is_speaking());
    }

    #[test]
    fn short_utterance_ends_without_becoming_ready() {
        let script = ScriptedClassifier::new([
            VadDecision::Speech,
            VadDecision::Silence,
        ]);
        let mut seg = UtteranceSegmenter::with_classifier(script, 10_000);
        let mut events = Vec::new();
        events.extend(seg.push_chunk(&window_chunk(1)));
        events.extend(seg.push_chunk(&window_chunk(2)));

        assert!(events
            .iter()
            .any(|e| matches!(e, SegmenterEvent::SpeechEnded { len: 960, .. })));
        assert!(ready_audio(&events).is_empty());
    }

    #[test]
    fn duration_follows_byte_length() {
        // 96000 bytes/sec at the fixed convention
        assert_eq!(duration_of(96_000), Duration::from_secs(1));
        assert_eq!(duration_of(48_000), Duration::from_millis(500));
    }
}
