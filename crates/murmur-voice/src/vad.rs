//! Per-window speech classification over WebRTC VAD.
//!
//! One decision per 10ms analysis window, no cross-window smoothing. A window
//! the detector cannot judge (wrong length, detector error) is reported as
//! `Inconclusive` so the segmenter can skip it without treating it as either
//! speech or silence.

use crate::error::{AgentError, AgentResult};
use crate::frame::WINDOW_BYTES;
use std::collections::VecDeque;
use tracing::debug;
use webrtc_vad::{SampleRate, Vad, VadMode};

/// Classification of one analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadDecision {
    Speech,
    Silence,
    /// The window could not be judged; it must not drive a transition.
    Inconclusive,
}

/// Seam between the segmenter and whatever produces speech flags.
pub trait WindowClassifier {
    fn classify(&mut self, window: &[u8]) -> VadDecision;
}

/// WebRTC VAD at 48kHz over exact `WINDOW_BYTES` windows.
pub struct VadClassifier {
    vad: Vad,
}

impl VadClassifier {
    /// Create a classifier with the given aggressiveness mode (0-3, where 3
    /// is most aggressive).
    pub fn new(mode: u8) -> AgentResult<Self> {
        let vad_mode = match mode {
            0 => VadMode::Quality,
            1 => VadMode::LowBitrate,
            2 => VadMode::Aggressive,
            3 => VadMode::VeryAggressive,
            _ => {
                return Err(AgentError::Config(format!(
                    "VAD mode must be 0-3, got {mode}"
                )))
            }
        };
        Ok(Self {
            vad: Vad::new_with_rate_and_mode(SampleRate::Rate48kHz, vad_mode),
        })
    }
}

impl WindowClassifier for VadClassifier {
    fn classify(&mut self, window: &[u8]) -> VadDecision {
        if window.len() != WINDOW_BYTES {
            debug!(
                len = window.len(),
                expected = WINDOW_BYTES,
                "window length mismatch, skipping"
            );
            return VadDecision::Inconclusive;
        }
        let samples: Vec<i16> = window
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        match self.vad.is_voice_segment(&samples) {
            Ok(true) => VadDecision::Speech,
            Ok(false) => VadDecision::Silence,
            Err(_) => {
                debug!("detector rejected window, skipping");
                VadDecision::Inconclusive
            }
        }
    }
}

/// Deterministic classifier for tests and dry runs: replays a scripted
/// decision per window, then answers `Inconclusive` once the script is spent.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    script: VecDeque<VadDecision>,
}

impl ScriptedClassifier {
    pub fn new(script: impl IntoIterator<Item = VadDecision>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl WindowClassifier for ScriptedClassifier {
    fn classify(&mut self, _window: &[u8]) -> VadDecision {
        self.script.pop_front().unwrap_or(VadDecision::Inconclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_mode() {
        assert!(VadClassifier::new(4).is_err());
        assert!(VadClassifier::new(0).is_ok());
    }

    #[test]
    fn silent_window_is_not_speech() {
        let mut classifier = VadClassifier::new(2).unwrap();
        let silence = vec![0u8; WINDOW_BYTES];
        assert_eq!(classifier.classify(&silence), VadDecision::Silence);
    }

    #[test]
    fn wrong_length_is_inconclusive() {
        let mut classifier = VadClassifier::new(2).unwrap();
        assert_eq!(
            classifier.classify(&[0u8; 100]),
            VadDecision::Inconclusive
        );
        assert_eq!(
            classifier.classify(&vec![0u8; WINDOW_BYTES + 2]),
            VadDecision::Inconclusive
        );
    }

    #[test]
    fn scripted_classifier_replays_then_goes_inconclusive() {
        let mut scripted =
            ScriptedClassifier::new([VadDecision::Speech, VadDecision::Silence]);
        assert_eq!(scripted.classify(&[]), VadDecision::Speech);
        assert_eq!(scripted.classify(&[]), VadDecision::Silence);
        assert_eq!(scripted.classify(&[]), VadDecision::Inconclusive);
    }
}
