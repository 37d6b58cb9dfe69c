//! The agent loop: room events in, spoken replies out.
//!
//! One listener per subscribed track owns that stream's segmenter and feeds
//! it in strict arrival order. Completed utterances cross to the responder,
//! which handles each turn in a detached task so a slow transcription never
//! stalls ingestion of the next utterance. A failed turn is logged and
//! dropped; the pipeline keeps listening.

use crate::config::PipelineConfig;
use crate::error::AgentResult;
use crate::room::RoomEvent;
use crate::segmenter::{SegmenterEvent, Utterance, UtteranceSegmenter};
use crate::stt::Transcriber;
use crate::tts::Synthesizer;
use crate::wav;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const UTTERANCE_CHANNEL_CAPACITY: usize = 16;

/// Drain room events and answer every utterance heard on every subscribed
/// track. Returns when the event channel closes and all pending utterances
/// have been handed to the responder.
pub async fn run_agent(
    pipeline: PipelineConfig,
    mut events: mpsc::Receiver<RoomEvent>,
    outbound: mpsc::Sender<Vec<u8>>,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
) -> AgentResult<()> {
    let (utterance_tx, mut utterance_rx) =
        mpsc::channel::<(String, Utterance)>(UTTERANCE_CHANNEL_CAPACITY);

    let responder = tokio::spawn(async move {
        while let Some((participant, utterance)) = utterance_rx.recv().await {
            tokio::spawn(respond_turn(
                participant,
                utterance,
                Arc::clone(&transcriber),
                Arc::clone(&synthesizer),
                outbound.clone(),
            ));
        }
    });

    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::ParticipantJoined { identity } => {
                info!(%identity, "participant joined");
            }
            RoomEvent::ParticipantLeft { identity } => {
                info!(%identity, "participant left");
            }
            RoomEvent::TrackAvailable { participant, audio } => {
                info!(%participant, "subscribed to audio track");
                spawn_listener(
                    participant,
                    audio,
                    pipeline.clone(),
                    utterance_tx.clone(),
                );
            }
        }
    }

    drop(utterance_tx);
    let _ = responder.await;
    Ok(())
}

/// Run one track's segmentation loop.
///
/// The VAD detector is not `Send`, so the segmenter lives on a blocking
/// thread and owns its state for the lifetime of the track.
fn spawn_listener(
    participant: String,
    mut audio: mpsc::Receiver<Vec<u8>>,
    pipeline: PipelineConfig,
    utterance_tx: mpsc::Sender<(String, Utterance)>,
) {
    tokio::task::spawn_blocking(move || {
        let mut segmenter = match UtteranceSegmenter::new(&pipeline) {
            Ok(s) => s,
            Err(e) => {
                warn!(%participant, error = %e, "skipping track, VAD init failed");
                return;
            }
        };
        while let Some(chunk) = audio.blocking_recv() {
            for event in segmenter.push_chunk(&chunk) {
                if let SegmenterEvent::UtteranceReady(utterance) = event {
                    if utterance_tx
                        .blocking_send((participant.clone(), utterance))
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }
        debug!(%participant, "audio track closed");
    });
}

/// Handle one finalized utterance: transcribe, build the reply, synthesize,
/// and queue the reply's PCM for publishing. Every failure ends the turn.
pub async fn respond_turn(
    participant: String,
    utterance: Utterance,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
    outbound: mpsc::Sender<Vec<u8>>,
) {
    let transcript = match transcriber.transcribe(&utterance).await {
        Ok(t) => t,
        Err(e) => {
            warn!(%participant, error = %e, "transcription failed, dropping turn");
            return;
        }
    };
    if transcript.trim().is_empty() {
        debug!(%participant, "empty transcript, nothing to answer");
        return;
    }
    info!(%participant, transcript = %transcript, "transcribed utterance");

    let reply = format!("You said: {transcript}");
    let wav_bytes = match synthesizer.synthesize(&reply).await {
        Ok(b) => b,
        Err(e) => {
            warn!(%participant, error = %e, "synthesis failed, dropping turn");
            return;
        }
    };
    if wav_bytes.is_empty() {
        return;
    }
    let pcm = match wav::pcm_payload(&wav_bytes) {
        Ok(p) => p.to_vec(),
        Err(e) => {
            warn!(%participant, error = %e, "synthesis returned malformed audio");
            return;
        }
    };
    if outbound.send(pcm).await.is_err() {
        debug!("outbound sink closed");
    }
}
