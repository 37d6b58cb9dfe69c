//! Minimal WAV container support for the speech-service boundary.
//!
//! The transcription service wants a canonical 44-byte header in front of the
//! PCM it receives; the synthesis service hands a container back. Outbound
//! room audio is headerless PCM, so replies are unwrapped before publishing.

use crate::error::{AgentError, AgentResult};

const HEADER_LEN: usize = 44;

/// Wrap raw 16-bit mono PCM in a canonical 44-byte WAV container.
pub fn encode(pcm: &[u8], sample_rate: u32) -> Vec<u8> {
    let data_len = pcm.len() as u32;
    let byte_rate = sample_rate * 2;

    let mut buf = Vec::with_capacity(HEADER_LEN + pcm.len());
    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(HEADER_LEN as u32 + data_len - 8).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    // fmt subchunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // subchunk1 size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&1u16.to_le_bytes()); // mono
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes()); // block align
    buf.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    // data subchunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    buf.extend_from_slice(pcm);
    buf
}

/// Extract the raw PCM payload from a WAV container.
///
/// Tolerates extra chunks (LIST, fact) between `fmt ` and `data`, which some
/// synthesis services emit.
pub fn pcm_payload(wav: &[u8]) -> AgentResult<&[u8]> {
    if wav.len() < 12 || &wav[0..4] != b"RIFF" || &wav[8..12] != b"WAVE" {
        return Err(AgentError::Audio("not a RIFF/WAVE container".to_string()));
    }
    let mut off = 12;
    while off + 8 <= wav.len() {
        let id = &wav[off..off + 4];
        let size = u32::from_le_bytes([wav[off + 4], wav[off + 5], wav[off + 6], wav[off + 7]])
            as usize;
        let body = off + 8;
        if id == b"data" {
            let end = body
                .checked_add(size)
                .filter(|&end| end <= wav.len())
                .ok_or_else(|| {
                    AgentError::Audio("data chunk overruns container".to_string())
                })?;
            return Ok(&wav[body..end]);
        }
        // Chunks are word-aligned; odd sizes carry a pad byte.
        off = body + size + (size & 1);
    }
    Err(AgentError::Audio("no data chunk in container".to_string()))
}
