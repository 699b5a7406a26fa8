/*!
 * Speech synthesis backends.
 *
 * This module contains client implementations for the synthesis capability:
 * - Edge TTS: the `edge-tts` command-line tool run as a subprocess
 * - Remote: a narration HTTP endpoint returning base64 audio
 * - Mock: deterministic in-process synthesizer for tests
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::SynthesisError;
use crate::voices::VoiceId;

/// One synthesis call: a single speakable segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Text to speak, already rewritten and free of newlines
    pub text: String,
    /// Voice to speak with
    pub voice: VoiceId,
    /// Speaking rate offset in percent
    pub rate_percent: i32,
    /// Pitch shift in Hz as the backend expects it
    pub pitch_shift_hz: i32,
}

/// Encoded audio returned by a backend
#[derive(Debug, Clone, Default)]
pub struct SynthesizedAudio {
    /// Compressed audio bytes (MP3 for the bundled backends)
    pub data: Bytes,
    /// Duration in seconds when the backend knows it
    pub duration_secs: Option<f64>,
}

/// Common trait for all synthesis backends
///
/// Implementations are used interchangeably by the narration pipeline, one
/// call per segment, awaited in order.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + Debug {
    /// Synthesize one segment
    ///
    /// # Arguments
    /// * `request` - The segment text and voice settings
    ///
    /// # Returns
    /// * `Result<SynthesizedAudio, SynthesisError>` - Encoded audio or an error
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError>;

    /// Check that the backend is reachable
    async fn test_connection(&self) -> Result<(), SynthesisError>;

    /// Short backend name for logs
    fn name(&self) -> &str;
}

pub mod edge_tts;
pub mod remote;
pub mod mock;
