use std::time::Duration;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::SynthesisError;
use crate::providers::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};

/// Client for a remote narration endpoint.
///
/// The endpoint takes the raw user pitch offset and inverts it itself, so the
/// already inverted shift is flipped back before sending.
#[derive(Debug, Clone)]
pub struct RemoteSynthesizer {
    /// HTTP client for API requests
    client: Client,
    /// Full URL the requests are posted to
    endpoint: String,
    /// Request timeout, reported on expiry
    timeout_secs: u64,
}

/// Narration request body
#[derive(Debug, Serialize)]
pub struct RemoteRequest {
    /// Text to speak
    pub text: String,
    /// Rules are applied locally, so always empty
    pub rules: String,
    /// Voice short name
    pub voice: String,
    /// Rate offset in percent, as a string
    pub speed: String,
    /// User pitch offset, as a string
    pub pitch: String,
}

/// Narration response body
#[derive(Debug, Deserialize)]
pub struct RemoteResponse {
    /// Base64 encoded audio
    #[serde(default)]
    pub audio: Option<String>,
    /// Subtitles produced remotely; unused here
    #[serde(default)]
    pub srt: Option<String>,
    /// Error message on failure
    #[serde(default)]
    pub error: Option<String>,
}

impl RemoteRequest {
    pub fn from_synthesis(request: &SynthesisRequest) -> Self {
        Self {
            text: request.text.clone(),
            rules: String::new(),
            voice: request.voice.short_name().to_string(),
            speed: request.rate_percent.to_string(),
            pitch: (-request.pitch_shift_hz).to_string(),
        }
    }
}

impl RemoteSynthesizer {
    /// Create a new remote client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
            timeout_secs,
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            SynthesisError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            SynthesisError::ConnectionError(format!("{}: {}", self.endpoint, e))
        } else {
            SynthesisError::RequestFailed(e.to_string())
        }
    }

    /// Decode the audio field of a response
    pub fn decode_audio(response: RemoteResponse) -> Result<Bytes, SynthesisError> {
        if let Some(message) = response.error {
            return Err(SynthesisError::InvalidResponse(message));
        }

        let encoded = response.audio
            .ok_or_else(|| SynthesisError::InvalidResponse("response has no audio field".to_string()))?;
        let data = STANDARD.decode(encoded.trim())
            .map_err(|e| SynthesisError::InvalidResponse(format!("audio is not valid base64: {}", e)))?;

        if data.is_empty() {
            return Err(SynthesisError::InvalidResponse("response audio is empty".to_string()));
        }

        Ok(Bytes::from(data))
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        let body = RemoteRequest::from_synthesis(request);
        debug!("POST {} ({} chars, voice {})", self.endpoint, body.text.chars().count(), body.voice);

        let response = self.client.post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Narration endpoint error ({}): {}", status, error_text);
            return Err(SynthesisError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let parsed = response.json::<RemoteResponse>().await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(SynthesizedAudio {
            data: Self::decode_audio(parsed)?,
            duration_secs: None,
        })
    }

    async fn test_connection(&self) -> Result<(), SynthesisError> {
        // The endpoint only answers POST; any HTTP answer means it is reachable
        self.client.get(&self.endpoint)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}
