/*!
 * Mock synthesizer for testing.
 *
 * This module provides a mock backend that simulates different behaviors:
 * - `MockSynthesizer::working()` - Always succeeds
 * - `MockSynthesizer::intermittent(n)` - Fails every nth request
 * - `MockSynthesizer::failing()` - Always fails with an error
 * - `MockSynthesizer::failing_on(..)` - Fails on the listed request numbers
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::SynthesisError;
use crate::providers::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};

/// Behavior mode for the mock synthesizer
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails on the given zero-based request numbers
    FailOn(Vec<usize>),
    /// Always fails with an error
    Failing,
    /// Returns no audio bytes
    Empty,
    /// Simulates slow synthesis
    Slow { delay_ms: u64 },
}

/// Mock synthesizer. Audio bytes are `AUDIO[<text>]`; clones share the
/// request counter and request log.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for scripted failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<SynthesisRequest>>>,
    /// Seconds per character reported as the audio duration
    secs_per_char: Option<f64>,
}

impl MockSynthesizer {
    /// Create a new mock synthesizer with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            secs_per_char: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Fail every `fail_every`th request. Zero never fails.
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    pub fn failing_on(requests: &[usize]) -> Self {
        Self::new(MockBehavior::FailOn(requests.to_vec()))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Report a duration of `secs_per_char` times the text length
    pub fn with_reported_duration(mut self, secs_per_char: f64) -> Self {
        self.secs_per_char = Some(secs_per_char);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn audio_for(&self, request: &SynthesisRequest) -> SynthesizedAudio {
        SynthesizedAudio {
            data: Bytes::from(format!("AUDIO[{}]", request.text)),
            duration_secs: self.secs_per_char
                .map(|rate| rate * request.text.chars().count() as f64),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(self.audio_for(request)),

            MockBehavior::Intermittent { fail_every } => {
                if (count + 1).checked_rem(*fail_every) == Some(0) {
                    Err(SynthesisError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.audio_for(request))
                }
            }

            MockBehavior::FailOn(failing) => {
                if failing.contains(&count) {
                    Err(SynthesisError::RequestFailed(format!("Simulated failure on request {}", count)))
                } else {
                    Ok(self.audio_for(request))
                }
            }

            MockBehavior::Failing => Err(SynthesisError::ApiError {
                message: "Simulated synthesis failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(SynthesizedAudio::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(self.audio_for(request))
            }
        }
    }

    async fn test_connection(&self) -> Result<(), SynthesisError> {
        match self.behavior {
            MockBehavior::Failing => Err(SynthesisError::ConnectionError("mock offline".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
