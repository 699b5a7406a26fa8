use std::process::Output;
use std::time::Duration;
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use tokio::process::Command;

use crate::errors::SynthesisError;
use crate::providers::{SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};
use crate::voices::{format_pitch, format_rate};

/// Synthesizer that drives the `edge-tts` command-line tool
#[derive(Debug, Clone)]
pub struct EdgeTts {
    /// Executable name or path
    command: String,
    /// Per-call time limit
    timeout: Duration,
}

impl EdgeTts {
    /// Create a new Edge TTS client
    pub fn new(command: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            command: command.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Build the argument list for one request writing to `media_path`
    pub fn build_args(request: &SynthesisRequest, media_path: &str) -> Vec<String> {
        // Values starting with '-' must be glued to their flag
        vec![
            "--voice".to_string(),
            request.voice.short_name().to_string(),
            format!("--rate={}", format_rate(request.rate_percent)),
            format!("--pitch={}", format_pitch(request.pitch_shift_hz)),
            format!("--text={}", request.text),
            "--write-media".to_string(),
            media_path.to_string(),
        ]
    }

    async fn run(&self, args: &[String]) -> Result<Output, SynthesisError> {
        debug!("Running {} {}", self.command, args.join(" "));

        let future = Command::new(&self.command)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = future => {
                result.map_err(|e| SynthesisError::RequestFailed(
                    format!("Failed to execute {}: {}", self.command, e)
                ))?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(SynthesisError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = Self::filter_stderr(&String::from_utf8_lossy(&output.stderr));
            error!("{} failed: {}", self.command, stderr);
            return Err(SynthesisError::ToolFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output)
    }

    /// Keep only the last few meaningful stderr lines; Python tracebacks are long.
    fn filter_stderr(stderr: &str) -> String {
        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("File \"") && !line.starts_with("Traceback"))
            .collect();

        if meaningful.is_empty() {
            "no error output".to_string()
        } else {
            meaningful[meaningful.len().saturating_sub(3)..].join("\n")
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTts {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio, SynthesisError> {
        let media = tempfile::Builder::new()
            .prefix("narrasrt-part-")
            .suffix(".mp3")
            .tempfile()
            .map_err(|e| SynthesisError::RequestFailed(format!("Failed to create temp file: {}", e)))?;
        let media_path = media.path().to_string_lossy().to_string();

        self.run(&Self::build_args(request, &media_path)).await?;

        let data = tokio::fs::read(media.path())
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read {}: {}", media_path, e)))?;

        if data.is_empty() {
            return Err(SynthesisError::InvalidResponse(
                "edge-tts produced no audio".to_string(),
            ));
        }

        Ok(SynthesizedAudio {
            data: Bytes::from(data),
            duration_secs: None,
        })
    }

    async fn test_connection(&self) -> Result<(), SynthesisError> {
        self.run(&["--list-voices".to_string()]).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "edge-tts"
    }
}
