/*!
 * Audio handling for synthesized segments.
 *
 * - `FfmpegAudio` decodes, trims, measures, joins and encodes with the
 *   ffmpeg/ffprobe command-line tools.
 * - `PassthroughAudio` joins encoded bytes as they are, for backends whose
 *   output can be concatenated directly and for tests.
 */

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use log::{debug, error, warn};
use tempfile::TempDir;
use tokio::process::Command;

use crate::errors::AudioError;

/// Audio of one segment, ready to be joined
#[derive(Debug, Clone, Default)]
pub struct AudioClip {
    /// Encoded audio
    pub data: Bytes,
    /// Duration in seconds, when it has been measured
    pub duration_secs: Option<f64>,
}

impl AudioClip {
    pub fn unmeasured(data: Bytes) -> Self {
        Self {
            data,
            duration_secs: None,
        }
    }
}

/// The audio collaborator used by the narration pipeline
#[async_trait]
pub trait AudioProcessor: Send + Sync + std::fmt::Debug {
    /// Load one segment's synthesized audio, trim trailing silence and
    /// measure what is left
    async fn prepare(&self, data: Bytes) -> Result<AudioClip, AudioError>;

    /// Join clips with `gap_ms` of silence after each one, raise the volume
    /// by `gain_db` when positive, and encode the result
    async fn export(&self, clips: &[AudioClip], gap_ms: u64, gain_db: f64) -> Result<Bytes, AudioError>;
}

// @struct: ffmpeg-backed audio processing
#[derive(Debug, Clone)]
pub struct FfmpegAudio {
    ffmpeg: String,
    ffprobe: String,
    /// Level in dBFS under which trailing audio counts as silence
    silence_threshold_db: f64,
    trim_trailing_silence: bool,
    /// Container passed to `ffmpeg -f`
    output_format: String,
    /// Sample rate every clip is normalised to before joining
    sample_rate: u32,
    timeout: Duration,
}

impl Default for FfmpegAudio {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            silence_threshold_db: -40.0,
            trim_trailing_silence: true,
            output_format: "mp3".to_string(),
            sample_rate: 24_000,
            timeout: Duration::from_secs(120),
        }
    }
}

impl FfmpegAudio {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            ..Self::default()
        }
    }

    pub fn with_silence_threshold(mut self, threshold_db: f64, enabled: bool) -> Self {
        self.silence_threshold_db = threshold_db;
        self.trim_trailing_silence = enabled;
        self
    }

    pub fn with_output_format(mut self, format: impl Into<String>, sample_rate: u32) -> Self {
        self.output_format = format.into();
        self.sample_rate = sample_rate;
        self
    }

    /// Filter that drops trailing audio quieter than the threshold, scanned
    /// in 10 ms windows from the end
    pub fn trim_filter(&self) -> String {
        format!(
            "areverse,silenceremove=start_periods=1:start_threshold={}dB:detection=rms:window=0.01,areverse",
            self.silence_threshold_db
        )
    }

    /// `filter_complex` graph joining `clip_count` inputs
    pub fn concat_filter(&self, clip_count: usize, gap_ms: u64, gain_db: f64) -> String {
        let mut graph = String::new();
        let mut labels = String::new();

        for i in 0..clip_count {
            graph.push_str(&format!(
                "[{i}:a]aformat=sample_fmts=fltp:sample_rates={}:channel_layouts=mono",
                self.sample_rate
            ));
            if gap_ms > 0 {
                graph.push_str(&format!(",apad=pad_dur={:.3}", gap_ms as f64 / 1000.0));
            }
            graph.push_str(&format!("[a{i}];"));
            labels.push_str(&format!("[a{i}]"));
        }

        graph.push_str(&format!("{}concat=n={}:v=0:a=1", labels, clip_count));
        if gain_db > 0.0 {
            graph.push_str(&format!(",volume={}dB", gain_db));
        }
        graph.push_str("[out]");
        graph
    }

    async fn run_tool(&self, program: &str, args: &[String]) -> Result<Output, AudioError> {
        debug!("Running {} {}", program, args.join(" "));

        let future = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = future => {
                result.map_err(|e| AudioError::ToolFailed {
                    tool: program.to_string(),
                    message: format!("failed to execute: {}", e),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(AudioError::ToolFailed {
                    tool: program.to_string(),
                    message: format!("timed out after {} seconds", self.timeout.as_secs()),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("no error output");
            error!("{} failed: {}", program, last_line);
            return Err(AudioError::ToolFailed {
                tool: program.to_string(),
                message: last_line.trim().to_string(),
            });
        }

        Ok(output)
    }

    /// Duration of an audio file in seconds, read with ffprobe
    pub async fn probe_duration(&self, path: &Path) -> Result<f64, AudioError> {
        let args = vec![
            "-v".to_string(), "error".to_string(),
            "-show_entries".to_string(), "format=duration".to_string(),
            "-of".to_string(), "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ];
        let output = self.run_tool(&self.ffprobe, &args).await?;
        Self::parse_duration(&String::from_utf8_lossy(&output.stdout))
    }

    pub fn parse_duration(stdout: &str) -> Result<f64, AudioError> {
        let trimmed = stdout.trim();
        match trimmed.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs),
            _ => Err(AudioError::InvalidDuration(trimmed.to_string())),
        }
    }

    /// Trim trailing silence into an uncompressed copy. `None` when nothing
    /// audible is left.
    async fn trim_clip(&self, dir: &TempDir, input: &Path) -> Result<Option<AudioClip>, AudioError> {
        let trimmed = dir.path().join("segment.wav");
        let args = vec![
            "-y".to_string(),
            "-i".to_string(), input.to_string_lossy().to_string(),
            "-af".to_string(), self.trim_filter(),
            trimmed.to_string_lossy().to_string(),
        ];
        self.run_tool(&self.ffmpeg, &args).await?;

        let trimmed_data = tokio::fs::read(&trimmed).await?;
        if trimmed_data.is_empty() {
            return Ok(None);
        }

        let duration = self.probe_duration(&trimmed).await?;
        if duration <= 0.0 {
            return Ok(None);
        }

        Ok(Some(AudioClip {
            data: Bytes::from(trimmed_data),
            duration_secs: Some(duration),
        }))
    }

    fn write_clip(dir: &TempDir, name: &str, data: &[u8]) -> Result<PathBuf, AudioError> {
        let path = dir.path().join(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

#[async_trait]
impl AudioProcessor for FfmpegAudio {
    async fn prepare(&self, data: Bytes) -> Result<AudioClip, AudioError> {
        let dir = tempfile::tempdir()?;
        let input = Self::write_clip(&dir, "segment.mp3", &data)?;

        if self.trim_trailing_silence {
            match self.trim_clip(&dir, &input).await {
                Ok(Some(clip)) => return Ok(clip),
                Ok(None) => debug!("Clip is silent throughout, keeping it untrimmed"),
                Err(e) => warn!("Silence trim failed, keeping the untrimmed clip: {}", e),
            }
        }

        let duration = self.probe_duration(&input).await?;
        Ok(AudioClip { data, duration_secs: Some(duration) })
    }

    async fn export(&self, clips: &[AudioClip], gap_ms: u64, gain_db: f64) -> Result<Bytes, AudioError> {
        if clips.is_empty() {
            return Ok(Bytes::new());
        }

        let dir = tempfile::tempdir()?;
        let mut args = vec!["-y".to_string()];
        for (i, clip) in clips.iter().enumerate() {
            let path = Self::write_clip(&dir, &format!("clip_{:04}", i), &clip.data)?;
            args.push("-i".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        let output = dir.path().join(format!("narration.{}", self.output_format));
        args.extend([
            "-filter_complex".to_string(), self.concat_filter(clips.len(), gap_ms, gain_db),
            "-map".to_string(), "[out]".to_string(),
            "-f".to_string(), self.output_format.clone(),
            output.to_string_lossy().to_string(),
        ]);
        self.run_tool(&self.ffmpeg, &args).await?;

        Ok(Bytes::from(tokio::fs::read(&output).await?))
    }
}

/// Joins encoded bytes without decoding. Gaps and gain cannot be applied and
/// are ignored. Durations are only known when a byte rate is configured.
#[derive(Debug, Clone, Default)]
pub struct PassthroughAudio {
    bytes_per_sec: Option<f64>,
}

impl PassthroughAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive durations from the byte length, for constant bitrate streams
    pub fn with_byte_rate(bytes_per_sec: f64) -> Self {
        Self {
            bytes_per_sec: Some(bytes_per_sec),
        }
    }
}

#[async_trait]
impl AudioProcessor for PassthroughAudio {
    async fn prepare(&self, data: Bytes) -> Result<AudioClip, AudioError> {
        let duration_secs = self.bytes_per_sec
            .filter(|rate| *rate > 0.0)
            .map(|rate| data.len() as f64 / rate);
        Ok(AudioClip { data, duration_secs })
    }

    async fn export(&self, clips: &[AudioClip], gap_ms: u64, gain_db: f64) -> Result<Bytes, AudioError> {
        if gap_ms > 0 || gain_db > 0.0 {
            debug!("Passthrough audio ignores gap ({} ms) and gain ({} dB)", gap_ms, gain_db);
        }

        let mut joined = BytesMut::with_capacity(clips.iter().map(|c| c.data.len()).sum());
        for clip in clips {
            joined.extend_from_slice(&clip.data);
        }
        Ok(joined.freeze())
    }
}
