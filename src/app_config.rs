use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::pipeline::NarrationRequest;
use crate::pronunciation::DEFAULT_RULES;
use crate::segmenter::CaptionPlatform;
use crate::timing::{
    DurationEstimator, DurationMode, DEFAULT_GAP_MS, DEFAULT_MIN_CHUNK_SECS, DEFAULT_SECS_PER_CHAR,
};
use crate::voices::VoiceId;

/// Narration settings read from `conf.json`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Narration voice
    #[serde(default)]
    pub voice: VoiceId,

    /// Speaking rate offset in percent (-50 to 50)
    #[serde(default = "default_speed_percent")]
    pub speed_percent: i32,

    /// Pitch offset in Hz as shown to the user (-50 to 50)
    #[serde(default = "default_pitch_offset_hz")]
    pub pitch_offset_hz: i32,

    /// Gain applied to the finished audio in dB (0 to 20)
    #[serde(default = "default_volume_boost_db")]
    pub volume_boost_db: f64,

    /// Caption width profile
    #[serde(default)]
    pub platform: CaptionPlatform,

    /// Pronunciation rules, one `pattern = replacement` per line
    #[serde(default = "default_rules")]
    pub rules: String,

    /// File whose content replaces `rules` when set
    #[serde(default)]
    pub rules_file: Option<PathBuf>,

    /// Caption timing
    #[serde(default)]
    pub timing: TimingConfig,

    /// Speech synthesis backend
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Audio tools
    #[serde(default)]
    pub audio: AudioConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Caption timing configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TimingConfig {
    // @field: Measured or estimated segment durations
    #[serde(default)]
    pub mode: DurationMode,

    // @field: Seconds per character for estimated durations
    #[serde(default = "default_secs_per_char")]
    pub estimated_secs_per_char: f64,

    // @field: Silence after each segment in measured mode
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,

    // @field: Floor for chunks of multi-chunk segments
    #[serde(default = "default_min_chunk_secs")]
    pub min_chunk_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            mode: DurationMode::default(),
            estimated_secs_per_char: default_secs_per_char(),
            gap_ms: default_gap_ms(),
            min_chunk_secs: default_min_chunk_secs(),
        }
    }
}

/// Synthesis backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisBackend {
    // @backend: Local edge-tts command
    #[default]
    #[serde(rename = "edge-tts", alias = "edgetts")]
    EdgeTts,
    // @backend: Remote narration endpoint
    Remote,
}

impl SynthesisBackend {
    // @returns: Human readable backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::EdgeTts => "edge-tts",
            Self::Remote => "Remote API",
        }
    }
}

/// Synthesis backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SynthesisConfig {
    // @field: Backend in use
    #[serde(default)]
    pub backend: SynthesisBackend,

    // @field: edge-tts executable
    #[serde(default = "default_edge_tts_command")]
    pub command: String,

    // @field: Remote endpoint URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds per segment
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            backend: SynthesisBackend::default(),
            command: default_edge_tts_command(),
            endpoint: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Audio tool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AudioConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe executable
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Level in dBFS under which trailing audio is trimmed
    #[serde(default = "default_silence_threshold_db")]
    pub silence_threshold_db: f64,

    /// Container of the exported narration
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Whether trailing silence is trimmed from every segment
    #[serde(default = "default_true")]
    pub trim_trailing_silence: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            silence_threshold_db: default_silence_threshold_db(),
            output_format: default_output_format(),
            trim_trailing_silence: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

const PROSODY_RANGE: std::ops::RangeInclusive<i32> = -50..=50;
const VOLUME_RANGE: std::ops::RangeInclusive<f64> = 0.0..=20.0;

fn default_speed_percent() -> i32 {
    25
}

fn default_pitch_offset_hz() -> i32 {
    7
}

fn default_volume_boost_db() -> f64 {
    10.0
}

fn default_rules() -> String {
    DEFAULT_RULES.to_string()
}

fn default_secs_per_char() -> f64 {
    DEFAULT_SECS_PER_CHAR
}

fn default_gap_ms() -> u64 {
    DEFAULT_GAP_MS
}

fn default_min_chunk_secs() -> f64 {
    DEFAULT_MIN_CHUNK_SECS
}

fn default_edge_tts_command() -> String {
    "edge-tts".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_silence_threshold_db() -> f64 {
    -40.0
}

fn default_output_format() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration from `path`, writing the defaults there first
    /// when the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !PROSODY_RANGE.contains(&self.speed_percent) {
            return Err(anyhow!("speed_percent must be between -50 and 50, got {}", self.speed_percent));
        }

        if !PROSODY_RANGE.contains(&self.pitch_offset_hz) {
            return Err(anyhow!("pitch_offset_hz must be between -50 and 50, got {}", self.pitch_offset_hz));
        }

        if !VOLUME_RANGE.contains(&self.volume_boost_db) {
            return Err(anyhow!("volume_boost_db must be between 0 and 20, got {}", self.volume_boost_db));
        }

        if !(self.timing.estimated_secs_per_char.is_finite() && self.timing.estimated_secs_per_char > 0.0) {
            return Err(anyhow!("timing.estimated_secs_per_char must be a positive number"));
        }

        if !(self.timing.min_chunk_secs.is_finite() && self.timing.min_chunk_secs >= 0.0) {
            return Err(anyhow!("timing.min_chunk_secs must not be negative"));
        }

        if self.synthesis.timeout_secs == 0 {
            return Err(anyhow!("synthesis.timeout_secs must be greater than zero"));
        }

        match self.synthesis.backend {
            SynthesisBackend::EdgeTts => {
                if self.synthesis.command.trim().is_empty() {
                    return Err(anyhow!("synthesis.command is required for the edge-tts backend"));
                }
            }
            SynthesisBackend::Remote => {
                url::Url::parse(&self.synthesis.endpoint)
                    .with_context(|| format!("Invalid synthesis endpoint: '{}'", self.synthesis.endpoint))?;
            }
        }

        if self.audio.output_format.trim().is_empty() {
            return Err(anyhow!("audio.output_format must not be empty"));
        }

        Ok(())
    }

    /// Rules in effect: the rules file content when one is configured
    pub fn effective_rules(&self) -> Result<String> {
        match &self.rules_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read rules file: {}", path.display())),
            None => Ok(self.rules.clone()),
        }
    }

    /// Duration estimator configured from the timing section
    pub fn estimator(&self) -> DurationEstimator {
        DurationEstimator {
            mode: self.timing.mode,
            secs_per_char: self.timing.estimated_secs_per_char,
            min_chunk_secs: self.timing.min_chunk_secs,
            gap_ms: self.timing.gap_ms,
        }
    }

    /// Narration request for `text` with the configured voice settings
    pub fn narration_request(&self, text: impl Into<String>) -> Result<NarrationRequest> {
        Ok(NarrationRequest::new(text)
            .with_rules(self.effective_rules()?)
            .with_voice(self.voice)
            .with_prosody(self.speed_percent, self.pitch_offset_hz)
            .with_volume_boost(self.volume_boost_db)
            .with_platform(self.platform))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            voice: VoiceId::default(),
            speed_percent: default_speed_percent(),
            pitch_offset_hz: default_pitch_offset_hz(),
            volume_boost_db: default_volume_boost_db(),
            platform: CaptionPlatform::default(),
            rules: default_rules(),
            rules_file: None,
            timing: TimingConfig::default(),
            synthesis: SynthesisConfig::default(),
            audio: AudioConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
