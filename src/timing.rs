/*!
 * Caption duration estimation.
 *
 * A segment's duration is either measured from its synthesized audio or
 * estimated from its character count. The duration is then shared out between
 * the segment's caption chunks in proportion to their character counts.
 */

use serde::{Deserialize, Serialize};

/// Seconds of speech assumed per character when no audio duration is known.
/// Not calibrated against any particular voice or speaking rate.
pub const DEFAULT_SECS_PER_CHAR: f64 = 0.15;

/// Shortest caption shown when a segment is split into several chunks
pub const DEFAULT_MIN_CHUNK_SECS: f64 = 0.5;

/// Silence inserted between segments in measured mode
pub const DEFAULT_GAP_MS: u64 = 50;

/// How segment durations are obtained
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationMode {
    /// Use the duration of the synthesized (trimmed) segment audio
    #[default]
    Measured,
    /// Use a character-count heuristic; no gap is inserted between segments
    Estimated,
}

impl std::fmt::Display for DurationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured => write!(f, "measured"),
            Self::Estimated => write!(f, "estimated"),
        }
    }
}

/// Duration estimation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationEstimator {
    /// Selected mode
    pub mode: DurationMode,
    /// Heuristic seconds per character for estimated durations
    pub secs_per_char: f64,
    /// Floor applied to chunks of multi-chunk segments
    pub min_chunk_secs: f64,
    /// Pause after each segment in measured mode, in milliseconds
    pub gap_ms: u64,
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new(DurationMode::Measured)
    }
}

impl DurationEstimator {
    pub fn new(mode: DurationMode) -> Self {
        Self {
            mode,
            secs_per_char: DEFAULT_SECS_PER_CHAR,
            min_chunk_secs: DEFAULT_MIN_CHUNK_SECS,
            gap_ms: DEFAULT_GAP_MS,
        }
    }

    /// Heuristic duration of a segment from its character count
    pub fn estimate_segment_secs(&self, segment_text: &str) -> f64 {
        self.secs_per_char * segment_text.chars().count() as f64
    }

    /// Pick the segment duration: the measured value in measured mode when
    /// one is available, the estimate otherwise.
    pub fn segment_secs(&self, segment_text: &str, measured_secs: Option<f64>) -> f64 {
        match (self.mode, measured_secs) {
            (DurationMode::Measured, Some(secs)) if secs.is_finite() && secs >= 0.0 => secs,
            _ => self.estimate_segment_secs(segment_text),
        }
    }

    /// Share `segment_secs` between `chunks` by character ratio against the
    /// pre-wrap segment length. Chunks of a multi-chunk segment are clamped up
    /// to the minimum; a lone chunk is left as is.
    pub fn allocate(&self, segment_text: &str, chunks: &[String], segment_secs: f64) -> Vec<(String, f64)> {
        let total_chars = segment_text.chars().count().max(1) as f64;
        let clamp = chunks.len() > 1;

        chunks
            .iter()
            .map(|chunk| {
                let share = chunk.chars().count() as f64 / total_chars;
                let mut secs = share * segment_secs;
                if clamp && secs < self.min_chunk_secs {
                    secs = self.min_chunk_secs;
                }
                (chunk.clone(), secs)
            })
            .collect()
    }

    /// Clock advance after a segment: its full duration plus the pause
    pub fn advance(&self, segment_secs: f64) -> f64 {
        segment_secs + self.gap_secs()
    }

    /// Pause between segments, zero in estimated mode
    pub fn gap_secs(&self) -> f64 {
        self.inserted_gap_ms() as f64 / 1000.0
    }

    /// Silence the audio export must place after each clip
    pub fn inserted_gap_ms(&self) -> u64 {
        match self.mode {
            DurationMode::Measured => self.gap_ms,
            DurationMode::Estimated => 0,
        }
    }
}
