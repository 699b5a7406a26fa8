/*!
 * Narration pipeline.
 *
 * Turns one request into narrated audio plus an SRT document:
 * rules are parsed, the text is segmented, and each segment is synthesized,
 * measured, and timed strictly in order. A segment whose synthesis fails is
 * logged and skipped; the rest of the request carries on.
 */

use std::fmt;
use std::sync::Arc;
use bytes::Bytes;
use log::{debug, info, warn};

use crate::audio::{AudioClip, AudioProcessor};
use crate::errors::{NarrationError, SynthesisError};
use crate::pronunciation::{PronunciationRuleSet, DEFAULT_RULES};
use crate::providers::{SpeechSynthesizer, SynthesisRequest};
use crate::segmenter::{split_into_speakable_segments, wrap_for_captions, CaptionPlatform};
use crate::subtitle_processor::{SubtitleCue, SubtitleTimeline};
use crate::timing::{DurationEstimator, DurationMode};
use crate::usage::UsageSink;
use crate::voices::VoiceId;

/// Parameters of one narration
#[derive(Debug, Clone)]
pub struct NarrationRequest {
    /// Text to narrate
    pub text: String,
    /// Newline-delimited `pattern = replacement` pronunciation rules
    pub rules: String,
    /// Voice
    pub voice: VoiceId,
    /// Speaking rate offset in percent
    pub speed_percent: i32,
    /// Pitch offset as the user sees it; inverted before synthesis
    pub pitch_offset_hz: i32,
    /// Gain in dB applied to the final audio when positive
    pub volume_boost_db: f64,
    /// Caption width profile
    pub platform: CaptionPlatform,
}

impl NarrationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rules: DEFAULT_RULES.to_string(),
            voice: VoiceId::default(),
            speed_percent: 0,
            pitch_offset_hz: 0,
            volume_boost_db: 0.0,
            platform: CaptionPlatform::default(),
        }
    }

    pub fn with_rules(mut self, rules: impl Into<String>) -> Self {
        self.rules = rules.into();
        self
    }

    pub fn with_voice(mut self, voice: VoiceId) -> Self {
        self.voice = voice;
        self
    }

    pub fn with_prosody(mut self, speed_percent: i32, pitch_offset_hz: i32) -> Self {
        self.speed_percent = speed_percent;
        self.pitch_offset_hz = pitch_offset_hz;
        self
    }

    pub fn with_volume_boost(mut self, volume_boost_db: f64) -> Self {
        self.volume_boost_db = volume_boost_db;
        self
    }

    pub fn with_platform(mut self, platform: CaptionPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Synthesis call for one speakable segment
    pub fn synthesis_request(&self, speakable_text: String) -> SynthesisRequest {
        SynthesisRequest {
            text: speakable_text,
            voice: self.voice,
            rate_percent: self.speed_percent,
            pitch_shift_hz: self.pitch_offset_hz.saturating_neg(),
        }
    }
}

/// Where a request currently is
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    Idle,
    RuleApplied { rule_count: usize },
    Segmented { segment_count: usize },
    Synthesizing { index: usize, total: usize },
    Measuring { index: usize, total: usize },
    TimedAppend { index: usize, total: usize },
    Finalizing,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::RuleApplied { rule_count } => write!(f, "{} rules loaded", rule_count),
            Self::Segmented { segment_count } => write!(f, "{} segments", segment_count),
            Self::Synthesizing { index, total } => write!(f, "synthesizing {}/{}", index + 1, total),
            Self::Measuring { index, total } => write!(f, "measuring {}/{}", index + 1, total),
            Self::TimedAppend { index, total } => write!(f, "timing {}/{}", index + 1, total),
            Self::Finalizing => write!(f, "exporting audio"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Output of one narration
#[derive(Debug, Clone, Default)]
pub struct NarrationResult {
    /// Joined, encoded audio; empty when every segment was skipped
    pub audio: Bytes,
    /// Rendered SRT document; empty when every segment was skipped
    pub srt: String,
    /// Cues behind `srt`
    pub cues: Vec<SubtitleCue>,
    pub segments_total: usize,
    pub segments_skipped: usize,
    /// Clock position after the last segment, gaps included
    pub narrated_secs: f64,
}

impl NarrationResult {
    /// Nothing was produced; callers should inspect rather than ship this
    pub fn is_empty(&self) -> bool {
        self.audio.is_empty() && self.srt.is_empty()
    }

    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }
}

/// Sequential narration pipeline over a synthesis backend and an audio
/// processor
#[derive(Clone)]
pub struct NarrationPipeline {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    audio: Arc<dyn AudioProcessor>,
    estimator: DurationEstimator,
    usage: Option<Arc<dyn UsageSink>>,
}

impl fmt::Debug for NarrationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrationPipeline")
            .field("synthesizer", &self.synthesizer.name())
            .field("audio", &self.audio)
            .field("estimator", &self.estimator)
            .field("usage", &self.usage.is_some())
            .finish()
    }
}

impl NarrationPipeline {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, audio: Arc<dyn AudioProcessor>) -> Self {
        Self {
            synthesizer,
            audio,
            estimator: DurationEstimator::default(),
            usage: None,
        }
    }

    pub fn with_estimator(mut self, estimator: DurationEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_usage_sink(mut self, usage: Arc<dyn UsageSink>) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn estimator(&self) -> &DurationEstimator {
        &self.estimator
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.synthesizer
    }

    /// Run one request to completion
    pub async fn run(&self, request: &NarrationRequest) -> Result<NarrationResult, NarrationError> {
        self.run_with_progress(request, |_| {}).await
    }

    /// Run one request, reporting every stage change to `on_stage`
    pub async fn run_with_progress<F>(&self, request: &NarrationRequest, mut on_stage: F) -> Result<NarrationResult, NarrationError>
    where
        F: FnMut(&PipelineStage),
    {
        on_stage(&PipelineStage::Idle);

        if request.text.trim().is_empty() {
            on_stage(&PipelineStage::Failed);
            return Err(NarrationError::EmptyInput);
        }

        let rules = PronunciationRuleSet::parse(&request.rules);
        on_stage(&PipelineStage::RuleApplied { rule_count: rules.len() });

        let text = join_lines(&request.text);
        let segments = split_into_speakable_segments(&text);
        let total = segments.len();
        on_stage(&PipelineStage::Segmented { segment_count: total });
        info!("Narrating {} segments with {} ({})", total, request.voice.short_name(), self.synthesizer.name());

        let max_chars = request.platform.max_caption_chars();
        let mut timeline = SubtitleTimeline::new();
        let mut clips: Vec<AudioClip> = Vec::with_capacity(total);
        let mut clock = 0.0_f64;
        let mut skipped = 0;

        for (index, segment) in segments.iter().enumerate() {
            on_stage(&PipelineStage::Synthesizing { index, total });

            let speakable = join_lines(&rules.apply(segment));
            let synthesized = match self.synthesizer.synthesize(&request.synthesis_request(speakable)).await {
                Ok(audio) if !audio.data.is_empty() => audio,
                Ok(_) => {
                    let err = NarrationError::SegmentSynthesis {
                        index,
                        source: SynthesisError::InvalidResponse("no audio returned".to_string()),
                    };
                    warn!("Skipping segment: {}", err);
                    skipped += 1;
                    continue;
                }
                Err(source) => {
                    let err = NarrationError::SegmentSynthesis { index, source };
                    warn!("Skipping segment: {}", err);
                    skipped += 1;
                    continue;
                }
            };

            on_stage(&PipelineStage::Measuring { index, total });

            let (clip, measured) = match self.estimator.mode {
                DurationMode::Measured => match self.audio.prepare(synthesized.data).await {
                    Ok(clip) => {
                        let measured = clip.duration_secs.or(synthesized.duration_secs);
                        (clip, measured)
                    }
                    Err(source) => {
                        let err = NarrationError::SegmentAudio { index, source };
                        warn!("Skipping segment: {}", err);
                        skipped += 1;
                        continue;
                    }
                },
                DurationMode::Estimated => (AudioClip::unmeasured(synthesized.data), None),
            };
            clips.push(clip);

            let segment_secs = self.estimator.segment_secs(segment, measured);

            on_stage(&PipelineStage::TimedAppend { index, total });

            let chunks = wrap_for_captions(segment, max_chars);
            let timed = self.estimator.allocate(segment, &chunks, segment_secs);
            let (cues, end) = timeline.append_segment(&timed, clock);
            debug!(
                "Segment {} ({:.3}s) -> {} cues ending at {:.3}s",
                index + 1, segment_secs, cues.len(), end
            );

            clock += self.estimator.advance(segment_secs);
        }

        on_stage(&PipelineStage::Finalizing);

        let audio = if clips.is_empty() {
            Bytes::new()
        } else {
            let gap_ms = self.estimator.inserted_gap_ms();
            match self.audio.export(&clips, gap_ms, request.volume_boost_db).await {
                Ok(audio) => audio,
                Err(e) => {
                    on_stage(&PipelineStage::Failed);
                    return Err(NarrationError::Audio(e));
                }
            }
        };

        if skipped > 0 {
            warn!("{} of {} segments were skipped", skipped, total);
        }

        if let Some(usage) = &self.usage {
            usage.record(clock);
        }

        on_stage(&PipelineStage::Done);

        Ok(NarrationResult {
            audio,
            srt: timeline.render(),
            cues: timeline.cues().to_vec(),
            segments_total: total,
            segments_skipped: skipped,
            narrated_secs: clock,
        })
    }
}

/// Turn every line break (LF, CRLF or a lone CR) into one space
fn join_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
