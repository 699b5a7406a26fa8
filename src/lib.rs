/*!
 * # narrasrt - Narration with SRT captions
 *
 * A Rust library that turns Myanmar or English text into narrated audio and
 * a caption file timed to that audio.
 *
 * ## Features
 *
 * - Pronunciation rules rewriting text before it is spoken
 * - Sentence segmentation on Latin and Myanmar terminators
 * - Caption wrapping for narrow (TikTok) and wide (YouTube) video
 * - Caption timing from measured audio or from a text-length estimate
 * - Speech synthesis through:
 *   - the `edge-tts` command-line tool
 *   - a remote narration endpoint
 * - Trailing-silence trimming, joining and gain through ffmpeg
 * - Partial failure: a segment that cannot be synthesized is skipped
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `pronunciation`: Rule parsing and application
 * - `segmenter`: Segments and caption chunks
 * - `timing`: Segment durations and chunk allocation
 * - `subtitle_processor`: Cue timeline and SRT rendering
 * - `voices`: Voice catalogue and prosody arguments
 * - `providers`: Speech synthesis backends:
 *   - `providers::edge_tts`: edge-tts subprocess client
 *   - `providers::remote`: HTTP narration client
 *   - `providers::mock`: Deterministic test backend
 * - `audio`: Audio trimming, measuring and export
 * - `pipeline`: Narration orchestration
 * - `usage`: Process-wide usage counters
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod pronunciation;
pub mod segmenter;
pub mod timing;
pub mod subtitle_processor;
pub mod voices;
pub mod audio;
pub mod pipeline;
pub mod usage;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use pronunciation::{apply_pronunciation_rules, PronunciationRuleSet, DEFAULT_RULES};
pub use segmenter::{split_into_speakable_segments, wrap_for_captions, CaptionPlatform};
pub use timing::{DurationEstimator, DurationMode};
pub use subtitle_processor::{SubtitleCue, SubtitleTimeline};
pub use voices::VoiceId;
pub use pipeline::{NarrationPipeline, NarrationRequest, NarrationResult, PipelineStage};
pub use errors::{AppError, AudioError, NarrationError, SynthesisError};
