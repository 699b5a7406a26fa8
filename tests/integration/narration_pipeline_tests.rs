/*!
 * End-to-end tests of the narration pipeline over mock collaborators
 */

use std::sync::Arc;
use async_trait::async_trait;
use bytes::Bytes;
use narrasrt::audio::{AudioClip, AudioProcessor, PassthroughAudio};
use narrasrt::errors::{AudioError, NarrationError};
use narrasrt::pipeline::{NarrationPipeline, NarrationRequest, PipelineStage};
use narrasrt::providers::mock::MockSynthesizer;
use narrasrt::segmenter::CaptionPlatform;
use narrasrt::timing::{DurationEstimator, DurationMode};
use narrasrt::usage::UsageStats;
use crate::common::{self, assert_close, TWO_SENTENCES};

/// Audio collaborator that fails on demand
#[derive(Debug)]
struct FailingAudio {
    fail_prepare: bool,
}

#[async_trait]
impl AudioProcessor for FailingAudio {
    async fn prepare(&self, data: Bytes) -> Result<AudioClip, AudioError> {
        if self.fail_prepare {
            Err(AudioError::ToolFailed { tool: "ffmpeg".to_string(), message: "invalid data".to_string() })
        } else {
            Ok(AudioClip::unmeasured(data))
        }
    }

    async fn export(&self, _clips: &[AudioClip], _gap_ms: u64, _gain_db: f64) -> Result<Bytes, AudioError> {
        Err(AudioError::ToolFailed { tool: "ffmpeg".to_string(), message: "encoder missing".to_string() })
    }
}

/// Test the two-sentence scenario with measured durations
#[tokio::test]
async fn test_run_withTwoSentences_shouldProduceTwoTimedCues() {
    let tts = MockSynthesizer::working().with_reported_duration(0.1);
    let pipeline = common::mock_pipeline(tts.clone(), DurationMode::Measured);

    let result = pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await.unwrap();

    assert_eq!(result.cue_count(), 2);
    assert_eq!(result.segments_total, 2);
    assert_eq!(result.segments_skipped, 0);

    let first = &result.cues[0];
    let second = &result.cues[1];
    assert_eq!(first.text, "Hello world.");
    assert_eq!(second.text, "Goodbye now.");
    assert_eq!(first.start_secs, 0.0);
    assert_close(first.end_secs, 1.2);
    assert_close(second.start_secs, 1.25);
    assert_close(second.end_secs, 2.45);
    assert_close(result.narrated_secs, 2.5);

    assert!(result.srt.starts_with("1\n00:00:00,000 --> "));
    assert_eq!(&result.audio[..], b"AUDIO[Hello world.]AUDIO[Goodbye now.]");
    assert_eq!(tts.request_count(), 2);
}

/// Test that total failure yields empty output rather than an error
#[tokio::test]
async fn test_run_withEverySegmentFailing_shouldReturnEmptyResult() {
    let pipeline = common::mock_pipeline(MockSynthesizer::failing(), DurationMode::Measured);

    let result = pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await.unwrap();

    assert!(result.audio.is_empty());
    assert_eq!(result.srt, "");
    assert!(result.is_empty());
    assert_eq!(result.segments_skipped, 2);
}

/// Test that the exporter is not asked to join nothing
#[tokio::test]
async fn test_run_withNoSurvivingSegments_shouldNotCallExporter() {
    let pipeline = NarrationPipeline::new(
        Arc::new(MockSynthesizer::failing()),
        Arc::new(FailingAudio { fail_prepare: false }),
    );

    let result = pipeline.run(&NarrationRequest::new("One. Two.")).await;
    assert!(result.unwrap().is_empty());
}

/// Test that a skipped segment leaves no hole in numbering or time
#[tokio::test]
async fn test_run_withOneFailingSegment_shouldSkipIt() {
    let tts = MockSynthesizer::failing_on(&[1]).with_reported_duration(0.1);
    let pipeline = common::mock_pipeline(tts, DurationMode::Measured);

    let result = pipeline.run(&NarrationRequest::new("Alpha one. Beta two. Gamma three.")).await.unwrap();

    assert_eq!(result.segments_skipped, 1);
    assert_eq!(result.cue_count(), 2);
    assert_eq!(result.cues[0].index, 1);
    assert_eq!(result.cues[1].index, 2);
    assert_eq!(result.cues[1].text, "Gamma three.");
    assert_close(result.cues[1].start_secs, result.cues[0].end_secs + 0.05);
    assert!(result.srt.contains("2\n"));
    assert!(!result.srt.contains("Beta"));
}

/// Test that empty synthesized audio counts as a failed segment
#[tokio::test]
async fn test_run_withEmptyAudio_shouldSkipSegments() {
    let pipeline = common::mock_pipeline(MockSynthesizer::empty(), DurationMode::Measured);
    let result = pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await.unwrap();
    assert_eq!(result.segments_skipped, 2);
    assert!(result.is_empty());
}

/// Test intermittent failures over several segments
#[tokio::test]
async fn test_run_withIntermittentBackend_shouldKeepSurvivors() {
    let pipeline = common::mock_pipeline(MockSynthesizer::intermittent(2), DurationMode::Estimated);
    let result = pipeline.run(&NarrationRequest::new("A. B. C. D.")).await.unwrap();

    assert_eq!(result.segments_total, 4);
    assert_eq!(result.segments_skipped, 2);
    let texts: Vec<&str> = result.cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["A.", "C."]);
}

/// Test rejecting blank input before any synthesis
#[tokio::test]
async fn test_run_withBlankText_shouldFailFast() {
    let tts = MockSynthesizer::working();
    let pipeline = common::mock_pipeline(tts.clone(), DurationMode::Measured);

    let mut stages = Vec::new();
    let result = pipeline
        .run_with_progress(&NarrationRequest::new("   "), |stage| stages.push(stage.clone()))
        .await;

    assert!(matches!(result, Err(NarrationError::EmptyInput)));
    assert_eq!(stages.last(), Some(&PipelineStage::Failed));
    assert_eq!(tts.request_count(), 0);
}

/// Test that newlines never reach the synthesizer
#[tokio::test]
async fn test_run_withNewlines_shouldJoinLines() {
    let tts = MockSynthesizer::working();
    let pipeline = common::mock_pipeline(tts.clone(), DurationMode::Estimated);

    let result = pipeline.run(&NarrationRequest::new("Line one\nline two.\nNext")).await.unwrap();

    let sent: Vec<String> = tts.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(sent, vec!["Line one line two.", "Next"]);
    assert_eq!(result.cues[0].text, "Line one line two.");
}

/// Test that Windows line endings are joined like plain newlines
#[tokio::test]
async fn test_run_withCrlfLineEndings_shouldJoinLinesWithoutCarriageReturn() {
    let tts = MockSynthesizer::working();
    let pipeline = common::mock_pipeline(tts.clone(), DurationMode::Estimated);

    let result = pipeline.run(&NarrationRequest::new("Line one\r\nline two.\rNext")).await.unwrap();

    let sent: Vec<String> = tts.requests().into_iter().map(|r| r.text).collect();
    assert_eq!(sent, vec!["Line one line two.", "Next"]);
    assert_eq!(result.cues[0].text, "Line one line two.");
    assert!(!result.srt.contains('\r'));
}

/// Test wrapping of a long segment into several cues
#[tokio::test]
async fn test_run_withLongSegment_shouldWrapIntoMonotonicCues() {
    let text = "This sentence is deliberately long so that the narrow caption profile has to break it into several readable pieces for the viewer.";
    let pipeline = common::mock_pipeline(MockSynthesizer::working(), DurationMode::Estimated);

    let request = NarrationRequest::new(text).with_platform(CaptionPlatform::TikTok);
    let result = pipeline.run(&request).await.unwrap();

    assert!(result.cue_count() > 1);
    for (i, cue) in result.cues.iter().enumerate() {
        assert_eq!(cue.index, i + 1);
        assert!(cue.text.chars().count() < 55);
        assert!(cue.end_secs > cue.start_secs);
    }
    for pair in result.cues.windows(2) {
        assert_close(pair[1].start_secs, pair[0].end_secs);
    }

    let wide = pipeline.run(&request.clone().with_platform(CaptionPlatform::YouTube)).await.unwrap();
    assert_eq!(wide.cue_count(), 1);
}

/// Test that estimated mode inserts no gap between segments
#[tokio::test]
async fn test_run_withEstimatedMode_shouldPlaceSegmentsBackToBack() {
    let pipeline = common::mock_pipeline(MockSynthesizer::working(), DurationMode::Estimated);
    let result = pipeline.run(&NarrationRequest::new("Hi. Yo.")).await.unwrap();

    assert_close(result.cues[0].end_secs, 3.0 * 0.15);
    assert_close(result.cues[1].start_secs, result.cues[0].end_secs);
}

/// Test that a measured clip duration overrides the synthesizer's report
#[tokio::test]
async fn test_run_withMeasuringAudio_shouldPreferMeasuredDuration() {
    // 4 bytes per second, "AUDIO[Hi.]" is 10 bytes
    let pipeline = NarrationPipeline::new(
        Arc::new(MockSynthesizer::working().with_reported_duration(1.0)),
        Arc::new(PassthroughAudio::with_byte_rate(4.0)),
    );

    let result = pipeline.run(&NarrationRequest::new("Hi.")).await.unwrap();
    assert_close(result.cues[0].end_secs, 2.5);
}

/// Test that an undecodable segment is skipped like a synthesis failure
#[tokio::test]
async fn test_run_withUndecodableAudio_shouldSkipSegment() {
    let pipeline = NarrationPipeline::new(
        Arc::new(MockSynthesizer::working()),
        Arc::new(FailingAudio { fail_prepare: true }),
    );

    let result = pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await.unwrap();
    assert_eq!(result.segments_skipped, 2);
    assert!(result.is_empty());
}

/// Test that an export failure ends the request
#[tokio::test]
async fn test_run_withExportFailure_shouldFailRequest() {
    let pipeline = NarrationPipeline::new(
        Arc::new(MockSynthesizer::working()),
        Arc::new(FailingAudio { fail_prepare: false }),
    );

    let result = pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await;
    assert!(matches!(result, Err(NarrationError::Audio(_))));
}

/// Test reporting to the usage sink
#[test]
fn test_run_withUsageSink_shouldRecordRequest() {
    let usage = Arc::new(UsageStats::new());
    let pipeline = common::mock_pipeline(MockSynthesizer::working().with_reported_duration(0.1), DurationMode::Measured)
        .with_usage_sink(usage.clone());

    let result = tokio_test::block_on(async {
        pipeline.run(&NarrationRequest::new(TWO_SENTENCES)).await
    }).unwrap();

    let snapshot = usage.snapshot();
    assert_eq!(snapshot.requests, 1);
    assert!((snapshot.narrated_secs - result.narrated_secs).abs() < 0.002);
    assert!(snapshot.last_used.is_some());
}

/// Test that the configured estimator reaches the pipeline
#[tokio::test]
async fn test_run_withCustomGap_shouldAdvanceClockByGap() {
    let estimator = DurationEstimator { gap_ms: 200, ..DurationEstimator::new(DurationMode::Measured) };
    let pipeline = NarrationPipeline::new(
        Arc::new(MockSynthesizer::working().with_reported_duration(0.1)),
        Arc::new(PassthroughAudio::new()),
    ).with_estimator(estimator);

    let result = pipeline.run(&NarrationRequest::new("One. Two.")).await.unwrap();
    assert_close(result.cues[1].start_secs, 0.4 + 0.2);
}
