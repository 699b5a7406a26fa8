/*!
 * Tests for segment durations and chunk allocation
 */

use narrasrt::segmenter::wrap_for_captions;
use narrasrt::timing::{DurationEstimator, DurationMode};
use crate::common::assert_close;

/// Test that a single-chunk segment gets the full duration
#[test]
fn test_allocate_withOneChunk_shouldGetWholeSegment() {
    let estimator = DurationEstimator::new(DurationMode::Measured);
    let segment = "Hello world.";
    let chunks = wrap_for_captions(segment, 55);
    let allocated = estimator.allocate(segment, &chunks, 1.234);
    assert_eq!(allocated.len(), 1);
    assert_close(allocated[0].1, 1.234);
}

/// Test that the shares ignore the spaces removed by wrapping
#[test]
fn test_allocate_shouldUsePreWrapLengthAsDenominator() {
    let estimator = DurationEstimator::new(DurationMode::Measured);
    let segment = "aaaaaaaaa bbbbbbbbb";
    let chunks = wrap_for_captions(segment, 12);
    assert_eq!(chunks.len(), 2);

    let allocated = estimator.allocate(segment, &chunks, 19.0);
    assert_close(allocated[0].1, 9.0);
    assert_close(allocated[1].1, 9.0);
}

/// Test the estimated duration heuristic
#[test]
fn test_estimate_shouldUseCharacterCount() {
    let estimator = DurationEstimator::new(DurationMode::Estimated);
    assert_close(estimator.estimate_segment_secs("Hello world."), 12.0 * 0.15);
    assert_close(estimator.estimate_segment_secs("မြန်မာ"), 6.0 * 0.15);
}

/// Test the floor rule only for multi-chunk segments
#[test]
fn test_floor_shouldApplyOnlyToMultiChunkSegments() {
    let estimator = DurationEstimator::new(DurationMode::Estimated);

    let lone = estimator.allocate("Hi.", &["Hi.".to_string()], 0.1);
    assert_close(lone[0].1, 0.1);

    let segment = "a bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    let chunks = vec!["a".to_string(), "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".to_string()];
    let allocated = estimator.allocate(segment, &chunks, 2.0);
    assert_close(allocated[0].1, 0.5);
    assert!(allocated[1].1 > 0.5);
}

/// Test the clock advance in both modes
#[test]
fn test_advance_shouldAddGapOnlyWhenMeasured() {
    assert_close(DurationEstimator::new(DurationMode::Measured).advance(1.0), 1.05);
    assert_close(DurationEstimator::new(DurationMode::Estimated).advance(1.0), 1.0);
    assert_eq!(DurationEstimator::new(DurationMode::Measured).inserted_gap_ms(), 50);
    assert_eq!(DurationEstimator::new(DurationMode::Estimated).inserted_gap_ms(), 0);
}

/// Test invalid measurements falling back to the estimate
#[test]
fn test_segmentSecs_withInvalidMeasurement_shouldEstimate() {
    let estimator = DurationEstimator::new(DurationMode::Measured);
    assert_close(estimator.segment_secs("abc", Some(f64::NAN)), 0.45);
    assert_close(estimator.segment_secs("abc", Some(-1.0)), 0.45);
}

/// Test a tuned calibration constant
#[test]
fn test_estimate_withCustomRate_shouldScale() {
    let estimator = DurationEstimator {
        secs_per_char: 0.08,
        ..DurationEstimator::new(DurationMode::Estimated)
    };
    assert_close(estimator.segment_secs("abcdefghij", None), 0.8);
}
