/*!
 * Tests for the subtitle timeline and SRT output
 */

use narrasrt::subtitle_processor::{SubtitleCue, SubtitleTimeline};
use crate::common::assert_close;

fn chunks(items: &[(&str, f64)]) -> Vec<(String, f64)> {
    items.iter().map(|(t, d)| (t.to_string(), *d)).collect()
}

/// Test timestamp formatting
#[test]
fn test_formatTimestamp_shouldPadAndTruncate() {
    assert_eq!(SubtitleCue::format_timestamp(0.0), "00:00:00,000");
    assert_eq!(SubtitleCue::format_timestamp(1.9999), "00:00:01,999");
    assert_eq!(SubtitleCue::format_timestamp(61.25), "00:01:01,250");
    assert_eq!(SubtitleCue::format_timestamp(3723.5), "01:02:03,500");
}

/// Test that hours keep counting past a day
#[test]
fn test_formatTimestamp_withLongDuration_shouldNotWrapHours() {
    assert_eq!(SubtitleCue::format_timestamp(100.0 * 3600.0), "100:00:00,000");
}

/// Test global numbering across segments
#[test]
fn test_appendSegment_shouldNumberAcrossSegments() {
    let mut timeline = SubtitleTimeline::new();
    let (first, end) = timeline.append_segment(&chunks(&[("a", 1.0), ("b", 0.5)]), 0.0);
    let (second, _) = timeline.append_segment(&chunks(&[("c", 2.0)]), end + 0.05);

    assert_eq!(first.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(second[0].index, 3);

    let indices: Vec<usize> = timeline.cues().iter().map(|c| c.index).collect();
    assert_eq!(indices, (1..=3).collect::<Vec<_>>());
}

/// Test that the segment end equals start plus the summed durations
#[test]
fn test_appendSegment_endShouldEqualStartPlusSum() {
    let mut timeline = SubtitleTimeline::new();
    let durations = [0.3, 0.7, 1.1, 0.5];
    let items: Vec<(String, f64)> = durations.iter().enumerate()
        .map(|(i, d)| (format!("chunk {}", i), *d))
        .collect();

    let (cues, end) = timeline.append_segment(&items, 2.5);
    assert_close(end, 2.5 + durations.iter().sum::<f64>());
    assert_close(cues.last().unwrap().end_secs, end);

    for pair in cues.windows(2) {
        assert!(pair[1].start_secs >= pair[0].end_secs);
    }
    for cue in &cues {
        assert!(cue.end_secs >= cue.start_secs);
    }
}

/// Test the rendered SRT document
#[test]
fn test_render_shouldProduceSrtBlocks() {
    let mut timeline = SubtitleTimeline::new();
    timeline.append_segment(&chunks(&[("  Hello world.  ", 1.5)]), 0.0);
    timeline.append_segment(&chunks(&[("Goodbye now.", 0.75)]), 1.75);

    let expected = "1\n00:00:00,000 --> 00:00:01,500\nHello world.\n\n\
                    2\n00:00:01,750 --> 00:00:02,500\nGoodbye now.\n\n";
    assert_eq!(timeline.render(), expected);
}

/// Test that an empty timeline renders nothing
#[test]
fn test_render_withNoCues_shouldBeEmpty() {
    let timeline = SubtitleTimeline::new();
    assert!(timeline.is_empty());
    assert_eq!(timeline.render(), "");
}
