/*!
 * Tests for segmentation and caption wrapping
 */

use narrasrt::segmenter::{split_into_speakable_segments, wrap_for_captions, CaptionPlatform};

/// Test the two-sentence scenario
#[test]
fn test_split_withTwoSentences_shouldYieldTwoSegments() {
    let segments = split_into_speakable_segments("Hello world. Goodbye now.");
    assert_eq!(segments, vec!["Hello world.", "Goodbye now."]);
}

/// Test that segments reconstruct the input apart from whitespace
#[test]
fn test_split_shouldReconstructInput() {
    let text = "First one! Second one? Third; fourth. last bit";
    let segments = split_into_speakable_segments(text);
    assert_eq!(segments.len(), 5);

    let strip = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    assert_eq!(strip(&segments.concat()), strip(text));
}

/// Test each recognised terminator
#[test]
fn test_split_withEveryTerminator_shouldSplit() {
    for terminator in [".", "!", ";", "?", "\u{104A}", "\u{104B}"] {
        let text = format!("a{t} b{t}", t = terminator);
        let segments = split_into_speakable_segments(&text);
        assert_eq!(segments.len(), 2, "terminator {:?}", terminator);
        assert!(segments[0].ends_with(terminator));
    }
}

/// Test that commas do not split
#[test]
fn test_split_withComma_shouldNotSplit() {
    assert_eq!(split_into_speakable_segments("one, two, three."), vec!["one, two, three."]);
}

/// Test an ellipsis attaching to one segment
#[test]
fn test_split_withEllipsis_shouldKeepDotsTogether() {
    assert_eq!(split_into_speakable_segments("Well... maybe."), vec!["Well...", "maybe."]);
}

/// Test empty and whitespace-only input
#[test]
fn test_split_withBlankInput_shouldYieldNothing() {
    assert!(split_into_speakable_segments("").is_empty());
    assert!(split_into_speakable_segments(" \t ").is_empty());
    assert!(split_into_speakable_segments("...").is_empty());
}

/// Test the wrap length bound and reconstruction
#[test]
fn test_wrap_shouldStayUnderLimitAndReconstruct() {
    let text = "The quick brown fox jumps over the lazy dog and keeps running through the forest until night falls.";
    let chunks = wrap_for_captions(text, 20);

    for chunk in &chunks {
        assert!(chunk.chars().count() < 20 || !chunk.contains(' '), "chunk too long: {:?}", chunk);
    }
    assert_eq!(chunks.join(" "), text);
}

/// Test that the width comes from the platform profile
#[test]
fn test_wrap_withPlatformWidths_shouldDiffer() {
    let text = "word ".repeat(30);
    let text = text.trim();
    let narrow = wrap_for_captions(text, CaptionPlatform::TikTok.max_caption_chars());
    let wide = wrap_for_captions(text, CaptionPlatform::YouTube.max_caption_chars());
    assert!(narrow.len() > 1);
    assert_eq!(wide.len(), 1);
}

/// Test the boundary: a chunk reaching exactly max_chars is closed
#[test]
fn test_wrap_atExactBoundary_shouldStartNewChunk() {
    // "abcd " is 5 chars; adding "efgh" gives 5 + 4 = 9, not < 9
    assert_eq!(wrap_for_captions("abcd efgh", 9), vec!["abcd", "efgh"]);
    assert_eq!(wrap_for_captions("abcd efgh", 10), vec!["abcd efgh"]);
}

/// Test empty segment wrapping
#[test]
fn test_wrap_withEmptyText_shouldYieldNoChunks() {
    assert!(wrap_for_captions("", 55).is_empty());
}

/// Test platform labels and serde names
#[test]
fn test_platform_shouldParseLabelsAndSerialize() {
    assert_eq!(CaptionPlatform::from_label("youtube"), CaptionPlatform::YouTube);
    assert_eq!(CaptionPlatform::default(), CaptionPlatform::TikTok);
    assert_eq!(serde_json::to_string(&CaptionPlatform::YouTube).unwrap(), "\"youtube\"");
}
