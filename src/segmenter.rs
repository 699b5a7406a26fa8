use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use log::trace;

// @module: Splitting text into speakable segments and caption chunks

// @const: Sentence terminators, Latin and Myanmar (section marks U+104A, U+104B)
static TERMINATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!;?\x{104A}\x{104B}]").unwrap()
});

/// Target platform, which decides how wide a caption may be
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPlatform {
    /// Vertical 9:16 video, narrow captions
    #[default]
    TikTok,
    /// Landscape 16:9 video, wide captions
    YouTube,
}

impl CaptionPlatform {
    // @returns: Character limit for one caption chunk
    pub fn max_caption_chars(&self) -> usize {
        match self {
            Self::TikTok => 55,
            Self::YouTube => 150,
        }
    }

    /// Map a free-form profile label such as "YouTube (16:9)" to a platform.
    /// Anything that does not mention YouTube gets the narrow profile.
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("youtube") {
            Self::YouTube
        } else {
            Self::TikTok
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::TikTok => "TikTok (9:16)",
            Self::YouTube => "YouTube (16:9)",
        }
    }
}

impl std::fmt::Display for CaptionPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Split text into segments that each end at a terminator.
///
/// Terminators stay attached to their segment. A terminator that arrives with
/// nothing buffered (doubled punctuation) is glued onto the previous segment.
/// Text after the last terminator becomes a final segment unless it is blank.
pub fn split_into_speakable_segments(text: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut last_end = 0;

    for terminator in TERMINATOR_REGEX.find_iter(text) {
        current.push_str(&text[last_end..terminator.start()]);
        last_end = terminator.end();

        if !current.is_empty() {
            current.push_str(terminator.as_str());
            segments.push(current.trim().to_string());
            current.clear();
        } else if let Some(previous) = segments.last_mut() {
            previous.push_str(terminator.as_str());
        }
    }

    current.push_str(&text[last_end..]);
    let tail = current.trim();
    if !tail.is_empty() {
        segments.push(tail.to_string());
    }

    trace!("Split text into {} segments", segments.len());
    segments
}

/// Greedy word wrap of one segment into caption chunks.
///
/// Words are split on single spaces and lengths are counted in characters.
/// A word is added while `len(current) + len(word) < max_chars`, where the
/// running chunk carries a trailing space. Words are never broken, so a single
/// overlong word becomes its own chunk.
pub fn wrap_for_captions(segment_text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in segment_text.split(' ') {
        let word_len = word.chars().count();

        if current_len + word_len < max_chars {
            current.push_str(word);
            current.push(' ');
            current_len += word_len + 1;
        } else {
            let closed = current.trim();
            if !closed.is_empty() {
                chunks.push(closed.to_string());
            }
            current.clear();
            current.push_str(word);
            current.push(' ');
            current_len = word_len + 1;
        }
    }

    let closed = current.trim();
    if !closed.is_empty() {
        chunks.push(closed.to_string());
    }

    chunks
}
