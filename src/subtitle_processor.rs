use std::fmt;
use log::debug;

// @module: Subtitle timeline accumulation and SRT rendering

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Start time in seconds
    pub start_secs: f64,

    // @field: End time in seconds
    pub end_secs: f64,

    // @field: Caption text
    pub text: String,
}

impl SubtitleCue {
    pub fn new(index: usize, start_secs: f64, end_secs: f64, text: impl Into<String>) -> Self {
        SubtitleCue {
            index,
            start_secs,
            end_secs,
            text: text.into(),
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_secs)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_secs)
    }

    /// Format seconds as `HH:MM:SS,mmm`.
    ///
    /// Milliseconds are the fractional part truncated, never rounded. Hours
    /// are not wrapped.
    pub fn format_timestamp(seconds: f64) -> String {
        let seconds = seconds.max(0.0);
        let whole = seconds.trunc();
        let millis = ((seconds - whole) * 1000.0) as u64;
        let whole = whole as u64;

        let hours = whole / 3600;
        let minutes = (whole / 60) % 60;
        let secs = whole % 60;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered cues for a whole narration. Cue numbering runs across every
/// appended segment and never restarts.
#[derive(Debug, Default)]
pub struct SubtitleTimeline {
    cues: Vec<SubtitleCue>,
}

impl SubtitleTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay `chunks` end to end starting at `start_secs`.
    ///
    /// Returns the cues just added and the time the last one ends.
    pub fn append_segment(&mut self, chunks: &[(String, f64)], start_secs: f64) -> (Vec<SubtitleCue>, f64) {
        let mut running = start_secs;
        let first_new = self.cues.len();

        for (text, duration) in chunks {
            let index = self.cues.len() + 1;
            let end = running + duration;
            debug!("Cue {}: {:.3}s -> {:.3}s", index, running, end);
            self.cues.push(SubtitleCue::new(index, running, end, text.trim()));
            running = end;
        }

        (self.cues[first_new..].to_vec(), running)
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Serialize every cue to SRT text. An empty timeline renders as "".
    pub fn render(&self) -> String {
        self.cues.iter().map(|cue| cue.to_string()).collect()
    }
}

impl fmt::Display for SubtitleTimeline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for cue in &self.cues {
            write!(f, "{}", cue)?;
        }
        Ok(())
    }
}
