use serde::{Deserialize, Serialize};

// @module: Supported narration voices

/// The four narration voices. Chosen once at the boundary from whatever the
/// caller supplied and passed around as this type afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VoiceId {
    // @voice: Myanmar male
    #[default]
    #[serde(rename = "thiha")]
    ThihaMale,
    // @voice: Myanmar female
    #[serde(rename = "nilar")]
    NilarFemale,
    // @voice: British English male
    #[serde(rename = "ryan")]
    RyanMale,
    // @voice: British English female
    #[serde(rename = "sonia")]
    SoniaFemale,
}

impl VoiceId {
    pub const ALL: [VoiceId; 4] = [Self::ThihaMale, Self::NilarFemale, Self::RyanMale, Self::SoniaFemale];

    // @returns: Neural voice short name understood by the synthesis service
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::ThihaMale => "my-MM-ThihaNeural",
            Self::NilarFemale => "my-MM-NilarNeural",
            Self::RyanMale => "en-GB-RyanNeural",
            Self::SoniaFemale => "en-GB-SoniaNeural",
        }
    }

    // @returns: Label shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ThihaMale => "အကိုလေး (Male)",
            Self::NilarFemale => "မြမြ (Female)",
            Self::RyanMale => "English UK (Male)",
            Self::SoniaFemale => "English UK (Female)",
        }
    }

    /// Map a selector string (display label, short name, or plain voice
    /// name) to a voice. Unrecognised input yields `ThihaMale`.
    pub fn from_selector(selector: &str) -> Self {
        let trimmed = selector.trim();

        if let Some(voice) = Self::ALL.iter().find(|v| {
            v.short_name().eq_ignore_ascii_case(trimmed)
                || v.display_name() == trimmed
                || v.to_string().eq_ignore_ascii_case(trimmed)
        }) {
            return *voice;
        }

        // English voices first: their labels also say Male/Female
        let lower = trimmed.to_lowercase();
        if lower.contains("sonia") || (lower.contains("english") && lower.contains("female")) {
            Self::SoniaFemale
        } else if lower.contains("ryan") || lower.contains("english") {
            Self::RyanMale
        } else if lower.contains("nilar") || lower.contains("female") {
            Self::NilarFemale
        } else {
            Self::ThihaMale
        }
    }
}

impl std::fmt::Display for VoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ThihaMale => "thiha",
            Self::NilarFemale => "nilar",
            Self::RyanMale => "ryan",
            Self::SoniaFemale => "sonia",
        };
        write!(f, "{}", name)
    }
}

/// Speaking rate argument, e.g. `+25%`
pub fn format_rate(rate_percent: i32) -> String {
    format!("{:+}%", rate_percent)
}

/// Pitch argument, e.g. `-7Hz`
pub fn format_pitch(pitch_shift_hz: i32) -> String {
    format!("{:+}Hz", pitch_shift_hz)
}
