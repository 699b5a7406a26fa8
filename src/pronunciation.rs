use log::{debug, trace};

// @module: Pronunciation rewrite rules applied before synthesis

/// Rules shipped with the default configuration. Myanmar spellings whose
/// written form the synthesis voices read incorrectly.
pub const DEFAULT_RULES: &str = "\
မေတ္တာ = မြစ်တာ
သစ္စာ = သစ်စာ
ပြဿနာ = ပြတ်သနာ
ဥစ္စာ = အုတ်စာ
ဦးနှောက် = အုံးနှောက်
";

// @struct: Single literal find/replace rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PronunciationRule {
    pub pattern: String,
    pub replacement: String,
}

/// Ordered rule list. Rules run in declaration order, each one a single
/// literal pass over the whole text, so later rules see the output of
/// earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PronunciationRuleSet {
    rules: Vec<PronunciationRule>,
}

impl PronunciationRuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse newline-delimited `pattern = replacement` lines.
    ///
    /// The line is cut at the first `=`. Lines without `=`, or with either
    /// side blank after trimming, are skipped without error.
    pub fn parse(rules: &str) -> Self {
        let mut set = Self::new();

        for (line_no, line) in rules.lines().enumerate() {
            let Some((pattern, replacement)) = line.split_once('=') else {
                if !line.trim().is_empty() {
                    trace!("Ignoring rule line {} without '='", line_no + 1);
                }
                continue;
            };

            if !set.push(pattern, replacement) {
                debug!("Ignoring incomplete rule on line {}: {:?}", line_no + 1, line);
            }
        }

        set
    }

    /// Append a rule; returns false when either side trims to empty
    pub fn push(&mut self, pattern: &str, replacement: &str) -> bool {
        let pattern = pattern.trim();
        let replacement = replacement.trim();
        if pattern.is_empty() || replacement.is_empty() {
            return false;
        }

        self.rules.push(PronunciationRule {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[PronunciationRule] {
        &self.rules
    }

    /// Rewrite `text` with every rule in order
    pub fn apply(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            if acc.contains(&rule.pattern) {
                acc.replace(&rule.pattern, &rule.replacement)
            } else {
                acc
            }
        })
    }
}

/// Parse `rules` and apply them to `text` in one call
pub fn apply_pronunciation_rules(text: &str, rules: &str) -> String {
    if rules.is_empty() {
        return text.to_string();
    }
    PronunciationRuleSet::parse(rules).apply(text)
}
