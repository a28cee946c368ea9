//! Pattern tables for the text heuristics used by the rules and the query
//! analyzer.
//!
//! Every heuristic is a table of [`PatternSpec`] values compiled into a
//! [`PatternSet`] and evaluated by the same matcher, so tuning or
//! translating a heuristic means editing a table rather than a rule.

use std::sync::LazyLock;

use regex::Regex;

use crate::{AuditError, Result};

/// One entry of a pattern table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternSpec {
    /// Regular expression, in `regex` crate syntax.
    pub pattern: &'static str,
    /// Relative strength of the signal; higher wins in [`PatternSet::best_match`].
    pub weight: f64,
    /// Short human-readable name used in evidence.
    pub label: &'static str,
}

impl PatternSpec {
    pub const fn new(pattern: &'static str, weight: f64, label: &'static str) -> Self {
        Self { pattern, weight, label }
    }
}

/// A successful match of one table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub label: &'static str,
    pub weight: f64,
    /// The literal substring that matched.
    pub matched: String,
}

/// A compiled pattern table.
#[derive(Debug, Clone)]
pub struct PatternSet {
    entries: Vec<(Regex, PatternSpec)>,
}

impl PatternSet {
    /// Compiles a table.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidConfig`] naming the first entry whose
    /// pattern does not compile.
    pub fn new(specs: &[PatternSpec]) -> Result<Self> {
        let entries = specs
            .iter()
            .map(|spec| {
                Regex::new(spec.pattern)
                    .map(|re| (re, *spec))
                    .map_err(|e| AuditError::InvalidConfig(format!("pattern '{}': {}", spec.label, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// True when any entry matches.
    pub fn is_match(&self, text: &str) -> bool {
        self.entries.iter().any(|(re, _)| re.is_match(text))
    }

    /// The highest-weight matching entry; ties go to the earlier entry.
    pub fn best_match(&self, text: &str) -> Option<PatternMatch> {
        let mut best: Option<PatternMatch> = None;
        for (re, spec) in &self.entries {
            let Some(m) = re.find(text) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| spec.weight > b.weight) {
                best = Some(PatternMatch { label: spec.label, weight: spec.weight, matched: m.as_str().to_string() });
            }
        }
        best
    }

    /// The first match of every entry that matches, in table order.
    pub fn matches(&self, text: &str) -> Vec<PatternMatch> {
        self.entries
            .iter()
            .filter_map(|(re, spec)| {
                re.find(text)
                    .map(|m| PatternMatch { label: spec.label, weight: spec.weight, matched: m.as_str().to_string() })
            })
            .collect()
    }

    /// Labels of the matching entries, deduplicated, in table order.
    pub fn labels_matched(&self, text: &str) -> Vec<&'static str> {
        let mut labels = Vec::new();
        for (re, spec) in &self.entries {
            if re.is_match(text) && !labels.contains(&spec.label) {
                labels.push(spec.label);
            }
        }
        labels
    }

    /// Total number of non-overlapping matches summed over all entries.
    pub fn count_matches(&self, text: &str) -> usize {
        self.entries.iter().map(|(re, _)| re.find_iter(text).count()).sum()
    }

    /// The first capture group of the first entry that matches.
    pub fn first_capture(&self, text: &str) -> Option<String> {
        self.entries
            .iter()
            .find_map(|(re, _)| re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str().to_string()))
    }
}

/// Sentences that define something.
pub const DEFINITIONAL_SENTENCE: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\bdefined as\b", 1.0, "defined as"),
    PatternSpec::new(r"(?i)\brefers? to\b", 1.0, "refers to"),
    PatternSpec::new(r"(?i)\bmeans\b", 0.9, "means"),
    PatternSpec::new(r"(?i)\bin short\b", 0.7, "in short"),
    PatternSpec::new(r"(?i)\bsimply put\b", 0.7, "simply put"),
    PatternSpec::new(r"(?i)\bessentially\b", 0.6, "essentially"),
    PatternSpec::new(r"(?i)\b(?:is|are)\b", 0.5, "is/are"),
];

/// Explicit definition phrasing, stricter than [`DEFINITIONAL_SENTENCE`].
pub const DEFINITIONAL_PHRASE: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\bis defined as\b", 1.0, "is defined as"),
    PatternSpec::new(r"(?i)\brefers to\b", 1.0, "refers to"),
    PatternSpec::new(r"(?i)\bmeans that\b", 1.0, "means that"),
    PatternSpec::new(r"(?i)\bin other words\b", 1.0, "in other words"),
];

/// Site chrome that disqualifies a sentence from being a definition.
pub const BOILERPLATE: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\bcookies?\b", 1.0, "cookie"),
    PatternSpec::new(r"(?i)\bprivacy\b", 1.0, "privacy"),
    PatternSpec::new(r"(?i)\b(?:un)?subscribe\b", 1.0, "subscribe"),
    PatternSpec::new(r"(?i)\bnewsletter\b", 1.0, "newsletter"),
    PatternSpec::new(r"(?i)\blog ?in\b", 1.0, "login"),
    PatternSpec::new(r"(?i)\bsign (?:in|up)\b", 1.0, "sign in"),
    PatternSpec::new(r"(?i)\bterms of (?:service|use)\b", 1.0, "terms of service"),
    PatternSpec::new(r"(?i)\ball rights reserved\b", 1.0, "all rights reserved"),
    PatternSpec::new(r"(?i)\bcopyright\b|©", 1.0, "copyright"),
];

/// Ordered-step language.
pub const STEP_MARKERS: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\bstep\s+\d+", 1.0, "step N"),
    PatternSpec::new(r"(?i)\bfirst,", 0.8, "first,"),
    PatternSpec::new(r"(?i)\bsecond,", 0.8, "second,"),
    PatternSpec::new(r"(?i)\bthird,", 0.8, "third,"),
    PatternSpec::new(r"(?i)\bnext,", 0.6, "next,"),
    PatternSpec::new(r"(?i)\bfinally,", 0.6, "finally,"),
    PatternSpec::new(r"(?i)\bthen,", 0.5, "then,"),
];

/// Headings phrased as questions.
pub const QUESTION_HEADING: &[PatternSpec] = &[
    PatternSpec::new(
        r"(?i)^\s*(?:what|how|why|when|where|can|should|does|do|is|are|will|which)\b",
        1.0,
        "question word",
    ),
    PatternSpec::new(r"\?\s*$", 1.0, "question mark"),
];

/// Headings introducing references or further reading.
pub const REFERENCE_HEADINGS: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\bsources?\b", 1.0, "sources"),
    PatternSpec::new(r"(?i)\breferences?\b", 1.0, "references"),
    PatternSpec::new(r"(?i)\bcitations?\b", 1.0, "citations"),
    PatternSpec::new(r"(?i)\bbibliography\b", 1.0, "bibliography"),
    PatternSpec::new(r"(?i)\bfurther reading\b", 1.0, "further reading"),
    PatternSpec::new(r"(?i)\brelated resources\b", 1.0, "related resources"),
    PatternSpec::new(r"(?i)\blearn more\b", 1.0, "learn more"),
    PatternSpec::new(r"(?i)\badditional resources\b", 1.0, "additional resources"),
];

/// Words pointing at pages that establish who stands behind the content.
pub const TRUST_SIGNALS: &[PatternSpec] = &[
    PatternSpec::new(r"(?i)\babout\b", 1.0, "about"),
    PatternSpec::new(r"(?i)\bcontact\b", 1.0, "contact"),
    PatternSpec::new(r"(?i)\beditorial\b", 1.0, "editorial"),
    PatternSpec::new(r"(?i)\bprivacy\b", 1.0, "privacy"),
    PatternSpec::new(r"(?i)\bterms\b", 1.0, "terms"),
    PatternSpec::new(r"(?i)\bteam\b", 1.0, "team"),
    PatternSpec::new(r"(?i)\bcompany\b", 1.0, "company"),
];

/// Visible "last updated" style dates.
pub const VISIBLE_DATE: &[PatternSpec] = &[PatternSpec::new(
    r"(?i)\b(?:last\s+updated|updated|last\s+modified|modified|published|posted)(?:\s+on)?:?\s+(?:[a-z]{3,9}\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}|\d{1,2}\s+[a-z]{3,9}\.?,?\s+\d{4}|\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{2,4})",
    1.0,
    "visible date",
)];

/// "By Firstname Lastname" bylines. Case-sensitive on the name.
pub const BYLINE: &[PatternSpec] = &[PatternSpec::new(
    r"\b[Bb]y:?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+){1,2})\b",
    1.0,
    "byline",
)];

fn compile(specs: &[PatternSpec]) -> PatternSet {
    PatternSet::new(specs).expect("built-in pattern table must compile")
}

pub static DEFINITIONAL_SENTENCE_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(DEFINITIONAL_SENTENCE));
pub static DEFINITIONAL_PHRASE_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(DEFINITIONAL_PHRASE));
pub static BOILERPLATE_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(BOILERPLATE));
pub static STEP_MARKER_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(STEP_MARKERS));
pub static QUESTION_HEADING_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(QUESTION_HEADING));
pub static REFERENCE_HEADING_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(REFERENCE_HEADINGS));
pub static TRUST_SIGNAL_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(TRUST_SIGNALS));
pub static VISIBLE_DATE_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(VISIBLE_DATE));
pub static BYLINE_SET: LazyLock<PatternSet> = LazyLock::new(|| compile(BYLINE));

/// A definitional sentence free of boilerplate terms.
pub fn definitional_match(sentence: &str) -> Option<PatternMatch> {
    if BOILERPLATE_SET.is_match(sentence) {
        return None;
    }
    DEFINITIONAL_SENTENCE_SET.best_match(sentence)
}
