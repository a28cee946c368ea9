//! Shared text utilities: whitespace handling, sentence splitting,
//! tokenization, set overlap and letter grades.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Common English words ignored when comparing token sets.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be", "been", "being", "but",
    "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "here", "his", "how",
    "if", "in", "into", "is", "it", "its", "just", "may", "me", "might", "more", "most", "must", "my", "no", "not",
    "of", "on", "or", "our", "out", "over", "shall", "she", "should", "so", "some", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "those", "to", "too", "up", "very", "was", "we", "were", "what",
    "when", "where", "which", "who", "why", "will", "with", "would", "you", "your",
];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence boundary regex"));

static NUMERIC_MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[$€£]\s?\d[\d,]*(?:\.\d+)?|\b\d[\d,]*(?:\.\d+)?\s?(?:%|percent\b|million\b|billion\b|thousand\b|trillion\b)|\b\d{1,3}(?:,\d{3})+\b|\b\d+\.\d+\b",
    )
    .expect("numeric mention regex")
});

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Counts whitespace-delimited words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Returns the first `limit` whitespace-delimited words joined by single spaces.
pub fn first_words(text: &str, limit: usize) -> String {
    text.split_whitespace().take(limit).collect::<Vec<_>>().join(" ")
}

/// Default cutoff: sentences of this many characters or fewer are ignored.
pub const MIN_SENTENCE_CHARS: usize = 10;

/// Splits text into sentences on runs of `.`, `!` or `?` followed by
/// whitespace or the end of the text.
///
/// Terminators are dropped. Sentences of `min_chars` characters or fewer are
/// discarded.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<String> {
    SENTENCE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|s| s.chars().count() > min_chars)
        .map(str::to_string)
        .collect()
}

/// Splits text into sentences like [`split_sentences`], first removing any
/// heading text that opens a sentence.
///
/// Headings rarely end with a terminator, so block-aware extraction merges
/// them into the sentence that follows ("What is AEO AEO is the practice").
/// A sentence made up only of headings is dropped.
pub fn split_content_sentences<S: AsRef<str>>(text: &str, headings: &[S], min_chars: usize) -> Vec<String> {
    let labels: Vec<&str> = headings
        .iter()
        .map(|h| h.as_ref().trim().trim_end_matches(['.', '!', '?']).trim_end())
        .filter(|h| !h.is_empty())
        .collect();

    split_sentences(text, 0)
        .into_iter()
        .map(|sentence| strip_heading_prefix(&sentence, &labels).to_string())
        .filter(|s| s.chars().count() > min_chars)
        .collect()
}

fn strip_heading_prefix<'a>(sentence: &'a str, labels: &[&str]) -> &'a str {
    let mut rest = sentence.trim();
    loop {
        let stripped = labels.iter().find_map(|label| {
            let after = rest.strip_prefix(label)?;
            (after.is_empty() || after.starts_with(char::is_whitespace)).then_some(after.trim_start())
        });
        match stripped {
            Some(stripped) => rest = stripped,
            None => return rest,
        }
    }
}

/// Returns true for words in the fixed stopword list.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

/// Lowercases, strips punctuation, drops one-character tokens and stopwords.
///
/// Token order follows the input; duplicates are kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .filter(|t| !is_stopword(t))
        .map(str::to_string)
        .collect()
}

/// Tokenizes text into a deduplicated, ordered set.
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`, 0 when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Share of `query` tokens present in `other`, 0 when `query` is empty.
pub fn overlap_ratio(query: &BTreeSet<String>, other: &BTreeSet<String>) -> f64 {
    if query.is_empty() {
        return 0.0;
    }
    query.intersection(other).count() as f64 / query.len() as f64
}

/// Counts numeric and statistic mentions: percentages, currency amounts,
/// magnitudes, thousands-separated and decimal numbers.
pub fn count_numeric_mentions(text: &str) -> usize {
    NUMERIC_MENTION.find_iter(text).count()
}

/// The first few numeric mentions, for evidence.
pub fn numeric_mentions(text: &str, limit: usize) -> Vec<String> {
    NUMERIC_MENTION
        .find_iter(text)
        .take(limit)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Formats a ratio as a percentage with one decimal.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Letter grade for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// Maps a percentage to a grade: ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F.
pub fn compute_grade(pct: f64) -> Grade {
    if pct >= 90.0 {
        Grade::A
    } else if pct >= 80.0 {
        Grade::B
    } else if pct >= 70.0 {
        Grade::C
    } else if pct >= 60.0 {
        Grade::D
    } else {
        Grade::F
    }
}
