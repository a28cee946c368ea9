//! Query-fit analysis.
//!
//! Given a free-text query and a [`PageExtraction`], measures how well the
//! page's title, headings and opening content cover the query, drafts a short
//! answer from the page's own sentences and suggests FAQ questions.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use aeo_audit_core::{QueryIntent, analyze_query, extract};
//!
//! let html = "<html><head><title>AEO guide</title></head><body><article>\
//!     <h1>AEO explained</h1><p>AEO is the practice of optimizing content for AI citation.</p>\
//!     </article></body></html>";
//! let page = extract(html, &HashMap::new(), "https://example.com/aeo");
//! let analysis = analyze_query("What is AEO?", &page);
//!
//! assert_eq!(analysis.query_intent, QueryIntent::What);
//! assert_eq!(analysis.topic, "AEO");
//! assert!(analysis.answer_draft.unwrap().contains("AEO is the practice"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::extract::PageExtraction;
use crate::patterns::{STEP_MARKER_SET, definitional_match};
use crate::text::{
    MIN_SENTENCE_CHARS, count_words, normalize_whitespace, overlap_ratio, split_content_sentences, token_set,
};

static LEADING_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:what\s+(?:is|are)|how\s+(?:to|do|does)|why\s+(?:is|do)|(?:when|where)\s+is|can\s+you|should\s+i|does|do|is|are)\b\s*",
    )
    .expect("leading question regex")
});

const TITLE_WEIGHT: f64 = 0.30;
const HEADINGS_WEIGHT: f64 = 0.30;
const CONTENT_WEIGHT: f64 = 0.40;
const MISSING_STRUCTURE_PENALTY: i64 = 15;
const MAX_FAQS: usize = 10;

/// Thresholds for query analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// Sentences of this many characters or fewer are ignored
    pub min_sentence_chars: usize,
    /// Longest definitional sentence, in words, that can open the answer draft
    pub max_answer_words: usize,
    /// Longest follow-up sentence, in words, in the answer draft
    pub max_follow_up_words: usize,
    /// Query token overlap a definition must exceed to be preferred
    pub min_answer_overlap: f64,
    /// Coverage ratio below which the title or opening content is reported missing
    pub min_coverage: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            min_sentence_chars: MIN_SENTENCE_CHARS,
            max_answer_words: 35,
            max_follow_up_words: 40,
            min_answer_overlap: 0.2,
            min_coverage: 0.5,
        }
    }
}

/// What kind of answer the query is after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    What,
    How,
    Why,
    When,
    Where,
    Other,
}

impl QueryIntent {
    const QUESTION_WORDS: [(&'static str, QueryIntent); 5] = [
        ("what", QueryIntent::What),
        ("how", QueryIntent::How),
        ("why", QueryIntent::Why),
        ("when", QueryIntent::When),
        ("where", QueryIntent::Where),
    ];

    /// Detects intent from a leading question word, then from a question
    /// word anywhere in the query.
    pub fn detect(query: &str) -> Self {
        let lowered = query.trim().to_lowercase();
        let words: Vec<&str> = lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();

        if let Some(first) = words.first()
            && let Some((_, intent)) = Self::QUESTION_WORDS.iter().find(|(word, _)| word == first)
        {
            return *intent;
        }

        Self::QUESTION_WORDS
            .iter()
            .find(|(word, _)| words.contains(word))
            .map(|(_, intent)| *intent)
            .unwrap_or(QueryIntent::Other)
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryIntent::What => "what",
            QueryIntent::How => "how",
            QueryIntent::Why => "why",
            QueryIntent::When => "when",
            QueryIntent::Where => "where",
            QueryIntent::Other => "other",
        };
        f.write_str(label)
    }
}

/// Share of query terms found in each part of the page, 0 to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub title_match: u32,
    pub headings_match: u32,
    pub content_match: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnalysis {
    pub query: String,
    pub topic: String,
    pub query_intent: QueryIntent,
    pub query_fit_score: u32,
    pub coverage: Coverage,
    pub answer_draft: Option<String>,
    pub suggested_faqs: Vec<String>,
    pub missing_elements: Vec<String>,
}

/// FAQ templates: leading question word and text with a `{topic}` slot.
const FAQ_TEMPLATES: &[(&str, &str)] = &[
    ("what", "What is {topic}?"),
    ("how", "How does {topic} work?"),
    ("why", "Why is {topic} important?"),
    ("how", "How do you use {topic}?"),
    ("what", "What are the benefits of {topic}?"),
    ("what", "What are common mistakes with {topic}?"),
    ("what", "What are the best practices for {topic}?"),
    ("how", "How much does {topic} cost?"),
    ("how", "How long does {topic} take?"),
    ("what", "What do you need to get started with {topic}?"),
];

const HOW_TEMPLATES: &[(&str, &str)] =
    &[("what", "What are the steps to {topic}?"), ("what", "What are the best tips for {topic}?")];

const WHAT_TEMPLATES: &[(&str, &str)] =
    &[("what", "What are the different types of {topic}?"), ("what", "What are some examples of {topic}?")];

/// Strips a leading question phrase and trailing question marks.
pub fn extract_topic(query: &str) -> String {
    let stripped = LEADING_QUESTION.replace(query, "");
    normalize_whitespace(stripped.trim().trim_end_matches('?'))
}

/// Analyze how well `page` answers `query`.
pub fn analyze_query(query: &str, page: &PageExtraction) -> QueryAnalysis {
    analyze_query_with_config(query, page, &QueryConfig::default())
}

/// Analyze how well `page` answers `query` with custom thresholds.
pub fn analyze_query_with_config(query: &str, page: &PageExtraction, config: &QueryConfig) -> QueryAnalysis {
    let query_intent = QueryIntent::detect(query);
    let topic = extract_topic(query);
    let query_tokens = token_set(query);

    let title_tokens = token_set(&format!(
        "{} {}",
        page.title.as_deref().unwrap_or_default(),
        page.h1.as_deref().unwrap_or_default()
    ));
    let heading_tokens: BTreeSet<String> = page.headings.iter().flat_map(|h| token_set(&h.text)).collect();
    let content_tokens = token_set(&page.top_text);

    let title_ratio = overlap_ratio(&query_tokens, &title_tokens);
    let headings_ratio = overlap_ratio(&query_tokens, &heading_tokens);
    let content_ratio = overlap_ratio(&query_tokens, &content_tokens);

    let coverage = Coverage {
        title_match: as_percent(title_ratio),
        headings_match: as_percent(headings_ratio),
        content_match: as_percent(content_ratio),
    };

    let heading_texts: Vec<&str> = page.headings.iter().map(|h| h.text.as_str()).collect();
    let sentences = split_content_sentences(&page.top_text, &heading_texts, config.min_sentence_chars);
    let has_steps = page.lists_count > 0 || STEP_MARKER_SET.is_match(&page.main_text);
    let has_definition = sentences.iter().any(|s| {
        definitional_match(s).is_some() && !token_set(s).is_disjoint(&query_tokens)
    });

    let mut score =
        ((title_ratio * TITLE_WEIGHT + headings_ratio * HEADINGS_WEIGHT + content_ratio * CONTENT_WEIGHT) * 100.0)
            .round() as i64;
    if query_intent == QueryIntent::How && !has_steps {
        score -= MISSING_STRUCTURE_PENALTY;
    }
    if query_intent == QueryIntent::What && !has_definition {
        score -= MISSING_STRUCTURE_PENALTY;
    }
    let query_fit_score = score.clamp(0, 100) as u32;

    let answer_draft = draft_answer(&sentences, &query_tokens, config);
    let suggested_faqs = suggest_faqs(&topic, query_intent, page);

    let mut missing_elements = Vec::new();
    if title_ratio < config.min_coverage {
        let missing: Vec<&str> = query_tokens.difference(&title_tokens).map(String::as_str).collect();
        missing_elements.push(if missing.is_empty() {
            "Title and H1 do not contain the query terms".to_string()
        } else {
            format!("Title and H1 are missing query terms: {}", missing.join(", "))
        });
    }
    if headings_ratio == 0.0 {
        missing_elements.push("No heading addresses the query".to_string());
    }
    if content_ratio < config.min_coverage {
        missing_elements.push(format!("Opening content covers only {}% of the query terms", coverage.content_match));
    }
    if query_intent == QueryIntent::How && !has_steps {
        missing_elements.push("No ordered steps (list or step language) for a how-to query".to_string());
    }
    if query_intent == QueryIntent::What && !has_definition {
        missing_elements.push("No definition sentence mentioning the query terms".to_string());
    }
    if answer_draft.is_none() {
        missing_elements.push("No extractable answer sentence".to_string());
    }

    tracing::debug!(
        intent = %query_intent,
        topic = %topic,
        score = query_fit_score,
        "analyzed query"
    );

    QueryAnalysis {
        query: query.to_string(),
        topic,
        query_intent,
        query_fit_score,
        coverage,
        answer_draft,
        suggested_faqs,
        missing_elements,
    }
}

fn as_percent(ratio: f64) -> u32 {
    (ratio * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Two-sentence answer built from the page's own sentences.
///
/// Sentences are joined with `". "`; the last one carries no terminator.
fn draft_answer(sentences: &[String], query_tokens: &BTreeSet<String>, config: &QueryConfig) -> Option<String> {
    let short_definition =
        |s: &String| count_words(s) <= config.max_answer_words && definitional_match(s).is_some();

    let first_idx = sentences
        .iter()
        .position(|s| short_definition(s) && overlap_ratio(query_tokens, &token_set(s)) > config.min_answer_overlap)
        .or_else(|| sentences.iter().position(short_definition))
        .or_else(|| (!sentences.is_empty()).then_some(0))?;
    let first = &sentences[first_idx];

    let follows = |s: &String| {
        count_words(s) <= config.max_follow_up_words
            && (!token_set(s).is_disjoint(query_tokens)
                || s.chars().any(|c| c.is_ascii_digit())
                || STEP_MARKER_SET.is_match(s))
    };
    let second = sentences
        .iter()
        .skip(first_idx + 1)
        .find(|&s| s != first && follows(s))
        .or_else(|| sentences.get(1).filter(|s| *s != first));

    let draft = match second {
        Some(second) => format!("{}. {}", first, second),
        None => first.clone(),
    };
    Some(normalize_whitespace(&draft))
}

fn suggest_faqs(topic: &str, intent: QueryIntent, page: &PageExtraction) -> Vec<String> {
    let Some(topic_word) = topic.split_whitespace().next().map(str::to_lowercase) else {
        return Vec::new();
    };
    let headings: Vec<Vec<String>> = page
        .headings
        .iter()
        .map(|h| {
            h.text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect()
        })
        .collect();
    let already_asked = |question_word: &str| {
        headings
            .iter()
            .any(|words| words.iter().any(|w| *w == topic_word) && words.iter().any(|w| w == question_word))
    };

    let extras = match intent {
        QueryIntent::How => HOW_TEMPLATES,
        QueryIntent::What => WHAT_TEMPLATES,
        _ => &[],
    };

    FAQ_TEMPLATES
        .iter()
        .chain(extras)
        .filter(|&&(question_word, _)| !already_asked(question_word))
        .map(|(_, template)| template.replace("{topic}", topic))
        .take(MAX_FAQS)
        .collect()
}
