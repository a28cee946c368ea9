//! Module A: can an answer engine lift a direct answer from the page?

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig, excerpt};
use crate::extract::PageExtraction;
use crate::patterns::{QUESTION_HEADING_SET, definitional_match};
use crate::text::{count_words, first_words, format_percent, split_content_sentences};

pub const A1: RuleSpec = RuleSpec {
    id: "A1",
    module: RuleModule::A,
    title: "Early definition",
    why_it_matters: "Answer engines quote short definitional sentences found near the top of a page.",
    max_points: 10,
    recommendation: "Open with a sentence of 30 words or fewer that defines the topic, e.g. \"X is ...\".",
};

pub const A2: RuleSpec = RuleSpec {
    id: "A2",
    module: RuleModule::A,
    title: "Question headings",
    why_it_matters: "Headings phrased as questions map directly onto the queries users ask.",
    max_points: 5,
    recommendation: "Phrase several H2/H3 headings as the questions your readers ask.",
};

pub const A3: RuleSpec = RuleSpec {
    id: "A3",
    module: RuleModule::A,
    title: "Lists or tables",
    why_it_matters: "Lists and tables are easy to extract as self-contained answers.",
    max_points: 5,
    recommendation: "Present steps, options or comparisons as a list or table.",
};

pub const A4: RuleSpec = RuleSpec {
    id: "A4",
    module: RuleModule::A,
    title: "Readable prose",
    why_it_matters: "Short sentences and low link density make passages quotable on their own.",
    max_points: 5,
    recommendation: "Keep sentences under 25 words on average and link density under 25%.",
};

const A4_PARTIAL: u32 = 2;
const A2_POINTS_PER_HEADING: f64 = 1.25;

pub fn evaluate(page: &PageExtraction, config: &ScoringConfig) -> Vec<RuleResult> {
    vec![
        early_definition(page, config),
        question_headings(page),
        lists_or_tables(page),
        readable_prose(page, config),
    ]
}

fn early_definition(page: &PageExtraction, config: &ScoringConfig) -> RuleResult {
    let window = first_words(&page.main_text, config.definition_window_words);
    let headings: Vec<&str> = page.headings.iter().map(|h| h.text.as_str()).collect();
    let found = split_content_sentences(&window, &headings, config.min_sentence_chars)
        .into_iter()
        .filter(|s| count_words(s) <= config.max_definition_words)
        .find_map(|s| definitional_match(&s).map(|m| (s, m)));

    match found {
        Some((sentence, m)) => A1
            .pass(format!("Definitional sentence: \"{}\"", excerpt(&sentence, 200)))
            .with_evidence(format!("Matched \"{}\" ({})", m.matched, m.label)),
        None => A1.fail(format!(
            "No sentence of {} words or fewer in the first {} words matches a definitional pattern",
            config.max_definition_words, config.definition_window_words
        )),
    }
}

fn question_headings(page: &PageExtraction) -> RuleResult {
    let questions: Vec<&str> = page
        .headings
        .iter()
        .filter(|h| matches!(h.level, 2 | 3))
        .filter(|h| QUESTION_HEADING_SET.is_match(&h.text))
        .map(|h| h.text.as_str())
        .collect();

    let count = questions.len();
    let points = ((count as f64 * A2_POINTS_PER_HEADING).round() as u32).min(A2.max_points);
    let summary = format!("{} question-style H2/H3 headings", count);
    let examples = questions.iter().take(3).map(|q| format!("\"{}\"", excerpt(q, 120)));

    if count == 0 {
        A2.fail(summary)
    } else if points >= A2.max_points {
        A2.pass(summary).with_all_evidence(examples)
    } else {
        A2.warn(points, summary).with_all_evidence(examples)
    }
}

fn lists_or_tables(page: &PageExtraction) -> RuleResult {
    let evidence = format!("{} lists and {} tables in the main content", page.lists_count, page.tables_count);
    if page.lists_count + page.tables_count >= 1 { A3.pass(evidence) } else { A3.fail(evidence) }
}

fn readable_prose(page: &PageExtraction, config: &ScoringConfig) -> RuleResult {
    let stats = &page.sentence_stats;
    let short_sentences = stats.count >= 1 && stats.avg_length < config.max_avg_sentence_words;
    let low_density = page.link_density < config.max_link_density;

    let sentences = if stats.count == 0 {
        "No sentences measured in the main content".to_string()
    } else {
        format!("Average sentence length {:.1} words across {} sentences", stats.avg_length, stats.count)
    };
    let density = format!("Link density {}", format_percent(page.link_density));

    let result = match (short_sentences, low_density) {
        (true, true) => A4.pass(sentences),
        (false, false) => A4.fail(sentences),
        _ => A4.warn(A4_PARTIAL, sentences),
    };
    result.with_evidence(density)
}
