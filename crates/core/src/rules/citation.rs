//! Module F: is the content shaped the way cited passages usually are?

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig, excerpt};
use crate::extract::PageExtraction;
use crate::patterns::{DEFINITIONAL_PHRASE_SET, REFERENCE_HEADING_SET, STEP_MARKER_SET};
use crate::text::{count_numeric_mentions, numeric_mentions};

pub const F1: RuleSpec = RuleSpec {
    id: "F1",
    module: RuleModule::F,
    title: "Quotable facts",
    why_it_matters: "Statistics, ordered steps and explicit definitions are the passages engines cite.",
    max_points: 5,
    recommendation: "Include concrete numbers, numbered steps, or an explicit \"X is defined as\" sentence.",
};

pub const F2: RuleSpec = RuleSpec {
    id: "F2",
    module: RuleModule::F,
    title: "Sources section",
    why_it_matters: "A references section shows the content is grounded in other work.",
    max_points: 5,
    recommendation: "Add a \"Sources\" or \"References\" section listing what the content relies on.",
};

const MIN_NUMERIC_MENTIONS: usize = 3;
const MIN_STEP_MARKERS: usize = 2;

pub fn evaluate(page: &PageExtraction, _config: &ScoringConfig) -> Vec<RuleResult> {
    vec![quotable_facts(page), sources_section(page)]
}

fn quotable_facts(page: &PageExtraction) -> RuleResult {
    let text = &page.main_text;
    let numbers = count_numeric_mentions(text);
    let steps = STEP_MARKER_SET.count_matches(text);
    let phrase = DEFINITIONAL_PHRASE_SET.best_match(text);

    let mut signals = Vec::new();
    if numbers >= MIN_NUMERIC_MENTIONS {
        signals.push(format!("{} numeric mentions: {}", numbers, numeric_mentions(text, 3).join(", ")));
    }
    if steps >= MIN_STEP_MARKERS {
        let labels = STEP_MARKER_SET.labels_matched(text);
        signals.push(format!("{} step markers: {}", steps, labels.join(", ")));
    }
    if let Some(m) = &phrase {
        signals.push(format!("Definitional phrase \"{}\"", m.matched));
    }

    let mut signals = signals.into_iter();
    match signals.next() {
        Some(first) => F1.pass(first).with_all_evidence(signals),
        None => F1.fail(format!("{} numeric mentions, {} step markers, no definitional phrase", numbers, steps)),
    }
}

fn sources_section(page: &PageExtraction) -> RuleResult {
    let heading = page.headings.iter().find_map(|h| REFERENCE_HEADING_SET.best_match(&h.text).map(|m| (h, m)));
    match heading {
        Some((h, m)) => F2.pass(format!("Heading \"{}\" matches \"{}\"", excerpt(&h.text, 120), m.matched)),
        None => F2.fail(format!("None of {} headings names sources or references", page.headings.len())),
    }
}
