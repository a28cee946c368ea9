//! Module E: can a crawler index the page and read its content without
//! running JavaScript?

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig, excerpt};
use crate::extract::PageExtraction;

pub const E1: RuleSpec = RuleSpec {
    id: "E1",
    module: RuleModule::E,
    title: "Indexable",
    why_it_matters: "Pages marked noindex are dropped from the indexes answer engines retrieve from.",
    max_points: 5,
    recommendation: "Remove noindex from the robots meta tag and X-Robots-Tag header.",
};

pub const E2: RuleSpec = RuleSpec {
    id: "E2",
    module: RuleModule::E,
    title: "Canonical URL",
    why_it_matters: "A canonical link consolidates signals onto one URL.",
    max_points: 3,
    recommendation: "Add <link rel=\"canonical\" href=\"...\"> pointing at the preferred URL.",
};

pub const E3: RuleSpec = RuleSpec {
    id: "E3",
    module: RuleModule::E,
    title: "Server-rendered content",
    why_it_matters: "Many crawlers do not execute JavaScript and only see the server response.",
    max_points: 2,
    recommendation: "Render the main content on the server so it is present in the initial HTML.",
};

const E3_JS_SHELL_PENALTY: u32 = 1;

pub fn evaluate(page: &PageExtraction, config: &ScoringConfig) -> Vec<RuleResult> {
    vec![indexable(page), canonical(page), server_rendered(page, config)]
}

fn indexable(page: &PageExtraction) -> RuleResult {
    match page.robots_meta.as_deref() {
        Some(robots) if robots.to_ascii_lowercase().contains("noindex") => {
            E1.fail(format!("Robots directives: \"{}\"", robots))
        }
        Some(robots) => E1.pass(format!("Robots directives: \"{}\"", robots)),
        None => E1.pass("No robots directives; page is indexable"),
    }
}

fn canonical(page: &PageExtraction) -> RuleResult {
    match page.canonical.as_deref() {
        Some(href) => E2.pass(format!("Canonical: {}", excerpt(href, 200))),
        None => E2.fail("No canonical link"),
    }
}

fn server_rendered(page: &PageExtraction, config: &ScoringConfig) -> RuleResult {
    let enough_words = page.word_count >= config.min_server_words;
    let words = if enough_words {
        format!("{} words in server response", page.word_count)
    } else {
        format!("Only {} words in server response", page.word_count)
    };
    let shell = page
        .is_js_shell
        .then(|| format!("Looks like a JavaScript shell: {} script tags", page.script_count));

    let base = if enough_words { E3.max_points } else { 0 };
    let earned = if page.is_js_shell { base.saturating_sub(E3_JS_SHELL_PENALTY) } else { base };

    let result = if earned == E3.max_points {
        E3.pass(words)
    } else if earned < base {
        E3.warn(earned, words)
    } else {
        E3.fail(words)
    };
    result.with_all_evidence(shell)
}
