//! Module B: is it clear which entity the page is about and who publishes it?

use std::collections::{BTreeMap, BTreeSet};

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig, excerpt};
use crate::extract::PageExtraction;
use crate::metadata::{node_str, node_types};
use crate::text::{format_percent, jaccard, token_set, tokenize};

pub const B1: RuleSpec = RuleSpec {
    id: "B1",
    module: RuleModule::B,
    title: "Single H1",
    why_it_matters: "One H1 tells answer engines what the page is primarily about.",
    max_points: 5,
    recommendation: "Use exactly one H1 that names the page's main entity or topic.",
};

pub const B2: RuleSpec = RuleSpec {
    id: "B2",
    module: RuleModule::B,
    title: "Title matches H1",
    why_it_matters: "A title and H1 that agree reinforce the page's primary entity.",
    max_points: 5,
    recommendation: "Reuse the key terms of the H1 in the <title>.",
};

pub const B3: RuleSpec = RuleSpec {
    id: "B3",
    module: RuleModule::B,
    title: "Brand identified",
    why_it_matters: "Answer engines attribute citations to a named publisher.",
    max_points: 5,
    recommendation: "Add Organization schema with a name, or end the title with \"| Brand\".",
};

pub const B4: RuleSpec = RuleSpec {
    id: "B4",
    module: RuleModule::B,
    title: "Consistent naming",
    why_it_matters: "The same name appearing in title, H1 and schema confirms the entity.",
    max_points: 5,
    recommendation: "Use the same brand or entity name in the title, the H1 and schema markup.",
};

const B1_MULTIPLE_H1: u32 = 3;
const B2_PARTIAL: u32 = 2;
const MIN_SHARED_TOKEN_CHARS: usize = 3;

/// Schema types whose `name` identifies the publisher.
const BRAND_TYPES: &[&str] = &["Organization", "LocalBusiness", "Corporation", "Person"];

/// Title separators, checked in order after a pipe.
const TITLE_SEPARATORS: &[&str] = &[" – ", " — ", " - "];

pub fn evaluate(page: &PageExtraction, config: &ScoringConfig) -> Vec<RuleResult> {
    vec![single_h1(page), title_matches_h1(page, config), brand_identified(page), consistent_naming(page)]
}

/// The part of a title after its last `|`, or after the last spaced dash.
pub fn title_suffix(title: &str) -> Option<String> {
    let suffix = match title.rfind('|') {
        Some(idx) => &title[idx + 1..],
        None => {
            let (idx, sep) = TITLE_SEPARATORS
                .iter()
                .filter_map(|sep| title.rfind(sep).map(|idx| (idx, *sep)))
                .max_by_key(|(idx, _)| *idx)?;
            &title[idx + sep.len()..]
        }
    };
    let suffix = suffix.trim();
    (!suffix.is_empty()).then(|| suffix.to_string())
}

/// `(type, name)` for every schema node of a brand type that has a name.
fn brand_names(page: &PageExtraction) -> Vec<(String, String)> {
    page.json_ld
        .iter()
        .flat_map(|block| block.nodes())
        .filter_map(|node| {
            let kind = node_types(node).into_iter().find(|t| BRAND_TYPES.contains(t))?;
            node_str(node, "name").map(|name| (kind.to_string(), name.to_string()))
        })
        .collect()
}

/// The `name` of every schema node, whatever its type.
fn schema_names(page: &PageExtraction) -> Vec<String> {
    page.json_ld
        .iter()
        .flat_map(|block| block.nodes())
        .filter_map(|node| node_str(node, "name").map(str::to_string))
        .collect()
}

fn single_h1(page: &PageExtraction) -> RuleResult {
    let count = page.h1_count();
    let summary = format!("{} H1 headings found", count);
    let first = page.h1.as_deref().map(|h1| format!("H1: \"{}\"", excerpt(h1, 120)));

    let result = match count {
        0 => return B1.fail(summary),
        1 => B1.pass(summary),
        _ => B1.warn(B1_MULTIPLE_H1, summary),
    };
    result.with_all_evidence(first)
}

fn title_matches_h1(page: &PageExtraction, config: &ScoringConfig) -> RuleResult {
    let (Some(title), Some(h1)) = (page.title.as_deref(), page.h1.as_deref()) else {
        let missing = match (&page.title, &page.h1) {
            (None, None) => "No title and no H1",
            (None, _) => "No title",
            _ => "No H1",
        };
        return B2.fail(missing);
    };

    let overlap = jaccard(&token_set(title), &token_set(h1));
    let summary = format!("Title/H1 token overlap {}", format_percent(overlap));

    let result = if overlap >= config.title_h1_pass {
        B2.pass(summary)
    } else if overlap >= config.title_h1_partial {
        B2.warn(B2_PARTIAL, summary)
    } else {
        B2.fail(summary)
    };
    result
        .with_evidence(format!("Title: \"{}\"", excerpt(title, 120)))
        .with_evidence(format!("H1: \"{}\"", excerpt(h1, 120)))
}

fn brand_identified(page: &PageExtraction) -> RuleResult {
    if let Some((kind, name)) = brand_names(page).into_iter().next() {
        return B3.pass(format!("Brand \"{}\" from {} schema", name, kind));
    }
    if let Some(suffix) = page.title.as_deref().and_then(title_suffix) {
        return B3.pass(format!("Brand \"{}\" from title suffix", suffix));
    }
    B3.fail("No Organization, LocalBusiness, Corporation or Person schema name and no title suffix")
}

fn consistent_naming(page: &PageExtraction) -> RuleResult {
    let mut sources: Vec<(&str, BTreeSet<String>)> = Vec::new();
    if let Some(suffix) = page.title.as_deref().and_then(title_suffix) {
        sources.push(("title suffix", significant_tokens(&suffix)));
    }
    if let Some(h1) = &page.h1 {
        sources.push(("H1", significant_tokens(h1)));
    }
    let names = schema_names(page);
    if !names.is_empty() {
        sources.push(("schema name", significant_tokens(&names.join(" "))));
    }

    let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (label, tokens) in &sources {
        for token in tokens {
            seen.entry(token.as_str()).or_default().push(*label);
        }
    }

    match seen.iter().find(|(_, labels)| labels.len() >= 2) {
        Some((token, labels)) => B4.pass(format!("\"{}\" appears in {}", token, labels.join(" and "))),
        None => {
            let checked: Vec<&str> = sources.iter().map(|(label, _)| *label).collect();
            let checked = if checked.is_empty() { "nothing".to_string() } else { checked.join(", ") };
            B4.fail(format!("No word of 3+ characters shared by two sources (checked: {})", checked))
        }
    }
}

fn significant_tokens(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().filter(|t| t.chars().count() >= MIN_SHARED_TOKEN_CHARS).collect()
}
