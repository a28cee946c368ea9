//! Module C: does the page show who wrote it, when, and on what evidence?

use serde_json::{Map, Value};

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig, excerpt};
use crate::extract::PageExtraction;
use crate::metadata::node_str;
use crate::patterns::{BYLINE_SET, TRUST_SIGNAL_SET, VISIBLE_DATE_SET};

pub const C1: RuleSpec = RuleSpec {
    id: "C1",
    module: RuleModule::C,
    title: "Author attribution",
    why_it_matters: "Named authors signal accountable, expert content.",
    max_points: 7,
    recommendation: "Add an author to the Article schema and a visible \"By Name\" byline.",
};

pub const C2: RuleSpec = RuleSpec {
    id: "C2",
    module: RuleModule::C,
    title: "Freshness date",
    why_it_matters: "Answer engines prefer content that states when it was published or updated.",
    max_points: 5,
    recommendation: "Add dateModified/datePublished to schema and show a \"Last updated\" date.",
};

pub const C3: RuleSpec = RuleSpec {
    id: "C3",
    module: RuleModule::C,
    title: "Outbound citations",
    why_it_matters: "Links to external sources let readers and engines verify claims.",
    max_points: 5,
    recommendation: "Cite at least two external sources for key claims.",
};

pub const C4: RuleSpec = RuleSpec {
    id: "C4",
    module: RuleModule::C,
    title: "Trust pages",
    why_it_matters: "About, contact and policy references show who stands behind the content.",
    max_points: 3,
    recommendation: "Reference your about, contact, editorial or privacy pages from the content.",
};

const C3_PARTIAL: u32 = 2;
const C4_PARTIAL: u32 = 1;

/// Schema date fields, in order of preference.
const DATE_FIELDS: &[&str] = &["dateModified", "datePublished"];

pub fn evaluate(page: &PageExtraction, _config: &ScoringConfig) -> Vec<RuleResult> {
    vec![author(page), freshness(page), outbound_citations(page), trust_pages(page)]
}

/// Name of an `author` value: a string, an object with `name`, or the first
/// usable entry of an array.
fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.trim().to_string()).filter(|n| !n.is_empty()),
        Value::Object(map) => node_str(map, "name").map(str::to_string),
        Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    }
}

fn schema_nodes(page: &PageExtraction) -> impl Iterator<Item = &Map<String, Value>> {
    page.json_ld.iter().flat_map(|block| block.nodes())
}

fn author(page: &PageExtraction) -> RuleResult {
    if let Some(name) = schema_nodes(page).find_map(|node| node.get("author").and_then(author_name)) {
        return C1.pass(format!("Schema author \"{}\"", name));
    }
    if let Some(name) = BYLINE_SET.first_capture(&page.main_text) {
        return C1.pass(format!("Byline names \"{}\"", name));
    }
    C1.fail("No schema author and no \"By Name\" byline in the main text")
}

fn freshness(page: &PageExtraction) -> RuleResult {
    for field in DATE_FIELDS {
        if let Some(date) = schema_nodes(page).find_map(|node| node_str(node, field)) {
            return C2.pass(format!("Schema {} \"{}\"", field, date));
        }
    }
    if let Some(m) = VISIBLE_DATE_SET.best_match(&page.main_text) {
        return C2.pass(format!("Visible date \"{}\"", m.matched));
    }
    C2.warn(0, "No dateModified or datePublished in schema and no visible update date")
}

fn outbound_citations(page: &PageExtraction) -> RuleResult {
    let count = page.external_links_count;
    let summary = format!("{} external links", count);
    let examples: Vec<String> = page.external_links.iter().take(3).map(|url| excerpt(url, 120)).collect();

    match count {
        0 => C3.fail(summary),
        1 => C3.warn(C3_PARTIAL, summary).with_all_evidence(examples),
        _ => C3.pass(summary).with_all_evidence(examples),
    }
}

fn trust_pages(page: &PageExtraction) -> RuleResult {
    let labels = TRUST_SIGNAL_SET.labels_matched(&page.main_text);
    match labels.len() {
        0 => C4.fail("No about, contact, editorial, privacy, terms, team or company references"),
        1 => C4.warn(C4_PARTIAL, format!("1 trust keyword found: {}", labels[0])),
        n => C4.pass(format!("{} trust keywords found: {}", n, labels.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::JsonLdBlock;
    use crate::rules::RuleStatus;
    use crate::rules::test_support::page;

    #[test]
    fn test_c1_schema_author_forms() {
        let mut p = page();
        for raw in [
            r#"{"@type":"Article","author":"Jane Smith"}"#,
            r#"{"@type":"Article","author":{"@type":"Person","name":"Jane Smith"}}"#,
            r#"{"@type":"Article","author":[{"@type":"Person","name":"Jane Smith"},"Other"]}"#,
        ] {
            p.json_ld = vec![JsonLdBlock::from_raw(raw)];
            let result = author(&p);
            assert_eq!(result.status, RuleStatus::Pass);
            assert_eq!(result.evidence, vec!["Schema author \"Jane Smith\""]);
        }
    }

    #[test]
    fn test_c1_byline_fallback() {
        let mut p = page();
        p.main_text = "Guide to schema. By John Doe. Schema helps.".into();
        assert_eq!(author(&p).evidence, vec!["Byline names \"John Doe\""]);

        p.main_text = "Made by hand in small batches.".into();
        let result = author(&p);
        assert_eq!(result.status, RuleStatus::Fail);
        assert_eq!(result.earned_points, 0);
    }

    #[test]
    fn test_c2_schema_then_visible_then_warn() {
        let mut p = page();
        p.json_ld = vec![JsonLdBlock::from_raw(
            r#"{"@type":"Article","datePublished":"2024-01-01","dateModified":"2024-03-01"}"#,
        )];
        assert_eq!(freshness(&p).evidence, vec!["Schema dateModified \"2024-03-01\""]);

        p.json_ld.clear();
        p.main_text = "Last updated: March 3, 2024. Content follows.".into();
        let result = freshness(&p);
        assert_eq!(result.status, RuleStatus::Pass);
        assert_eq!(result.evidence, vec!["Visible date \"Last updated: March 3, 2024\""]);

        p.main_text.clear();
        let result = freshness(&p);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.earned_points, 0);
    }

    #[test]
    fn test_c3_partial_at_one() {
        let mut p = page();
        assert_eq!(outbound_citations(&p).status, RuleStatus::Fail);

        p.external_links.insert("https://example.org/a".into());
        p.external_links_count = 1;
        let result = outbound_citations(&p);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.earned_points, 2);
        assert_eq!(result.evidence, vec!["1 external links", "https://example.org/a"]);

        p.external_links.insert("https://example.org/b".into());
        p.external_links_count = 2;
        assert_eq!(outbound_citations(&p).earned_points, 5);
    }

    #[test]
    fn test_c4_counts_distinct_keywords() {
        let mut p = page();
        p.main_text = "Contact us. Contact support.".into();
        let result = trust_pages(&p);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.earned_points, 1);

        p.main_text = "Read about our team.".into();
        let result = trust_pages(&p);
        assert_eq!(result.status, RuleStatus::Pass);
        assert_eq!(result.evidence, vec!["2 trust keywords found: about, team"]);
    }
}
