//! Module D: does the page describe itself in machine-readable schema?

use std::collections::BTreeSet;

use super::{RuleModule, RuleResult, RuleSpec, ScoringConfig};
use crate::extract::PageExtraction;
use crate::metadata::node_types;

pub const D1: RuleSpec = RuleSpec {
    id: "D1",
    module: RuleModule::D,
    title: "JSON-LD present",
    why_it_matters: "Structured data is the most direct way to tell machines what a page contains.",
    max_points: 6,
    recommendation: "Add a <script type=\"application/ld+json\"> block describing the page.",
};

pub const D2: RuleSpec = RuleSpec {
    id: "D2",
    module: RuleModule::D,
    title: "Recognized schema types",
    why_it_matters: "Well-known Schema.org types are the ones answer engines understand.",
    max_points: 6,
    recommendation: "Describe the page with recognized types such as Article, FAQPage, HowTo or Organization.",
};

pub const D3: RuleSpec = RuleSpec {
    id: "D3",
    module: RuleModule::D,
    title: "Valid JSON-LD",
    why_it_matters: "Blocks that fail to parse or lack @context are ignored by consumers.",
    max_points: 3,
    recommendation: "Make every JSON-LD block valid JSON with an \"@context\": \"https://schema.org\".",
};

/// Schema.org types that earn D2 points.
pub const RECOGNIZED_TYPES: &[&str] = &[
    "Article",
    "NewsArticle",
    "BlogPosting",
    "FAQPage",
    "HowTo",
    "Product",
    "Organization",
    "LocalBusiness",
    "Corporation",
    "BreadcrumbList",
    "WebPage",
    "WebSite",
    "Person",
    "Review",
    "Recipe",
    "Service",
    "Event",
    "VideoObject",
];

const D2_POINTS_PER_TYPE: u32 = 2;
const D2_PASS_TYPES: usize = 3;
const D3_PARTIAL: u32 = 1;

pub fn evaluate(page: &PageExtraction, _config: &ScoringConfig) -> Vec<RuleResult> {
    vec![json_ld_present(page), recognized_types(page), valid_json_ld(page)]
}

fn json_ld_present(page: &PageExtraction) -> RuleResult {
    match page.json_ld.len() {
        0 => D1.fail("No JSON-LD blocks found"),
        n => D1.pass(format!("{} JSON-LD blocks found", n)),
    }
}

fn recognized_types(page: &PageExtraction) -> RuleResult {
    let all_types: BTreeSet<&str> = page
        .json_ld
        .iter()
        .flat_map(|block| block.nodes())
        .flat_map(node_types)
        .collect();
    let (recognized, other): (Vec<&str>, Vec<&str>) = all_types.into_iter().partition(|t| RECOGNIZED_TYPES.contains(t));

    let points = D2_POINTS_PER_TYPE * recognized.len() as u32;
    let other = (!other.is_empty()).then(|| format!("Unrecognized types: {}", other.join(", ")));

    if recognized.is_empty() {
        return D2.fail("No recognized schema types").with_all_evidence(other);
    }
    let summary = format!("{} recognized schema types: {}", recognized.len(), recognized.join(", "));
    let result =
        if recognized.len() >= D2_PASS_TYPES { D2.pass(summary) } else { D2.warn(points, summary) };
    result.with_all_evidence(other)
}

fn valid_json_ld(page: &PageExtraction) -> RuleResult {
    let total = page.json_ld.len();
    if total == 0 {
        return D3.fail("No JSON-LD blocks to validate");
    }

    let invalid_json = page.json_ld.iter().filter(|b| b.parsed.is_none()).count();
    let valid = page.json_ld.iter().filter(|b| b.has_context()).count();
    let summary = format!("{} of {} JSON-LD blocks parse and declare @context", valid, total);
    let parse_errors = (invalid_json > 0).then(|| format!("{} blocks are not valid JSON", invalid_json));

    let result = if valid == total {
        D3.pass(summary)
    } else if valid > 0 {
        D3.warn(D3_PARTIAL, summary)
    } else {
        D3.fail(summary)
    };
    result.with_all_evidence(parse_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::JsonLdBlock;
    use crate::rules::RuleStatus;
    use crate::rules::test_support::page;

    #[test]
    fn test_d1() {
        let mut p = page();
        assert_eq!(json_ld_present(&p).status, RuleStatus::Fail);
        p.json_ld = vec![JsonLdBlock::from_raw("{not json")];
        assert_eq!(json_ld_present(&p).evidence, vec!["1 JSON-LD blocks found"]);
    }

    #[test]
    fn test_d2_two_points_per_type() {
        let mut p = page();
        p.json_ld = vec![JsonLdBlock::from_raw(r#"{"@context":"https://schema.org","@type":"Organization"}"#)];
        let result = recognized_types(&p);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.earned_points, 2);
        assert_eq!(result.evidence, vec!["1 recognized schema types: Organization"]);
    }

    #[test]
    fn test_d2_scans_graph_and_caps() {
        let mut p = page();
        p.json_ld = vec![JsonLdBlock::from_raw(
            r#"{"@context":"https://schema.org","@graph":[
                {"@type":"WebSite"},{"@type":"WebPage"},{"@type":["Article","Thing"]},
                {"@type":"BreadcrumbList"},{"@type":"WebPage"}
            ]}"#,
        )];
        let result = recognized_types(&p);
        assert_eq!(result.status, RuleStatus::Pass);
        assert_eq!(result.earned_points, 6);
        assert_eq!(result.evidence[0], "4 recognized schema types: Article, BreadcrumbList, WebPage, WebSite");
        assert_eq!(result.evidence[1], "Unrecognized types: Thing");
    }

    #[test]
    fn test_d3_partial() {
        let mut p = page();
        p.json_ld = vec![
            JsonLdBlock::from_raw(r#"{"@context":"https://schema.org","@type":"Organization"}"#),
            JsonLdBlock::from_raw(r#"{"@type":"Organization"}"#),
            JsonLdBlock::from_raw("{broken"),
        ];
        let result = valid_json_ld(&p);
        assert_eq!(result.status, RuleStatus::Warn);
        assert_eq!(result.earned_points, 1);
        assert_eq!(result.evidence, vec!["1 of 3 JSON-LD blocks parse and declare @context", "1 blocks are not valid JSON"]);

        p.json_ld.truncate(1);
        assert_eq!(valid_json_ld(&p).earned_points, 3);
    }
}
