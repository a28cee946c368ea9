//! Library API integration tests
use std::collections::HashMap;

use aeo_audit_core::*;

const ARTICLE_URL: &str = "https://www.acme.test/guides/answer-engine-optimization";
const HOME_URL: &str = "https://acme.test/";

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(get_fixture_path(name)).unwrap()
}

fn earned(result: &ScoringResult, module: RuleModule) -> u32 {
    result.module(module).unwrap().earned_points
}

#[test]
fn test_article_extraction() {
    let page = extract(&fixture("aeo_article.html"), &HashMap::new(), ARTICLE_URL);

    assert_eq!(page.title.as_deref(), Some("What Is Answer Engine Optimization? | Acme Digital"));
    assert_eq!(page.h1.as_deref(), Some("What Is Answer Engine Optimization?"));
    assert_eq!(page.content_selector, "article");
    assert!(page.canonical.is_some());
    assert_eq!(page.json_ld.len(), 2);
    assert_eq!(page.lists_count, 2);
    assert_eq!(page.tables_count, 1);
    assert!((500..=560).contains(&page.word_count), "word count {}", page.word_count);
    assert!(!page.is_js_shell);
}

#[test]
fn test_navigation_is_not_main_content() {
    let page = extract(&fixture("aeo_article.html"), &HashMap::new(), ARTICLE_URL);

    assert!(page.main_text.starts_with("What Is Answer Engine Optimization?"));
    assert!(!page.main_text.contains("Case studies from retail"));
    assert!(!page.main_text.contains("All rights reserved"));
}

#[test]
fn test_article_links() {
    let page = extract(&fixture("aeo_article.html"), &HashMap::new(), ARTICLE_URL);

    assert_eq!(page.external_links_count, 3);
    assert!(page.external_links.contains("https://schema.org/Article"));
    assert!(!page.external_links.iter().any(|url| url.contains("twitter.com")));
    assert_eq!(page.internal_links_count, 1);
}

#[test]
fn test_article_scores_full_marks() {
    let page = extract(&fixture("aeo_article.html"), &HashMap::new(), ARTICLE_URL);
    let result = score(&page);

    for rule in &result.all_rules {
        assert_eq!(rule.status, RuleStatus::Pass, "{} {:?}", rule.id, rule.evidence);
    }
    assert_eq!(result.overall_score, 100);
    assert_eq!(result.grade, Grade::A);
    assert!(result.rule("C1").unwrap().evidence[0].contains("Jane Rivera"));
    assert!(result.rule("A1").unwrap().evidence[0].contains("Answer engine optimization is the practice"));
}

#[test]
fn test_landing_page_scores() {
    let page = extract(&fixture("acme_home.html"), &HashMap::new(), HOME_URL);
    let result = score(&page);

    assert_eq!(page.content_selector, "main");
    assert_eq!(earned(&result, RuleModule::A), 21);
    assert_eq!(earned(&result, RuleModule::B), 20);
    assert_eq!(earned(&result, RuleModule::C), 8);
    assert_eq!(earned(&result, RuleModule::D), 11);
    assert_eq!(earned(&result, RuleModule::E), 10);
    assert_eq!(earned(&result, RuleModule::F), 5);
    assert_eq!(result.overall_score, 75);
    assert_eq!(result.grade, Grade::C);

    assert_eq!(result.rule("A2").unwrap().status, RuleStatus::Warn);
    assert_eq!(result.rule("C2").unwrap().status, RuleStatus::Warn);
    assert_eq!(result.rule("C2").unwrap().earned_points, 0);
    assert_eq!(result.rule("C1").unwrap().status, RuleStatus::Fail);
    assert_eq!(result.rule("F2").unwrap().status, RuleStatus::Fail);
    assert_eq!(result.rule("B4").unwrap().evidence[0], "\"acme\" appears in title suffix and H1 and schema name");
}

#[test]
fn test_js_shell_page() {
    let page = extract(&fixture("js_shell.html"), &HashMap::new(), "https://app.example.net/");
    let result = score(&page);

    assert!(page.is_js_shell);
    assert_eq!(page.script_count, 8);
    assert_eq!(page.content_selector, "body");

    let e3 = result.rule("E3").unwrap();
    assert_eq!(e3.earned_points, 0);
    assert_eq!(e3.evidence[1], "Looks like a JavaScript shell: 8 script tags");
    assert_eq!(result.rule("E1").unwrap().status, RuleStatus::Fail);

    let d3 = result.rule("D3").unwrap();
    assert_eq!(d3.status, RuleStatus::Fail);
    assert!(d3.evidence.contains(&"1 blocks are not valid JSON".to_string()));
    assert!(result.overall_score < 40);
}

#[test]
fn test_x_robots_tag_header() {
    let mut headers = HashMap::new();
    headers.insert("x-robots-tag".to_string(), "NOINDEX".to_string());
    let page = extract(&fixture("acme_home.html"), &headers, HOME_URL);

    assert_eq!(score(&page).rule("E1").unwrap().status, RuleStatus::Fail);
}

#[test]
fn test_score_invariants() {
    for name in ["aeo_article.html", "acme_home.html", "js_shell.html"] {
        let result = score(&extract(&fixture(name), &HashMap::new(), HOME_URL));

        assert_eq!(result.modules.len(), 6);
        assert_eq!(result.max_score, 100);
        assert_eq!(result.all_rules.len(), 20);
        assert_eq!(result.overall_score, result.modules.iter().map(|m| m.earned_points).sum::<u32>());
        for rule in &result.all_rules {
            assert!(rule.earned_points <= rule.max_points, "{}", rule.id);
            assert!(!rule.evidence.is_empty(), "{}", rule.id);
            if rule.status == RuleStatus::Fail {
                assert_eq!(rule.earned_points, 0, "{}", rule.id);
            }
        }
    }
}

#[test]
fn test_query_analysis_on_article() {
    let page = extract(&fixture("aeo_article.html"), &HashMap::new(), ARTICLE_URL);
    let analysis = analyze_query("What is answer engine optimization?", &page);

    assert_eq!(analysis.query_intent, QueryIntent::What);
    assert_eq!(analysis.topic, "answer engine optimization");
    assert_eq!(analysis.query_fit_score, 100);
    assert!(analysis.missing_elements.is_empty());

    let draft = analysis.answer_draft.unwrap();
    assert!(draft.starts_with("Answer engine optimization is the practice of structuring web content"));
    assert!(!draft.contains("What Is Answer Engine Optimization"));
    assert!(!draft.ends_with('.'));
}

#[test]
fn test_query_analysis_on_landing_page() {
    let page = extract(&fixture("acme_home.html"), &HashMap::new(), HOME_URL);
    let analysis = analyze_query("What is Acme?", &page);

    assert_eq!(analysis.topic, "Acme");
    assert_eq!(analysis.coverage.title_match, 100);
    assert_eq!(analysis.suggested_faqs.len(), 10);
    assert_eq!(analysis.suggested_faqs[0], "What is Acme?");

    let draft = analysis.answer_draft.unwrap();
    assert!(draft.starts_with("Acme is a consultancy"));
    assert!(draft.contains("18%"));
}

fn unterminated_heading_page() -> String {
    let filler = "Teams publish guides every week and review them with editors before release. ".repeat(30);
    format!(
        "<html><head><title>AEO guide</title></head><body><article>\
         <h1>What is AEO</h1><p>AEO is the practice of optimizing content for AI citation. {filler}</p>\
         <h2>How it works</h2><p>Retrieval is the step where engines pick passages to quote.</p>\
         </article></body></html>"
    )
}

#[test]
fn test_definition_after_unterminated_heading() {
    let page = extract(&unterminated_heading_page(), &HashMap::new(), "https://example.com/aeo");
    let result = score(&page);

    let a1 = result.rule("A1").unwrap();
    assert_eq!(a1.status, RuleStatus::Pass);
    assert_eq!(a1.evidence[0], "Definitional sentence: \"AEO is the practice of optimizing content for AI citation\"");

    let analysis = analyze_query("What is AEO?", &page);
    assert!(!analysis.missing_elements.iter().any(|m| m.contains("No definition sentence")));
    assert!(analysis.answer_draft.unwrap().starts_with("AEO is the practice of optimizing content"));
}

#[test]
fn test_statement_opening_with_question_word_is_a_definition() {
    let filler = "Editors review every page before it goes live on the site. ".repeat(20);
    let html = format!(
        "<html><body><article><p>When content is structured, AEO is simply easier. {filler}</p></article></body></html>"
    );
    let page = extract(&html, &HashMap::new(), "https://example.com/");

    assert_eq!(score(&page).rule("A1").unwrap().status, RuleStatus::Pass);
}

#[test]
fn test_how_query_uses_lists() {
    let page = extract(&fixture("acme_home.html"), &HashMap::new(), HOME_URL);
    let analysis = analyze_query("How does Acme plan production software", &page);

    assert_eq!(analysis.query_intent, QueryIntent::How);
    assert!(!analysis.missing_elements.iter().any(|m| m.contains("ordered steps")));
}

#[test]
fn test_auditor_api() {
    let page = FetchedPage::new(fixture("aeo_article.html"), ARTICLE_URL, 200);
    let report = Auditor::new().audit(&page, Some("What is answer engine optimization?")).unwrap();

    assert_eq!(report.url, ARTICLE_URL);
    assert_eq!(report.scoring.overall_score, 100);
    assert!(report.query.is_some());

    let json = report.to_json().unwrap();
    assert_eq!(json["scoring"]["grade"], "A");
    assert_eq!(json["extraction"]["contentSelector"], "article");
    assert_eq!(json["query"]["queryFitScore"], 100);

    let text = report.to_text();
    assert!(text.contains("Overall: 100/100 (A)"));
}

#[test]
fn test_auditor_rejects_error_status() {
    let page = FetchedPage::new(fixture("aeo_article.html"), ARTICLE_URL, 404);
    let err = Auditor::new().audit(&page, None).unwrap_err();
    assert!(matches!(err, AuditError::UnexpectedStatus { status: 404 }));
}

#[test]
fn test_custom_config() {
    let config = AuditConfig::builder().min_server_words(1000).build();
    assert!(config.validate().is_ok());

    let report = Auditor::with_config(config).audit_html(&fixture("acme_home.html"), &HashMap::new(), HOME_URL, None);
    let e3 = report.scoring.rule("E3").unwrap();
    assert_eq!(e3.status, RuleStatus::Fail);
    assert!(e3.evidence[0].starts_with("Only "));
}

#[test]
fn test_deterministic_results() {
    let html = fixture("aeo_article.html");
    let first = audit_html(&html, &HashMap::new(), ARTICLE_URL, Some("What is AEO?"));
    let second = audit_html(&html, &HashMap::new(), ARTICLE_URL, Some("What is AEO?"));

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn test_parallel_extraction() {
    let html = fixture("aeo_article.html");
    let expected = extract(&html, &HashMap::new(), ARTICLE_URL);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| extract(&html, &HashMap::new(), ARTICLE_URL)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_edge_case_empty() {
    let page = extract("", &HashMap::new(), "https://example.com/");
    let result = score(&page);

    assert_eq!(page.word_count, 0);
    assert_eq!(page.title, None);
    assert_eq!(result.modules.len(), 6);
    assert_eq!(result.rule("E3").unwrap().evidence[0], "Only 0 words in server response");
    assert_eq!(result.rule("B1").unwrap().status, RuleStatus::Fail);
}

#[test]
fn test_edge_case_malformed() {
    let html = "<html><head><title>Broken</title><body><div><p>Unclosed paragraph <span>and span";
    let report = audit_html(html, &HashMap::new(), "not a url", Some("what is broken"));

    assert_eq!(report.extraction.title.as_deref(), Some("Broken"));
    assert!(report.extraction.main_text.contains("Unclosed paragraph and span"));
    assert_eq!(report.scoring.modules.len(), 6);
}

#[test]
fn test_edge_case_unicode() {
    let html = "<html><head><title>Café Guide | Ünïcode</title></head>\
        <body><h1>Café Guide</h1><p>Le café est une boisson préparée à partir de grains torréfiés.</p></body></html>";
    let page = extract(html, &HashMap::new(), "https://example.fr/");
    let result = score(&page);

    assert_eq!(page.h1.as_deref(), Some("Café Guide"));
    assert_eq!(result.rule("B3").unwrap().evidence[0], "Brand \"Ünïcode\" from title suffix");
    assert_eq!(result.rule("B2").unwrap().status, RuleStatus::Pass);
}

#[test]
fn test_document_api() {
    let doc = Document::parse(&fixture("acme_home.html"));

    assert_eq!(doc.title().as_deref(), Some("Home | Acme"));
    assert_eq!(doc.select("h2").unwrap().len(), 2);
    assert!(doc.select("[[").is_err());
}
