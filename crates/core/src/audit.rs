//! Audit pipeline API.
//!
//! This module ties extraction, scoring and query analysis together. The
//! main entry point is the [`Auditor`] struct, along with the convenience
//! functions [`audit`] and [`audit_html`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use aeo_audit_core::audit_html;
//!
//! let html = "<html><head><title>Guide | Acme</title></head><body><h1>Guide</h1></body></html>";
//! let report = audit_html(html, &HashMap::new(), "https://acme.test/guide", Some("What is Acme?"));
//!
//! assert_eq!(report.scoring.max_score, 100);
//! assert!(report.query.is_some());
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::extract::{ExtractConfig, PageExtraction, extract_with_config};
use crate::formatters::{JsonConfig, TextConfig, convert_to_json, convert_to_text};
use crate::parse::Document;
use crate::query::{QueryAnalysis, QueryConfig, analyze_query_with_config};
use crate::rules::{ScoringConfig, ScoringResult, score_with_config};
use crate::{AuditError, Result};

/// A fetched HTTP response, as handed over by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub headers: HashMap<String, String>,
    pub status_code: u16,
    pub url: String,
}

impl FetchedPage {
    /// Creates a page with no response headers.
    pub fn new(html: impl Into<String>, url: impl Into<String>, status_code: u16) -> Self {
        Self { html: html.into(), headers: HashMap::new(), status_code, url: url.into() }
    }

    /// Adds a response header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces all response headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// True for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Output format options for an [`AuditReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report.
    Text,
    /// Structured data.
    Json,
}

/// Configuration for the whole pipeline.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .top_text_words(800)
///     .max_link_density(0.3)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditConfig {
    /// Main-content detection and extraction settings.
    pub extract: ExtractConfig,

    /// Rule thresholds.
    pub scoring: ScoringConfig,

    /// Query analysis thresholds.
    pub query: QueryConfig,
}

impl AuditConfig {
    /// Creates a new builder for AuditConfig.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::new()
    }

    /// Checks every value against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let extract = &self.extract;
        let scoring = &self.scoring;
        let query = &self.query;

        if extract.top_text_words == 0 {
            return Err(invalid("top_text_words must be greater than 0"));
        }
        if extract.candidate_selectors.is_empty() {
            return Err(invalid("candidate_selectors must not be empty"));
        }
        let doc = Document::parse("");
        for selector in &extract.candidate_selectors {
            if doc.select(selector).is_err() {
                return Err(invalid(&format!("candidate selector '{}' does not parse", selector)));
            }
        }
        if !(scoring.max_link_density > 0.0 && scoring.max_link_density <= 1.0) {
            return Err(invalid("max_link_density must be within (0, 1]"));
        }
        if !(0.0..=1.0).contains(&scoring.title_h1_partial) || !(0.0..=1.0).contains(&scoring.title_h1_pass) {
            return Err(invalid("title/H1 overlap thresholds must be within [0, 1]"));
        }
        if scoring.title_h1_partial > scoring.title_h1_pass {
            return Err(invalid("title_h1_partial must not exceed title_h1_pass"));
        }
        if scoring.max_definition_words == 0 || scoring.definition_window_words == 0 {
            return Err(invalid("definition window and sentence length must be greater than 0"));
        }
        if scoring.max_avg_sentence_words <= 0.0 {
            return Err(invalid("max_avg_sentence_words must be positive"));
        }
        if extract.min_sentence_chars != scoring.min_sentence_chars
            || extract.min_sentence_chars != query.min_sentence_chars
        {
            return Err(invalid("min_sentence_chars must be the same for extraction, scoring and query analysis"));
        }
        if query.max_answer_words == 0 || query.max_follow_up_words == 0 {
            return Err(invalid("answer draft sentence lengths must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&query.min_answer_overlap) || !(0.0..=1.0).contains(&query.min_coverage) {
            return Err(invalid("query overlap and coverage thresholds must be within [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> AuditError {
    AuditError::InvalidConfig(message.to_string())
}

/// Builder for AuditConfig.
///
/// Covers the commonly tuned values; other fields can be set on the
/// built config directly.
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: AuditConfig::default() }
    }

    /// Sets how many leading words of the main text form `top_text`.
    pub fn top_text_words(mut self, value: usize) -> Self {
        self.config.extract.top_text_words = value;
        self
    }

    /// Sets the word count a selector candidate must exceed.
    pub fn min_candidate_words(mut self, value: usize) -> Self {
        self.config.extract.min_candidate_words = value;
        self
    }

    /// Sets the main-content selectors, in priority order.
    pub fn candidate_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extract.candidate_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a noise selector removed before candidate selection.
    pub fn noise_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.extract.clean.noise_selectors.push(selector.into());
        self
    }

    /// Sets the link-density ceiling used by the readability rule.
    pub fn max_link_density(mut self, value: f64) -> Self {
        self.config.scoring.max_link_density = value;
        self
    }

    /// Sets the word count needed for full server-rendering credit.
    pub fn min_server_words(mut self, value: usize) -> Self {
        self.config.scoring.min_server_words = value;
        self
    }

    /// Sets the JavaScript-shell word cutoff.
    pub fn js_shell_max_words(mut self, value: usize) -> Self {
        self.config.extract.js_shell_max_words = value;
        self
    }

    /// Sets the sentence cutoff used by extraction, scoring and query analysis.
    pub fn min_sentence_chars(mut self, value: usize) -> Self {
        self.config.extract.min_sentence_chars = value;
        self.config.scoring.min_sentence_chars = value;
        self.config.query.min_sentence_chars = value;
        self
    }

    /// Replaces the extraction settings.
    pub fn extract_config(mut self, value: ExtractConfig) -> Self {
        self.config.extract = value;
        self
    }

    /// Replaces the rule thresholds.
    pub fn scoring_config(mut self, value: ScoringConfig) -> Self {
        self.config.scoring = value;
        self
    }

    /// Replaces the query analysis thresholds.
    pub fn query_config(mut self, value: QueryConfig) -> Self {
        self.config.query = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> AuditConfig {
        self.config
    }
}

impl Default for AuditConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete result of auditing one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub url: String,
    pub extraction: PageExtraction,
    pub scoring: ScoringResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryAnalysis>,
}

impl AuditReport {
    /// Converts the report to the specified format.
    pub fn to_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => self.to_json().map(|v| v.to_string()),
        }
    }

    /// Gets the report as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Gets the report as pretty JSON without the page text.
    pub fn to_json_string(&self) -> Result<String> {
        convert_to_json(self, &JsonConfig { pretty: true, ..Default::default() })
    }

    /// Gets the report as plain text with default options.
    pub fn to_text(&self) -> String {
        convert_to_text(self, &TextConfig::default())
    }
}

/// Main entry point for audits.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::{Auditor, FetchedPage};
///
/// let page = FetchedPage::new("<html><body><p>Hello.</p></body></html>", "https://example.com/", 200)
///     .with_header("X-Robots-Tag", "noindex");
/// let report = Auditor::new().audit(&page, None).unwrap();
/// assert_eq!(report.scoring.rule("E1").unwrap().earned_points, 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    config: AuditConfig,
}

impl Auditor {
    /// Creates an auditor with default settings.
    pub fn new() -> Self {
        Self { config: AuditConfig::default() }
    }

    /// Creates an auditor with a custom configuration.
    ///
    /// The configuration is used as given; call [`AuditConfig::validate`]
    /// first when it comes from user input.
    pub fn with_config(config: AuditConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audits a fetched page.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::UnexpectedStatus`] for non-2xx responses.
    pub fn audit(&self, page: &FetchedPage, query: Option<&str>) -> Result<AuditReport> {
        if !page.is_success() {
            return Err(AuditError::UnexpectedStatus { status: page.status_code });
        }
        Ok(self.audit_html(&page.html, &page.headers, &page.url, query))
    }

    /// Audits raw HTML. Never fails.
    pub fn audit_html(
        &self, html: &str, headers: &HashMap<String, String>, url: &str, query: Option<&str>,
    ) -> AuditReport {
        let extraction = extract_with_config(html, headers, url, &self.config.extract);
        let scoring = score_with_config(&extraction, &self.config.scoring);
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| analyze_query_with_config(q, &extraction, &self.config.query));

        tracing::debug!(url, score = scoring.overall_score, grade = %scoring.grade, "audit complete");

        AuditReport { url: url.to_string(), extraction, scoring, query }
    }
}

/// Convenience function: audit a fetched page with defaults.
///
/// # Errors
///
/// Returns [`AuditError::UnexpectedStatus`] for non-2xx responses.
pub fn audit(page: &FetchedPage, query: Option<&str>) -> Result<AuditReport> {
    Auditor::new().audit(page, query)
}

/// Convenience function: audit raw HTML with defaults.
pub fn audit_html(html: &str, headers: &HashMap<String, String>, url: &str, query: Option<&str>) -> AuditReport {
    Auditor::new().audit_html(html, headers, url, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html>
        <head><title>Guide | Acme</title><link rel="canonical" href="https://acme.test/guide"></head>
        <body><article><h1>Acme guide</h1><p>Acme is a company that builds answer engine tooling.</p></article></body>
        </html>
    "#;

    #[test]
    fn test_audit_config_default_is_valid() {
        assert!(AuditConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AuditConfig::builder()
            .top_text_words(500)
            .min_candidate_words(20)
            .max_link_density(0.4)
            .min_server_words(300)
            .js_shell_max_words(200)
            .noise_selector(".newsletter")
            .candidate_selectors(["main", "article"])
            .build();

        assert_eq!(config.extract.top_text_words, 500);
        assert_eq!(config.extract.min_candidate_words, 20);
        assert_eq!(config.scoring.max_link_density, 0.4);
        assert_eq!(config.scoring.min_server_words, 300);
        assert_eq!(config.extract.js_shell_max_words, 200);
        assert!(config.extract.clean.noise_selectors.contains(&".newsletter".to_string()));
        assert_eq!(config.extract.candidate_selectors, vec!["main", "article"]);
    }

    #[test]
    fn test_min_sentence_chars_applies_everywhere() {
        let config = AuditConfig::builder().min_sentence_chars(25).build();

        assert_eq!(config.extract.min_sentence_chars, 25);
        assert_eq!(config.scoring.min_sentence_chars, 25);
        assert_eq!(config.query.min_sentence_chars, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            AuditConfig::builder().top_text_words(0).build(),
            AuditConfig::builder().max_link_density(0.0).build(),
            AuditConfig::builder().max_link_density(1.5).build(),
            AuditConfig::builder().candidate_selectors(["[[broken"]).build(),
            AuditConfig::builder().candidate_selectors(Vec::<String>::new()).build(),
            AuditConfig::builder()
                .scoring_config(ScoringConfig { title_h1_partial: 0.5, title_h1_pass: 0.2, ..Default::default() })
                .build(),
            AuditConfig::builder()
                .scoring_config(ScoringConfig { min_sentence_chars: 20, ..Default::default() })
                .build(),
            AuditConfig::builder().query_config(QueryConfig { min_coverage: 2.0, ..Default::default() }).build(),
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(AuditError::InvalidConfig(_))), "{:?}", config);
        }
    }

    #[test]
    fn test_audit_rejects_non_success_status() {
        for status in [301, 404, 500] {
            let page = FetchedPage::new(HTML, "https://acme.test/guide", status);
            assert!(matches!(audit(&page, None), Err(AuditError::UnexpectedStatus { status: s }) if s == status));
        }
    }

    #[test]
    fn test_audit_passes_headers_through() {
        let page = FetchedPage::new(HTML, "https://acme.test/guide", 200).with_header("X-Robots-Tag", "noindex");
        let report = audit(&page, None).unwrap();
        assert_eq!(report.extraction.robots_meta.as_deref(), Some("noindex"));
        assert_eq!(report.scoring.rule("E1").unwrap().earned_points, 0);
    }

    #[test]
    fn test_audit_html_matches_audit() {
        let page = FetchedPage::new(HTML, "https://acme.test/guide", 200);
        let from_page = audit(&page, Some("What is Acme?")).unwrap();
        let from_html = audit_html(HTML, &HashMap::new(), "https://acme.test/guide", Some("What is Acme?"));
        assert_eq!(from_page, from_html);
    }

    #[test]
    fn test_blank_query_is_skipped() {
        let report = audit_html(HTML, &HashMap::new(), "https://acme.test/guide", Some("   "));
        assert!(report.query.is_none());
    }

    #[test]
    fn test_to_json_uses_camel_case() {
        let report = audit_html(HTML, &HashMap::new(), "https://acme.test/guide", Some("What is Acme?"));
        let json = report.to_json().unwrap();

        assert_eq!(json["scoring"]["maxScore"], 100);
        assert_eq!(json["extraction"]["canonical"], "https://acme.test/guide");
        assert_eq!(json["query"]["queryIntent"], "what");
        assert!(json["scoring"]["allRules"][0]["whyItMatters"].is_string());
    }

    #[test]
    fn test_to_format() {
        let report = audit_html(HTML, &HashMap::new(), "https://acme.test/guide", None);
        let json = report.to_format(OutputFormat::Json).unwrap();
        assert!(json.starts_with('{'));
        let text = report.to_format(OutputFormat::Text).unwrap();
        assert!(text.contains("Overall"));
    }
}
