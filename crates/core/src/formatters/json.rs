use serde::Serialize;

use crate::Result;
use crate::audit::AuditReport;
use crate::extract::PageExtraction;
use crate::query::QueryAnalysis;
use crate::rules::ScoringResult;

/// Complete JSON output structure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput<'a> {
    pub url: &'a str,
    pub scoring: &'a ScoringResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a QueryAnalysis>,
    /// Extraction record, present when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<PageExtraction>,
}

/// Configuration for JSON output
#[derive(Debug, Clone, Default)]
pub struct JsonConfig {
    /// Pretty print JSON output
    pub pretty: bool,
    /// Include the extraction record
    pub include_extraction: bool,
    /// Keep `mainText` and `topText` in the extraction record
    pub include_main_text: bool,
}

/// Convert an audit report to JSON
pub fn convert_to_json(report: &AuditReport, config: &JsonConfig) -> Result<String> {
    let extraction = config.include_extraction.then(|| {
        let mut extraction = report.extraction.clone();
        if !config.include_main_text {
            extraction.main_text.clear();
            extraction.top_text.clear();
        }
        extraction
    });

    let output =
        JsonOutput { url: &report.url, scoring: &report.scoring, query: report.query.as_ref(), extraction };

    if config.pretty { Ok(serde_json::to_string_pretty(&output)?) } else { Ok(serde_json::to_string(&output)?) }
}

/// JSON formatter with configurable options
pub struct JsonFormatter {
    config: JsonConfig,
}

impl JsonFormatter {
    pub fn new(config: JsonConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &AuditReport) -> Result<String> {
        convert_to_json(report, &self.config)
    }
}
