pub mod audit;
pub mod error;
pub mod extract;
pub mod formatters;
pub mod metadata;
pub mod parse;
pub mod patterns;
pub mod preprocess;
pub mod query;
pub mod rules;
pub mod text;

pub use audit::{AuditConfig, AuditConfigBuilder, AuditReport, Auditor, FetchedPage, OutputFormat, audit, audit_html};
pub use error::{AuditError, Result};
#[doc(hidden)]
pub use extract::{CandidateScore, MainContent, score_candidate, select_main_content};
pub use extract::{ExtractConfig, PageExtraction, SentenceStats, extract, extract_with_config};
pub use formatters::{JsonConfig, JsonFormatter, TextConfig, TextFormatter, convert_to_json, convert_to_text};
pub use metadata::{Heading, JsonLdBlock};
pub use parse::{ContentNode, Document, Element};
pub use patterns::{PatternMatch, PatternSet, PatternSpec};
pub use preprocess::{CleanConfig, clean_html};
pub use query::{Coverage, QueryAnalysis, QueryConfig, QueryIntent, analyze_query, analyze_query_with_config};
pub use rules::{
    ModuleScore, RuleModule, RuleResult, RuleSpec, RuleStatus, ScoringConfig, ScoringResult, score, score_with_config,
};
pub use text::{Grade, compute_grade, jaccard};
