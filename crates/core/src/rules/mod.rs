//! Point-weighted rule engine.
//!
//! Six independent modules each turn a [`PageExtraction`] into a list of
//! [`RuleResult`]s; [`score`] sums them into a [`ScoringResult`]. Module
//! maxima are fixed so the overall score is always out of 100.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use aeo_audit_core::{extract, score};
//!
//! let page = extract("<html><body><p>Hello.</p></body></html>", &HashMap::new(), "https://example.com/");
//! let result = score(&page);
//! assert_eq!(result.max_score, 100);
//! assert_eq!(result.modules.len(), 6);
//! ```

use std::fmt;

use serde::Serialize;

use crate::extract::PageExtraction;
use crate::text::{Grade, MIN_SENTENCE_CHARS, compute_grade};
use crate::{AuditError, Result};

pub mod answerability;
pub mod citation;
pub mod entity;
pub mod retrieval;
pub mod structured_data;
pub mod trust;

/// Total points available across all modules.
pub const MAX_SCORE: u32 = 100;

/// One of the six scoring modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RuleModule {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl RuleModule {
    /// Every module in evaluation order.
    pub const ALL: [RuleModule; 6] =
        [RuleModule::A, RuleModule::B, RuleModule::C, RuleModule::D, RuleModule::E, RuleModule::F];

    pub const fn max_points(self) -> u32 {
        match self {
            RuleModule::A => 25,
            RuleModule::B => 20,
            RuleModule::C => 20,
            RuleModule::D => 15,
            RuleModule::E => 10,
            RuleModule::F => 10,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            RuleModule::A => "Answer-ability",
            RuleModule::B => "Entity clarity",
            RuleModule::C => "Trust & evidence",
            RuleModule::D => "Structured data",
            RuleModule::E => "Retrieval & accessibility",
            RuleModule::F => "Citation likelihood",
        }
    }

    /// Runs every rule of this module.
    pub fn evaluate(self, page: &PageExtraction, config: &ScoringConfig) -> Vec<RuleResult> {
        match self {
            RuleModule::A => answerability::evaluate(page, config),
            RuleModule::B => entity::evaluate(page, config),
            RuleModule::C => trust::evaluate(page, config),
            RuleModule::D => structured_data::evaluate(page, config),
            RuleModule::E => retrieval::evaluate(page, config),
            RuleModule::F => citation::evaluate(page, config),
        }
    }
}

impl fmt::Display for RuleModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleStatus::Pass => "pass",
            RuleStatus::Warn => "warn",
            RuleStatus::Fail => "fail",
        };
        f.write_str(label)
    }
}

/// Static description of a rule: identity, weight and advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub id: &'static str,
    pub module: RuleModule,
    pub title: &'static str,
    pub why_it_matters: &'static str,
    pub max_points: u32,
    pub recommendation: &'static str,
}

impl RuleSpec {
    /// Full points.
    pub fn pass(&self, evidence: impl Into<String>) -> RuleResult {
        RuleResult::build(self, self.max_points, RuleStatus::Pass, vec![evidence.into()])
    }

    /// Partial credit; `points` is clamped to the rule maximum.
    pub fn warn(&self, points: u32, evidence: impl Into<String>) -> RuleResult {
        RuleResult::build(self, points, RuleStatus::Warn, vec![evidence.into()])
    }

    /// No points.
    pub fn fail(&self, evidence: impl Into<String>) -> RuleResult {
        RuleResult::build(self, 0, RuleStatus::Fail, vec![evidence.into()])
    }
}

/// The outcome of one rule, with the signals that justified it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub id: String,
    pub module: RuleModule,
    pub title: String,
    pub why_it_matters: String,
    pub max_points: u32,
    pub earned_points: u32,
    pub status: RuleStatus,
    pub evidence: Vec<String>,
    pub recommendation: String,
}

impl RuleResult {
    /// Builds a result from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidConfig`] when `evidence` is empty or
    /// `earned_points` exceeds the rule maximum.
    pub fn new(spec: &RuleSpec, earned_points: u32, status: RuleStatus, evidence: Vec<String>) -> Result<Self> {
        if evidence.is_empty() {
            return Err(AuditError::InvalidConfig(format!("rule {} has no evidence", spec.id)));
        }
        if earned_points > spec.max_points {
            return Err(AuditError::InvalidConfig(format!(
                "rule {} earned {} of {} points",
                spec.id, earned_points, spec.max_points
            )));
        }
        Ok(Self::build(spec, earned_points, status, evidence))
    }

    fn build(spec: &RuleSpec, earned_points: u32, status: RuleStatus, evidence: Vec<String>) -> Self {
        let earned_points = if status == RuleStatus::Fail { 0 } else { earned_points.min(spec.max_points) };
        Self {
            id: spec.id.to_string(),
            module: spec.module,
            title: spec.title.to_string(),
            why_it_matters: spec.why_it_matters.to_string(),
            max_points: spec.max_points,
            earned_points,
            status,
            evidence,
            recommendation: spec.recommendation.to_string(),
        }
    }

    /// Appends another piece of evidence.
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence.push(evidence.into());
        self
    }

    /// Appends several pieces of evidence.
    pub fn with_all_evidence<I, S>(mut self, evidence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.evidence.extend(evidence.into_iter().map(Into::into));
        self
    }
}

/// Thresholds the rules compare against.
///
/// Point weights are not configurable: module maxima must sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Leading words of the main text searched for a definition (A1)
    pub definition_window_words: usize,
    /// Longest sentence, in words, that counts as a definition (A1)
    pub max_definition_words: usize,
    /// Average sentence length must be below this (A4)
    pub max_avg_sentence_words: f64,
    /// Link density must be below this (A4)
    pub max_link_density: f64,
    /// Word count needed for full retrieval credit (E3)
    pub min_server_words: usize,
    /// Title/H1 Jaccard overlap for full credit (B2)
    pub title_h1_pass: f64,
    /// Title/H1 Jaccard overlap for partial credit (B2)
    pub title_h1_partial: f64,
    /// Sentences of this many characters or fewer are ignored (A1)
    pub min_sentence_chars: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            definition_window_words: 500,
            max_definition_words: 30,
            max_avg_sentence_words: 25.0,
            max_link_density: 0.25,
            min_server_words: 400,
            title_h1_pass: 0.25,
            title_h1_partial: 0.10,
            min_sentence_chars: MIN_SENTENCE_CHARS,
        }
    }
}

/// Aggregated results of one module
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleScore {
    pub module: RuleModule,
    pub title: String,
    pub max_points: u32,
    pub earned_points: u32,
    pub percentage: f64,
    pub grade: Grade,
    pub rules: Vec<RuleResult>,
}

impl ModuleScore {
    pub fn from_rules(module: RuleModule, rules: Vec<RuleResult>) -> Self {
        let max_points = module.max_points();
        let earned_points: u32 = rules.iter().map(|r| r.earned_points).sum();
        let percentage = f64::from(earned_points) / f64::from(max_points) * 100.0;
        Self {
            module,
            title: module.title().to_string(),
            max_points,
            earned_points,
            percentage,
            grade: compute_grade(percentage),
            rules,
        }
    }
}

/// The full audit score
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringResult {
    pub overall_score: u32,
    pub max_score: u32,
    pub grade: Grade,
    pub modules: Vec<ModuleScore>,
    pub all_rules: Vec<RuleResult>,
}

impl ScoringResult {
    pub fn module(&self, module: RuleModule) -> Option<&ModuleScore> {
        self.modules.iter().find(|m| m.module == module)
    }

    pub fn rule(&self, id: &str) -> Option<&RuleResult> {
        self.all_rules.iter().find(|r| r.id == id)
    }
}

/// Score a page with the default thresholds.
pub fn score(page: &PageExtraction) -> ScoringResult {
    score_with_config(page, &ScoringConfig::default())
}

/// Score a page with custom thresholds.
pub fn score_with_config(page: &PageExtraction, config: &ScoringConfig) -> ScoringResult {
    let modules: Vec<ModuleScore> = RuleModule::ALL
        .iter()
        .map(|&module| {
            let rules = module.evaluate(page, config);
            for rule in &rules {
                tracing::trace!(
                    rule = %rule.id,
                    status = %rule.status,
                    earned = rule.earned_points,
                    max = rule.max_points,
                    "evaluated rule"
                );
            }
            let module_score = ModuleScore::from_rules(module, rules);
            tracing::debug!(
                module = %module,
                earned = module_score.earned_points,
                max = module_score.max_points,
                grade = %module_score.grade,
                "module scored"
            );
            module_score
        })
        .collect();

    let overall_score: u32 = modules.iter().map(|m| m.earned_points).sum();
    let all_rules = modules.iter().flat_map(|m| m.rules.iter().cloned()).collect();

    ScoringResult {
        overall_score,
        max_score: MAX_SCORE,
        grade: compute_grade(f64::from(overall_score)),
        modules,
        all_rules,
    }
}

/// Shortens text for evidence, cutting at a character boundary.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
