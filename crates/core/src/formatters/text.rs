use std::fmt::Write;

use crate::audit::AuditReport;
use crate::query::QueryAnalysis;
use crate::rules::{ModuleScore, RuleResult, RuleStatus};

/// Configuration for plain text output
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Print the evidence lines under each rule
    pub show_evidence: bool,

    /// Print the recommendation of every rule that did not pass
    pub show_recommendations: bool,

    /// Hide rules that passed
    pub only_failing: bool,

    /// Wrap evidence and recommendations at this width (0 = no wrapping)
    pub line_width: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { show_evidence: false, show_recommendations: true, only_failing: false, line_width: 0 }
    }
}

/// Plain text formatter for audit reports
pub struct TextFormatter {
    config: TextConfig,
}

impl TextFormatter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, report: &AuditReport) -> String {
        convert_to_text(report, &self.config)
    }
}

/// Render a report as plain text
pub fn convert_to_text(report: &AuditReport, config: &TextConfig) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(report));
    output.push('\n');
    output.push_str(&module_table(&report.scoring.modules));

    for module in &report.scoring.modules {
        let rules: Vec<&RuleResult> = module
            .rules
            .iter()
            .filter(|r| !config.only_failing || r.status != RuleStatus::Pass)
            .collect();
        if rules.is_empty() {
            continue;
        }

        let _ = writeln!(output, "\n[{}] {}", module.module, module.title);
        for rule in rules {
            output.push_str(&rule_block(rule, config));
        }
    }

    if let Some(query) = &report.query {
        output.push('\n');
        output.push_str(&query_section(query, config));
    }

    output.trim_end().to_string()
}

fn generate_header(report: &AuditReport) -> String {
    let mut header = String::new();
    let title = format!("AEO audit: {}", report.url);
    let _ = writeln!(header, "{}", title);
    let _ = writeln!(header, "{}", "=".repeat(title.chars().count()));

    let mut meta_parts = Vec::new();
    if let Some(page_title) = &report.extraction.title {
        meta_parts.push(format!("Title: {}", page_title));
    }
    meta_parts.push(format!("Words: {}", report.extraction.word_count));
    meta_parts.push(format!("Content: {}", report.extraction.content_selector));
    let _ = writeln!(header, "{}", meta_parts.join(" | "));

    let scoring = &report.scoring;
    let _ = writeln!(header, "Overall: {}/{} ({})", scoring.overall_score, scoring.max_score, scoring.grade);
    header
}

fn module_table(modules: &[ModuleScore]) -> String {
    let mut table = String::new();
    let _ = writeln!(table, "{:<30} {:>7}  {}", "Module", "Score", "Grade");
    for module in modules {
        let name = format!("{} {}", module.module, module.title);
        let points = format!("{}/{}", module.earned_points, module.max_points);
        let _ = writeln!(table, "{:<30} {:>7}  {}", name, points, module.grade);
    }
    table
}

fn rule_block(rule: &RuleResult, config: &TextConfig) -> String {
    let mut block = String::new();
    let status = rule.status.to_string().to_uppercase();
    let _ = writeln!(
        block,
        "  {:<4}  {} {} ({}/{})",
        status, rule.id, rule.title, rule.earned_points, rule.max_points
    );

    if config.show_evidence {
        for line in &rule.evidence {
            push_wrapped(&mut block, "        - ", line, config.line_width);
        }
    }
    if config.show_recommendations && rule.status != RuleStatus::Pass {
        push_wrapped(&mut block, "        > ", &rule.recommendation, config.line_width);
    }
    block
}

fn query_section(query: &QueryAnalysis, config: &TextConfig) -> String {
    let mut section = String::new();
    let _ = writeln!(section, "Query: \"{}\" (intent: {}, topic: {})", query.query, query.query_intent, query.topic);
    let _ = writeln!(section, "Fit score: {}/100", query.query_fit_score);
    let _ = writeln!(
        section,
        "Coverage: title {}%, headings {}%, content {}%",
        query.coverage.title_match, query.coverage.headings_match, query.coverage.content_match
    );

    match &query.answer_draft {
        Some(draft) => push_wrapped(&mut section, "Answer draft: ", draft, config.line_width),
        None => section.push_str("Answer draft: none\n"),
    }

    if !query.suggested_faqs.is_empty() {
        section.push_str("Suggested FAQs:\n");
        for (index, faq) in query.suggested_faqs.iter().enumerate() {
            let _ = writeln!(section, "  {}. {}", index + 1, faq);
        }
    }

    if !query.missing_elements.is_empty() {
        section.push_str("Missing:\n");
        for missing in &query.missing_elements {
            push_wrapped(&mut section, "  - ", missing, config.line_width);
        }
    }
    section
}

/// Append `text` after `prefix`, wrapped to `width` with continuation lines
/// indented to the prefix.
fn push_wrapped(out: &mut String, prefix: &str, text: &str, width: usize) {
    let indent = " ".repeat(prefix.chars().count());
    let lines = wrap_text(text, width.saturating_sub(indent.len()));
    for (index, line) in lines.iter().enumerate() {
        out.push_str(if index == 0 { prefix } else { &indent });
        out.push_str(line);
        out.push('\n');
    }
}

/// Wrap text to specified line width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut result = Vec::new();
    let mut current_line = String::new();
    let mut current_length = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push_str(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_length += 1 + word_len;
        } else {
            result.push(std::mem::take(&mut current_line));
            current_line.push_str(word);
            current_length = word_len;
        }
    }

    if !current_line.is_empty() || result.is_empty() {
        result.push(current_line);
    }

    result
}
