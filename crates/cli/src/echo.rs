use std::time::Duration;

use aeo_audit_core::{AuditReport, Grade};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "aeo-audit".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Audit saved pages for answer-engine readiness\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print a short score summary after the audit step
pub fn print_audit_details(report: &AuditReport) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Audit Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Content", &report.extraction.content_selector);
    print_detail("Words", &report.extraction.word_count.to_string());
    eprintln!(
        "  {} {}/{} ({})\n",
        "Score:".dimmed(),
        report.scoring.overall_score.bright_white(),
        report.scoring.max_score,
        paint_grade(report.scoring.grade)
    );
}

/// Print timing summary
pub fn print_timing_summary(total: Duration, timings: &[(&str, Duration)]) {
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());

    for (label, duration) in timings {
        print_timing(label, *duration);
    }

    eprintln!(
        "  {} {:>8.2}ms\n",
        format!("{}:", "Total").bold().dimmed(),
        total.as_secs_f64() * 1000.0
    );
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn paint_grade(grade: Grade) -> String {
    match grade {
        Grade::A | Grade::B => grade.bright_green().bold().to_string(),
        Grade::C => grade.bright_yellow().bold().to_string(),
        Grade::D | Grade::F => grade.bright_red().bold().to_string(),
    }
}

/// Color the status column and overall line of a plain text report
pub fn colorize_report(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);

    for line in text.lines() {
        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if let Some(rest) = trimmed.strip_prefix("PASS") {
            out.push_str(&format!("{}{}{}", indent, "PASS".green().bold(), rest));
        } else if let Some(rest) = trimmed.strip_prefix("WARN") {
            out.push_str(&format!("{}{}{}", indent, "WARN".yellow().bold(), rest));
        } else if let Some(rest) = trimmed.strip_prefix("FAIL") {
            out.push_str(&format!("{}{}{}", indent, "FAIL".red().bold(), rest));
        } else if line.starts_with("Overall:") || line.starts_with("AEO audit:") {
            out.push_str(&line.bold().to_string());
        } else if trimmed.starts_with('>') {
            out.push_str(&line.dimmed().to_string());
        } else if line.starts_with('[') {
            out.push_str(&line.cyan().bold().to_string());
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_colorize_keeps_text() {
        let plain = "Overall: 40/100 (F)\n  PASS  A1 Direct answer (10/10)\n  FAIL  E2 Canonical (0/5)\n";
        let colored = colorize_report(plain);
        assert!(colored.contains("A1 Direct answer (10/10)"));
        assert!(colored.contains("E2 Canonical (0/5)"));
        assert!(colored.contains("\u{1b}["));
        assert_eq!(colored.lines().count(), 3);
    }
}
