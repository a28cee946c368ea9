use std::collections::HashMap;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use aeo_audit_core::{AuditConfig, Auditor, FetchedPage, JsonConfig, TextConfig, convert_to_json, convert_to_text};
use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the audit report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Audit a saved HTML response for answer-engine readiness
#[derive(Parser, Debug)]
#[command(name = "aeo-audit")]
#[command(version)]
#[command(about = "Audit saved HTML pages for answer-engine readiness", long_about = None)]
struct Args {
    /// Saved HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Query to analyze against the page
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// URL the page was fetched from (used to classify links)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Response header, as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// HTTP status code of the saved response
    #[arg(long, default_value = "200", value_name = "CODE")]
    status: u16,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Show evidence lines under each rule (text only)
    #[arg(long)]
    evidence: bool,

    /// Only list rules that did not pass (text only)
    #[arg(long)]
    only_failing: bool,

    /// Include the extraction record (JSON only)
    #[arg(long)]
    extraction: bool,

    /// Keep the page text in the extraction record (JSON only)
    #[arg(long, requires = "extraction")]
    main_text: bool,

    /// Number of leading words used for answer detection
    #[arg(long, value_name = "NUM")]
    top_text_words: Option<usize>,

    /// Word count needed for full server-rendering credit
    #[arg(long, value_name = "NUM")]
    min_words: Option<usize>,

    /// Maximum link density before the readability rule fails
    #[arg(long, value_name = "RATIO")]
    link_density: Option<f64>,

    /// Wrap evidence and recommendations at this width (0 = no wrapping)
    #[arg(long, default_value = "0", value_name = "COLS")]
    width: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let Some((name, value)) = raw.split_once(':') else {
        bail!("Invalid header '{}': expected 'Name: value'", raw);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid header '{}': missing name", raw);
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn build_config(args: &Args) -> anyhow::Result<AuditConfig> {
    let mut builder = AuditConfig::builder();
    if let Some(words) = args.top_text_words {
        builder = builder.top_text_words(words);
    }
    if let Some(words) = args.min_words {
        builder = builder.min_server_words(words);
    }
    if let Some(density) = args.link_density {
        builder = builder.max_link_density(density);
    }

    let config = builder.build();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "aeo-audit", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let config = build_config(&args)?;
    let headers = args
        .headers
        .iter()
        .map(|raw| parse_header(raw))
        .collect::<anyhow::Result<HashMap<_, _>>>()?;
    let url = match &args.url {
        Some(url) => url.clone(),
        None if args.input == "-" => "stdin".to_string(),
        None => args.input.clone(),
    };
    if let Err(e) = url::Url::parse(&url) {
        tracing::warn!(%url, error = %e, "page URL does not parse; absolute links count as external");
    }

    let started = Instant::now();

    if args.verbose {
        let source =
            if args.input == "-" { "stdin".to_string() } else { format!("file {}", args.input.bright_white()) };
        echo::print_step(1, 3, &format!("Reading from {}", source));
    }

    let html = read_input(&args.input)?;
    let read_time = started.elapsed();

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        echo::print_detail("Status", &args.status.to_string());
        eprintln!();
        echo::print_step(2, 3, "Auditing page");
    }

    let page = FetchedPage::new(html, url, args.status).with_headers(headers);
    let audit_started = Instant::now();
    let report = Auditor::with_config(config)
        .audit(&page, args.query.as_deref())
        .context("Failed to audit page")?;
    let audit_time = audit_started.elapsed();

    if args.verbose {
        echo::print_audit_details(&report);
        if report.extraction.is_js_shell {
            echo::print_warning("Page looks like a client-rendered JavaScript shell");
        }
        echo::print_step(3, 3, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    let format_started = Instant::now();
    let output = match args.format {
        OutputFormat::Json => {
            let config = JsonConfig {
                pretty: args.pretty,
                include_extraction: args.extraction,
                include_main_text: args.main_text,
            };
            convert_to_json(&report, &config).context("Failed to serialize report")?
        }
        OutputFormat::Text => {
            let config = TextConfig {
                show_evidence: args.evidence,
                only_failing: args.only_failing,
                line_width: args.width,
                ..Default::default()
            };
            convert_to_text(&report, &config)
        }
    };
    let format_time = format_started.elapsed();

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", output))
                .with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            let colored = args.format == OutputFormat::Text
                && io::stdout().is_terminal()
                && std::env::var_os("NO_COLOR").is_none();
            if colored {
                print!("{}", echo::colorize_report(&output));
            } else {
                println!("{}", output);
            }
        }
    }

    if args.verbose {
        let timings = [("Read", read_time), ("Audit", audit_time), ("Format", format_time)];
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}
