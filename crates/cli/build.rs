use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("aeo-audit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Audit saved HTML pages for answer-engine readiness")
        .arg(clap::arg!([INPUT] "Saved HTML file, or '-' for stdin").default_value("-"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(clap::arg!(-q --query <QUERY> "Query to analyze against the page"))
        .arg(clap::arg!(-u --url <URL> "URL the page was fetched from (used to classify links)"))
        .arg(
            clap::arg!(-H --header <HEADER> "Response header, as 'Name: value' (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(--status <CODE> "HTTP status code of the saved response").default_value("200"))
        .arg(clap::arg!(--pretty "Pretty-print JSON output"))
        .arg(clap::arg!(--evidence "Show evidence lines under each rule (text only)"))
        .arg(clap::arg!(--"only-failing" "Only list rules that did not pass (text only)"))
        .arg(clap::arg!(--extraction "Include the extraction record (JSON only)"))
        .arg(clap::arg!(--"main-text" "Keep the page text in the extraction record (JSON only)"))
        .arg(clap::arg!(--"top-text-words" <NUM> "Number of leading words used for answer detection"))
        .arg(clap::arg!(--"min-words" <NUM> "Word count needed for full server-rendering credit"))
        .arg(clap::arg!(--"link-density" <RATIO> "Maximum link density before the readability rule fails"))
        .arg(clap::arg!(--width <COLS> "Wrap evidence and recommendations at this width").default_value("0"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "aeo-audit", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "aeo-audit", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
