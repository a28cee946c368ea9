//! CLI integration tests
use predicates::prelude::*;
use tempfile::TempDir;

const ARTICLE_URL: &str = "https://www.acme.test/guides/answer-engine-optimization";

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("aeo-audit")
}

fn get_fixture_path(name: &str) -> String {
    format!("../../tests/fixtures/{}", name)
}

#[test]
fn test_cli_file_input() {
    cmd()
        .args(["--url", ARTICLE_URL, &get_fixture_path("aeo_article.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("AEO audit: {}", ARTICLE_URL)))
        .stdout(predicate::str::contains("Overall: 100/100 (A)"));
}

#[test]
fn test_cli_stdin_input() {
    let html = std::fs::read_to_string(get_fixture_path("acme_home.html")).unwrap();
    cmd()
        .args(["--url", "https://acme.test/", "-"])
        .write_stdin(html)
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: 75/100 (C)"));
}

#[test]
fn test_cli_url_defaults_to_input() {
    cmd()
        .arg(get_fixture_path("acme_home.html"))
        .assert()
        .success()
        .stdout(predicate::str::contains("AEO audit: ../../tests/fixtures/acme_home.html"));
}

#[test]
fn test_cli_json_format() {
    let output = cmd()
        .args(["-f", "json", "--url", ARTICLE_URL, &get_fixture_path("aeo_article.html")])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["url"], ARTICLE_URL);
    assert_eq!(json["scoring"]["overallScore"], 100);
    assert_eq!(json["scoring"]["modules"].as_array().unwrap().len(), 6);
    assert!(json.get("extraction").is_none());
}

#[test]
fn test_cli_json_extraction() {
    let output = cmd()
        .args(["-f", "json", "--extraction", &get_fixture_path("acme_home.html")])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["extraction"]["h1"], "Acme Services");
    assert_eq!(json["extraction"]["mainText"], "");
}

#[test]
fn test_cli_main_text_requires_extraction() {
    cmd()
        .args(["-f", "json", "--main-text", &get_fixture_path("acme_home.html")])
        .assert()
        .failure();
}

#[test]
fn test_cli_pretty_json() {
    cmd()
        .args(["-f", "json", "--pretty", &get_fixture_path("acme_home.html")])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"url\""));
}

#[test]
fn test_cli_query() {
    cmd()
        .args(["--query", "What is Acme?", &get_fixture_path("acme_home.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Query: \"What is Acme?\" (intent: what, topic: Acme)"))
        .stdout(predicate::str::contains("Suggested FAQs:"));
}

#[test]
fn test_cli_header_noindex() {
    cmd()
        .args([
            "-f",
            "json",
            "-H",
            "X-Robots-Tag: noindex",
            &get_fixture_path("acme_home.html"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"robotsMeta\"").not())
        .stdout(predicate::str::contains("Robots directives: \\\"noindex\\\""));
}

#[test]
fn test_cli_invalid_header() {
    cmd()
        .args(["-H", "no-colon-here", &get_fixture_path("acme_home.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 'Name: value'"));
}

#[test]
fn test_cli_error_status() {
    cmd()
        .args(["--status", "503", &get_fixture_path("acme_home.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("status 503"));
}

#[test]
fn test_cli_evidence_and_only_failing() {
    cmd()
        .args(["--evidence", "--only-failing", &get_fixture_path("acme_home.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("FAIL  C1 Author attribution (0/7)"))
        .stdout(predicate::str::contains("        - No schema author and no \"By Name\" byline in the main text"))
        .stdout(predicate::str::contains("PASS").not());
}

#[test]
fn test_cli_output_file() {
    let tmp = TempDir::new().unwrap();
    let output = tmp.path().join("report.txt");

    cmd()
        .args(["-o", output.to_str().unwrap()])
        .arg(get_fixture_path("acme_home.html"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("Overall: 75/100 (C)"));
}

#[test]
fn test_cli_min_words_override() {
    cmd()
        .args(["--evidence", "--min-words", "1000", &get_fixture_path("acme_home.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Only "))
        .stdout(predicate::str::contains("Overall: 73/100 (C)"));
}

#[test]
fn test_cli_invalid_link_density() {
    cmd()
        .args(["--link-density", "1.5", &get_fixture_path("acme_home.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_cli_invalid_file() {
    cmd().arg("nonexistent.html").assert().failure();
}

#[test]
fn test_cli_empty_input() {
    cmd()
        .arg("-")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall: "));
}

#[test]
fn test_cli_js_shell() {
    cmd()
        .args(["--evidence", &get_fixture_path("js_shell.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Looks like a JavaScript shell: 8 script tags"));
}

#[test]
fn test_cli_verbose() {
    cmd()
        .args(["-v", &get_fixture_path("acme_home.html")])
        .assert()
        .success()
        .stderr(predicate::str::contains("aeo-audit"))
        .stderr(predicate::str::contains("Timing Summary"));
}

#[test]
fn test_cli_completions() {
    cmd()
        .args(["--completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aeo-audit"));
}

#[test]
fn test_cli_invalid_format() {
    cmd()
        .args(["-f", "markdown", &get_fixture_path("acme_home.html")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}
