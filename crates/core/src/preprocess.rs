use std::sync::LazyLock;

use regex::Regex;

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex"));

/// Structural elements that never carry main content.
pub const NOISE_TAGS: &[&str] =
    &["header", "nav", "footer", "aside", "script", "style", "noscript", "svg", "iframe", "form"];

/// Common advertising, menu and modal containers.
pub const NOISE_CLASSES: &[&str] = &[
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    ".ad-container",
    ".ad-slot",
    ".sponsored",
    ".menu",
    ".nav-menu",
    ".mobile-menu",
    ".dropdown-menu",
    ".modal",
    ".modal-dialog",
    ".popup",
    ".cookie-banner",
    ".cookie-consent",
];

/// Configuration for noise removal before main-content detection
#[derive(Debug, Clone, PartialEq)]
pub struct CleanConfig {
    /// Selectors whose elements are removed together with their content
    pub noise_selectors: Vec<String>,
    /// Whether to strip HTML comments
    pub remove_comments: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            noise_selectors: NOISE_TAGS.iter().chain(NOISE_CLASSES).map(|s| s.to_string()).collect(),
            remove_comments: true,
        }
    }
}

/// Remove noise elements so that only candidate content remains.
///
/// Selectors the streaming rewriter cannot parse are skipped. If rewriting
/// fails the input is returned untouched.
pub fn clean_html(html: &str, config: &CleanConfig) -> String {
    let source = if config.remove_comments { COMMENTS.replace_all(html, "").into_owned() } else { html.to_string() };

    let selectors: Vec<&str> = config
        .noise_selectors
        .iter()
        .map(String::as_str)
        .filter(|sel| {
            let valid = sel.parse::<lol_html::Selector>().is_ok();
            if !valid {
                tracing::warn!(selector = %sel, "skipping unsupported noise selector");
            }
            valid
        })
        .collect();

    if selectors.is_empty() {
        return source;
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: selectors
                .iter()
                .map(|sel| {
                    lol_html::element!(*sel, |el| {
                        el.remove();
                        Ok(())
                    })
                })
                .collect(),
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(source.as_bytes()).is_err() {
        return source;
    }

    if rewriter.end().is_err() {
        return source;
    }

    if output.is_empty() { source } else { output }
}
