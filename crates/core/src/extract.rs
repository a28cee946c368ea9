use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use url::Url;

use crate::metadata::{Heading, JsonLdBlock, normalize_headers};
use crate::parse::{ContentNode, Document, Element};
use crate::preprocess::CleanConfig;
use crate::text::{MIN_SENTENCE_CHARS, count_words, first_words, split_sentences};

/// Main-content selectors in priority order; earlier entries win score ties.
pub const CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=main]",
    ".content",
    ".post",
    ".article",
    ".entry-content",
    ".post-content",
    "#content",
    "#main",
];

/// Share-button destinations that do not count as cited sources.
pub const SOCIAL_SHARE_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "pinterest.com",
    "instagram.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "reddit.com",
    "whatsapp.com",
    "wa.me",
    "t.me",
];

/// Configuration for content extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Number of leading words of the main text kept as `top_text`
    pub top_text_words: usize,
    /// A selector candidate needs more words than this
    pub min_candidate_words: usize,
    /// A body child needs more words than this to be a fallback candidate
    pub fallback_min_words: usize,
    /// Score added per descendant heading
    pub heading_weight: f64,
    /// Score added per descendant list
    pub list_weight: f64,
    /// Multiplier applied to the anchor-word ratio and subtracted from the score
    pub link_density_penalty: f64,
    /// Sentences of this many characters or fewer are ignored
    pub min_sentence_chars: usize,
    /// A page with fewer words than this may be a JavaScript shell
    pub js_shell_max_words: usize,
    /// A page with more script tags than this may be a JavaScript shell
    pub js_shell_min_scripts: usize,
    /// Main-content selectors in priority order
    pub candidate_selectors: Vec<String>,
    /// Noise removal applied before candidate selection
    pub clean: CleanConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            top_text_words: 1200,
            min_candidate_words: 50,
            fallback_min_words: 100,
            heading_weight: 30.0,
            list_weight: 20.0,
            link_density_penalty: 200.0,
            min_sentence_chars: MIN_SENTENCE_CHARS,
            js_shell_max_words: 400,
            js_shell_min_scripts: 5,
            candidate_selectors: CANDIDATE_SELECTORS.iter().map(|s| s.to_string()).collect(),
            clean: CleanConfig::default(),
        }
    }
}

/// Sentence length statistics, in words
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceStats {
    pub count: usize,
    pub avg_length: f64,
    pub min_length: usize,
    pub max_length: usize,
}

impl SentenceStats {
    fn from_sentences(sentences: &[String]) -> Self {
        let lengths: Vec<usize> = sentences.iter().map(|s| count_words(s)).collect();
        if lengths.is_empty() {
            return Self::default();
        }
        let total: usize = lengths.iter().sum();
        Self {
            count: lengths.len(),
            avg_length: total as f64 / lengths.len() as f64,
            min_length: lengths.iter().copied().min().unwrap_or(0),
            max_length: lengths.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Everything the scoring rules and the query analyzer read about one page.
///
/// Built once by [`extract`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageExtraction {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub h1: Option<String>,
    pub headings: Vec<Heading>,
    pub main_text: String,
    /// The first `top_text_words` words of `main_text`
    pub top_text: String,
    pub word_count: usize,
    pub lists_count: usize,
    pub tables_count: usize,
    pub internal_links_count: usize,
    pub external_links_count: usize,
    pub external_links: BTreeSet<String>,
    pub json_ld: Vec<JsonLdBlock>,
    pub robots_meta: Option<String>,
    pub response_headers: BTreeMap<String, String>,
    /// Anchor words over total words of the main content, in `[0, 1]`
    pub link_density: f64,
    pub sentence_stats: SentenceStats,
    pub is_js_shell: bool,
    /// `<script>` tags in the raw document
    pub script_count: usize,
    /// Selector (or fallback) that produced the main content
    pub content_selector: String,
}

impl PageExtraction {
    /// Number of H1 headings on the page.
    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.level == 1).count()
    }
}

/// Score components of a main-content candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub words: usize,
    pub headings: usize,
    pub lists: usize,
    pub anchor_words: usize,
    pub score: f64,
}

/// The element chosen as main content and where it came from
#[derive(Debug, Clone)]
pub struct MainContent<N> {
    pub node: N,
    pub source: String,
    pub score: Option<CandidateScore>,
}

/// Score a candidate:
/// `words + headings·heading_weight + lists·list_weight − (anchor_words/words)·link_density_penalty`
pub fn score_candidate<N: ContentNode>(node: &N, config: &ExtractConfig) -> CandidateScore {
    let words = count_words(&node.text());
    let headings = node.count("h1, h2, h3, h4, h5, h6");
    let lists = node.count("ul, ol");
    let anchor_words: usize = node.find("a").iter().map(|a| count_words(&a.text())).sum();

    let penalty = if words == 0 { 0.0 } else { anchor_words as f64 / words as f64 * config.link_density_penalty };
    let score =
        words as f64 + headings as f64 * config.heading_weight + lists as f64 * config.list_weight - penalty;

    CandidateScore { words, headings, lists, anchor_words, score }
}

/// Pick the best of `nodes` whose word count exceeds `min_words`.
///
/// Only a strictly higher score replaces the current best, so earlier
/// entries win ties.
fn best_of<N: ContentNode>(
    nodes: impl IntoIterator<Item = (N, String)>, min_words: usize, config: &ExtractConfig,
) -> Option<MainContent<N>> {
    let mut best: Option<MainContent<N>> = None;
    for (node, source) in nodes {
        let score = score_candidate(&node, config);
        if score.words <= min_words {
            continue;
        }
        let beats = best
            .as_ref()
            .and_then(|b| b.score.as_ref())
            .is_none_or(|b| score.score > b.score);
        if beats {
            best = Some(MainContent { node, source, score: Some(score) });
        }
    }
    best
}

/// Choose the main-content node.
///
/// 1. Every element matching a candidate selector with more than
///    `min_candidate_words` words; highest score wins, ties go to selector
///    priority and then document order.
/// 2. Direct children of `body` with more than `fallback_min_words` words.
/// 3. `body` itself.
pub fn select_main_content<N: ContentNode + Clone>(root: &N, body: &N, config: &ExtractConfig) -> MainContent<N> {
    let selector_candidates = config
        .candidate_selectors
        .iter()
        .flat_map(|sel| root.find(sel).into_iter().map(move |node| (node, sel.clone())));

    if let Some(best) = best_of(selector_candidates, config.min_candidate_words, config) {
        return best;
    }

    let children = body.children().into_iter().map(|node| (node, "body > *".to_string()));
    if let Some(best) = best_of(children, config.fallback_min_words, config) {
        return best;
    }

    MainContent { node: body.clone(), source: "body".to_string(), score: None }
}

/// How an anchor relates to the audited page
#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkKind {
    Internal,
    External(String),
    Social,
    Ignored,
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_social_host(host: &str) -> bool {
    let host = strip_www(host);
    SOCIAL_SHARE_HOSTS
        .iter()
        .any(|social| host == *social || host.ends_with(&format!(".{}", social)))
}

fn classify_link(href: &str, page: Option<&Url>) -> LinkKind {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return LinkKind::Ignored;
    }

    let resolved = match page {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    let mut resolved = match resolved {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => return LinkKind::Internal,
        Err(_) => return LinkKind::Ignored,
    };

    if !matches!(resolved.scheme(), "http" | "https") {
        return LinkKind::Ignored;
    }

    let Some(host) = resolved.host_str().map(|h| h.to_ascii_lowercase()) else {
        return LinkKind::Ignored;
    };

    if let Some(page_host) = page.and_then(Url::host_str)
        && strip_www(&host) == strip_www(&page_host.to_ascii_lowercase())
    {
        return LinkKind::Internal;
    }

    if is_social_host(&host) {
        return LinkKind::Social;
    }

    resolved.set_fragment(None);
    LinkKind::External(resolved.to_string())
}

/// Internal anchor count and deduplicated external URLs inside `element`
fn collect_links(element: &Element<'_>, page: Option<&Url>) -> (usize, BTreeSet<String>) {
    let mut internal = 0;
    let mut external = BTreeSet::new();

    for anchor in element.select("a[href]").unwrap_or_default() {
        match anchor.attr("href").map(|href| classify_link(href, page)) {
            Some(LinkKind::Internal) => internal += 1,
            Some(LinkKind::External(url)) => {
                external.insert(url);
            }
            _ => {}
        }
    }

    (internal, external)
}

/// Extract a page with the default configuration.
///
/// Never fails: malformed markup degrades to near-empty output, and an
/// unparsable `url` only disables host matching for links.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use aeo_audit_core::extract;
///
/// let html = "<html><head><title>Demo</title></head><body><p>Hello world.</p></body></html>";
/// let page = extract(html, &HashMap::new(), "https://example.com/");
/// assert_eq!(page.title.as_deref(), Some("Demo"));
/// assert_eq!(page.word_count, 2);
/// ```
pub fn extract(html: &str, headers: &HashMap<String, String>, url: &str) -> PageExtraction {
    extract_with_config(html, headers, url, &ExtractConfig::default())
}

/// Extract a page with a custom configuration.
pub fn extract_with_config(
    html: &str, headers: &HashMap<String, String>, url: &str, config: &ExtractConfig,
) -> PageExtraction {
    let response_headers = normalize_headers(headers);
    let page_url = Url::parse(url).ok();
    if page_url.is_none() {
        tracing::debug!(url, "page URL did not parse; links are classified without a host");
    }

    let raw = Document::parse(html);
    let meta = raw.extract_metadata(&response_headers);

    let cleaned = Document::parse_cleaned(html, &config.clean);
    let root = cleaned.root();
    let body = cleaned.body().unwrap_or(root);
    let main = select_main_content(&root, &body, config);

    let element = main.node;
    let main_text = element.text();
    let word_count = count_words(&main_text);
    let top_text = first_words(&main_text, config.top_text_words);

    let anchor_words = match &main.score {
        Some(score) => score.anchor_words,
        None => score_candidate(&element, config).anchor_words,
    };
    let link_density = if word_count == 0 { 0.0 } else { (anchor_words as f64 / word_count as f64).min(1.0) };

    let (internal_links_count, external_links) = collect_links(&element, page_url.as_ref());
    let sentence_stats = SentenceStats::from_sentences(&split_sentences(&main_text, config.min_sentence_chars));
    let is_js_shell = word_count < config.js_shell_max_words && meta.script_count > config.js_shell_min_scripts;

    tracing::debug!(
        selector = %main.source,
        score = main.score.as_ref().map(|s| s.score),
        word_count,
        is_js_shell,
        "selected main content"
    );

    PageExtraction {
        url: url.to_string(),
        title: meta.title,
        description: meta.description,
        canonical: meta.canonical,
        h1: meta.h1,
        headings: meta.headings,
        main_text,
        top_text,
        word_count,
        lists_count: element.count("ul, ol"),
        tables_count: element.count("table"),
        internal_links_count,
        external_links_count: external_links.len(),
        external_links,
        json_ld: meta.json_ld,
        robots_meta: meta.robots_meta,
        response_headers,
        link_density,
        sentence_stats,
        is_js_shell,
        script_count: meta.script_count,
        content_selector: main.source,
    }
}
