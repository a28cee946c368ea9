//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors, plus the
//! [`ContentNode`] capability set that main-content selection is written
//! against.
//!
//! # Example
//!
//! ```rust
//! use aeo_audit_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::preprocess::{self, CleanConfig};
use crate::text::{count_words, normalize_whitespace};
use crate::{AuditError, Result};

/// Elements whose boundaries separate words even when the markup has no
/// whitespace between them.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Elements whose text never counts as page content.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Represents a parsed HTML document.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::parse::Document;
///
/// let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
/// let doc = Document::parse(html);
/// assert_eq!(doc.title(), Some("Test".to_string()));
/// ```
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string without cleaning.
    ///
    /// html5ever recovers from any malformed input, so parsing never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Parses HTML after stripping the noise elements named in `config`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aeo_audit_core::parse::Document;
    /// use aeo_audit_core::CleanConfig;
    ///
    /// let html = "<html><body><nav>Menu</nav><article>Content</article></body></html>";
    /// let doc = Document::parse_cleaned(html, &CleanConfig::default());
    /// assert!(doc.select("nav").unwrap().is_empty());
    /// ```
    pub fn parse_cleaned(html: &str, config: &CleanConfig) -> Self {
        let cleaned = preprocess::clean_html(html, config);
        Self::parse(&cleaned)
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aeo_audit_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the first element matching a selector, if any.
    pub fn first(&'_ self, selector: &str) -> Option<Element<'_>> {
        self.select(selector).ok()?.into_iter().next()
    }

    /// Gets the whitespace-normalized title of the document.
    ///
    /// Returns `None` when `<title>` is missing or blank.
    pub fn title(&self) -> Option<String> {
        self.first("title").map(|el| el.text()).filter(|t| !t.is_empty())
    }

    /// Gets the `<body>` element.
    ///
    /// html5ever always synthesizes a body, so this only returns `None` for
    /// fragments that were parsed unusually.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        self.first("body")
    }

    /// Gets the root `<html>` element.
    pub fn root(&'_ self) -> Element<'_> {
        Element { element: self.html.root_element() }
    }

    /// Counts elements matching a selector anywhere in the document.
    pub fn count(&self, selector: &str) -> usize {
        self.select(selector).map(|els| els.len()).unwrap_or(0)
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use aeo_audit_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the whitespace-normalized text content of this element.
    ///
    /// Block-level boundaries are treated as whitespace and script/style text
    /// is skipped, so `<p>one</p><p>two</p>` reads as `"one two"`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        push_text(self.element, &mut out);
        normalize_whitespace(&out)
    }

    /// Gets the concatenated text nodes exactly as they appear in the source.
    pub fn raw_text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the number of whitespace-delimited words in this element.
    pub fn word_count(&self) -> usize {
        count_words(&self.text())
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }

    /// Gets the outer HTML of this element.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = parse_selector(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the direct element children of this element.
    pub fn element_children(&self) -> Vec<Element<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|el| Element { element: el })
            .collect()
    }
}

/// The DOM capabilities main-content selection relies on.
///
/// Keeping candidate scoring generic over this trait means it only needs
/// selector lookup, text, children and descendant counts.
pub trait ContentNode: Sized {
    /// Descendants matching `selector`, in document order.
    fn find(&self, selector: &str) -> Vec<Self>;

    /// Whitespace-normalized text content.
    fn text(&self) -> String;

    /// Direct element children.
    fn children(&self) -> Vec<Self>;

    /// Number of descendants matching `selector`.
    fn count(&self, selector: &str) -> usize {
        self.find(selector).len()
    }
}

impl<'a> ContentNode for Element<'a> {
    fn find(&self, selector: &str) -> Vec<Self> {
        self.select(selector).unwrap_or_default()
    }

    fn text(&self) -> String {
        Element::text(self)
    }

    fn children(&self) -> Vec<Self> {
        self.element_children()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AuditError::HtmlParseError(format!("Invalid selector: {}", e)))
}

fn push_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if NON_TEXT_ELEMENTS.contains(&name) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push(' ');
                }
                push_text(child_ref, out);
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}
