use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::Document;

/// A heading in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// 1 through 6
    pub level: u8,
    pub text: String,
}

/// One `<script type="application/ld+json">` block.
///
/// Blocks are parsed independently; a block that is not valid JSON keeps its
/// raw text with `parsed` and `schema_type` set to `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonLdBlock {
    pub raw: String,
    pub parsed: Option<Value>,
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
}

impl JsonLdBlock {
    /// Parses a raw block.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_string();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                let schema_type = primary_type(&value);
                Self { raw, parsed: Some(value), schema_type }
            }
            Err(err) => {
                tracing::warn!(error = %err, "invalid JSON-LD block");
                Self { raw, parsed: None, schema_type: None }
            }
        }
    }

    /// True when the block parsed and declares an `@context`.
    ///
    /// For top-level arrays one item with `@context` is enough.
    pub fn has_context(&self) -> bool {
        match &self.parsed {
            Some(Value::Object(map)) => map.contains_key("@context"),
            Some(Value::Array(items)) => items
                .iter()
                .any(|item| item.as_object().is_some_and(|m| m.contains_key("@context"))),
            _ => false,
        }
    }

    /// Every object node of the block: the top-level object, items of
    /// top-level arrays, and members of `@graph` arrays, recursively.
    pub fn nodes(&self) -> Vec<&Map<String, Value>> {
        let mut nodes = Vec::new();
        if let Some(value) = &self.parsed {
            collect_nodes(value, &mut nodes);
        }
        nodes
    }
}

fn collect_nodes<'a>(value: &'a Value, nodes: &mut Vec<&'a Map<String, Value>>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, nodes);
            }
        }
        Value::Object(map) => {
            nodes.push(map);
            if let Some(graph) = map.get("@graph") {
                collect_nodes(graph, nodes);
            }
        }
        _ => {}
    }
}

/// The `@type` values of a node, accepting both string and array forms.
pub fn node_types(node: &Map<String, Value>) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// A string-valued field of a node, trimmed, if non-empty.
pub fn node_str<'a>(node: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    node.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn primary_type(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => node_types(map).first().map(|t| t.to_string()),
        Value::Array(items) => items.iter().find_map(primary_type),
        _ => None,
    }
}

/// Signals read from the untouched document and response headers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub h1: Option<String>,
    pub headings: Vec<Heading>,
    pub json_ld: Vec<JsonLdBlock>,
    pub robots_meta: Option<String>,
    pub script_count: usize,
}

impl Document {
    /// Extract the meta description, falling back to `og:description`
    pub fn extract_description(&self) -> Option<String> {
        self.get_meta_content("description")
            .or_else(|| self.get_meta_content("og:description"))
    }

    /// Extract the `href` of `<link rel="canonical">`
    pub fn extract_canonical(&self) -> Option<String> {
        self.select("link[rel][href]")
            .unwrap_or_default()
            .into_iter()
            .filter(|el| {
                el.attr("rel")
                    .is_some_and(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("canonical")))
            })
            .find_map(|el| el.attr("href").map(str::trim).filter(|h| !h.is_empty()).map(str::to_string))
    }

    /// Extract all non-empty headings in document order
    pub fn extract_headings(&self) -> Vec<Heading> {
        self.select("h1, h2, h3, h4, h5, h6")
            .unwrap_or_default()
            .into_iter()
            .filter_map(|el| {
                let level = el.tag_name()[1..].parse::<u8>().ok()?;
                let text = el.text();
                (!text.is_empty()).then_some(Heading { level, text })
            })
            .collect()
    }

    /// Extract every JSON-LD block, parsing each independently
    pub fn extract_json_ld_blocks(&self) -> Vec<JsonLdBlock> {
        self.select("script[type]")
            .unwrap_or_default()
            .into_iter()
            .filter(|el| {
                el.attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
            })
            .map(|el| JsonLdBlock::from_raw(&el.raw_text()))
            .collect()
    }

    /// Merge robots directives from `<meta name="robots">` and the
    /// `x-robots-tag` header into one comma-joined string
    pub fn extract_robots(&self, headers: &BTreeMap<String, String>) -> Option<String> {
        let mut directives: Vec<String> = self
            .select("meta[name][content]")
            .unwrap_or_default()
            .into_iter()
            .filter(|el| el.attr("name").is_some_and(|n| n.trim().eq_ignore_ascii_case("robots")))
            .filter_map(|el| el.attr("content").map(str::trim).filter(|c| !c.is_empty()).map(str::to_string))
            .collect();

        if let Some(header) = headers.get("x-robots-tag").map(|h| h.trim())
            && !header.is_empty()
        {
            directives.push(header.to_string());
        }

        (!directives.is_empty()).then(|| directives.join(", "))
    }

    /// Extract everything the raw document contributes to a page extraction
    pub fn extract_metadata(&self, headers: &BTreeMap<String, String>) -> PageMetadata {
        let headings = self.extract_headings();
        let h1 = headings.iter().find(|h| h.level == 1).map(|h| h.text.clone());

        PageMetadata {
            title: self.title(),
            description: self.extract_description(),
            canonical: self.extract_canonical(),
            h1,
            headings,
            json_ld: self.extract_json_ld_blocks(),
            robots_meta: self.extract_robots(headers),
            script_count: self.count("script"),
        }
    }

    /// Get meta tag content by `name` (case-insensitive) or `property`
    fn get_meta_content(&self, attr: &str) -> Option<String> {
        let by_name = self
            .select("meta[name][content]")
            .unwrap_or_default()
            .into_iter()
            .find(|el| el.attr("name").is_some_and(|n| n.trim().eq_ignore_ascii_case(attr)))
            .and_then(|el| el.attr("content"));

        let content = by_name.or_else(|| {
            self.select(&format!("meta[property=\"{}\"][content]", attr))
                .ok()?
                .first()
                .and_then(|el| el.attr("content"))
        })?;

        let content = content.trim();
        (!content.is_empty()).then(|| content.to_string())
    }
}

/// Lowercase header names and fold duplicates into a sorted map.
///
/// Values of names that differ only by case are comma-joined in sorted
/// original-name order so the result does not depend on map iteration order.
pub fn normalize_headers(headers: &HashMap<String, String>) -> BTreeMap<String, String> {
    let mut pairs: Vec<(&String, &String)> = headers.iter().collect();
    pairs.sort();

    let mut normalized: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in pairs {
        let key = name.trim().to_ascii_lowercase();
        let value = value.trim();
        normalized
            .entry(key)
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_WITH_META: &str = r#"
        <!DOCTYPE html>
        <html lang="en">
        <head>
            <meta charset="UTF-8">
            <title>  Answer Engine Optimization | Acme </title>
            <meta name="Description" content="How answer engines pick sources.">
            <meta property="og:description" content="OG Description">
            <meta name="robots" content="index, follow">
            <link rel="canonical" href="https://acme.test/aeo">
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": "AEO",
                "author": { "@type": "Person", "name": "Jane Smith" }
            }
            </script>
            <script type="application/ld+json">{ not json </script>
            <script type="application/ld+json">
            {
                "@context": "https://schema.org",
                "@graph": [
                    { "@type": "Organization", "name": "Acme" },
                    { "@type": ["WebPage", "FAQPage"], "name": "AEO guide" }
                ]
            }
            </script>
            <script src="/app.js"></script>
        </head>
        <body>
            <h1>Answer Engine Optimization</h1>
            <h2>What is AEO?</h2>
            <h3>  </h3>
            <h2>Sources</h2>
        </body>
        </html>
    "#;

    fn doc() -> Document {
        Document::parse(HTML_WITH_META)
    }

    #[test]
    fn test_extract_description_case_insensitive_name() {
        assert_eq!(doc().extract_description(), Some("How answer engines pick sources.".to_string()));
    }

    #[test]
    fn test_extract_description_og_fallback() {
        let doc = Document::parse(r#"<meta property="og:description" content="OG only">"#);
        assert_eq!(doc.extract_description(), Some("OG only".to_string()));
    }

    #[test]
    fn test_extract_canonical() {
        assert_eq!(doc().extract_canonical(), Some("https://acme.test/aeo".to_string()));
        assert_eq!(Document::parse("<p>none</p>").extract_canonical(), None);
    }

    #[test]
    fn test_extract_headings_in_order() {
        let headings = doc().extract_headings();
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 2]);
        assert_eq!(headings[1].text, "What is AEO?");
    }

    #[test]
    fn test_json_ld_blocks_isolated_failures() {
        let blocks = doc().extract_json_ld_blocks();
        assert_eq!(blocks.len(), 3);

        assert_eq!(blocks[0].schema_type.as_deref(), Some("Article"));
        assert!(blocks[0].has_context());

        assert!(blocks[1].parsed.is_none());
        assert!(blocks[1].schema_type.is_none());
        assert!(!blocks[1].has_context());
        assert_eq!(blocks[1].raw, "{ not json");

        assert!(blocks[2].has_context());
        assert_eq!(blocks[2].nodes().len(), 3);
    }

    #[test]
    fn test_node_types_string_and_array() {
        let blocks = doc().extract_json_ld_blocks();
        let types: Vec<&str> = blocks[2].nodes().into_iter().flat_map(node_types).collect();
        assert_eq!(types, vec!["Organization", "WebPage", "FAQPage"]);
    }

    #[test]
    fn test_extract_robots_merges_header() {
        let mut headers = BTreeMap::new();
        headers.insert("x-robots-tag".to_string(), "noindex".to_string());
        assert_eq!(doc().extract_robots(&headers), Some("index, follow, noindex".to_string()));
        assert_eq!(Document::parse("<p></p>").extract_robots(&BTreeMap::new()), None);
    }

    #[test]
    fn test_extract_metadata() {
        let metadata = doc().extract_metadata(&BTreeMap::new());
        assert_eq!(metadata.title, Some("Answer Engine Optimization | Acme".to_string()));
        assert_eq!(metadata.h1, Some("Answer Engine Optimization".to_string()));
        assert_eq!(metadata.script_count, 4);
        assert_eq!(metadata.json_ld.len(), 3);
    }

    #[test]
    fn test_normalize_headers() {
        let mut headers = HashMap::new();
        headers.insert("X-Robots-Tag".to_string(), " noindex ".to_string());
        headers.insert("Content-Type".to_string(), "text/html".to_string());
        let normalized = normalize_headers(&headers);
        assert_eq!(normalized.get("x-robots-tag").map(String::as_str), Some("noindex"));
        assert_eq!(normalized.keys().collect::<Vec<_>>(), vec!["content-type", "x-robots-tag"]);
    }
}
