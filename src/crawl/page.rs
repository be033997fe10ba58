//! HTML collaborators: visible-text and outbound-link extraction
//!
//! scraper's parser is error-tolerant, so malformed markup degrades to
//! whatever text and anchors survive parsing rather than failing the page.

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Check if a text node sits under markup that never renders as page text
fn has_hidden_ancestor(node: &NodeRef<Node>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if let Some(elem) = parent.value().as_element() {
            match elem.name() {
                "script" | "style" | "noscript" | "head" => return true,
                _ => {}
            }
        }
        current = parent.parent();
    }
    false
}

/// Strip markup down to the visible text of the page.
pub fn text_of(body: &str) -> String {
    let document = Html::parse_document(body);

    let mut text = String::new();
    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            if has_hidden_ancestor(&node) {
                continue;
            }
            let trimmed = text_node.trim();
            if !trimmed.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(trimmed);
            }
        }
    }
    text
}

/// Extract all absolute http(s) anchors, resolved against `base`, in
/// document order with duplicates removed.
pub fn extract_links(body: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(body);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Ok(url) = base.join(href) {
                if (url.scheme() == "http" || url.scheme() == "https")
                    && seen.insert(url.as_str().to_string())
                {
                    links.push(url);
                }
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_of_skips_markup_and_scripts() {
        let html = r#"<html><head><title>t</title><style>p { color: red; }</style></head>
            <body><p>Hello <b>world</b></p><script>var x = 1;</script></body></html>"#;
        let text = text_of(html);
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
        assert!(!text.contains("color"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn test_text_of_empty_document() {
        assert_eq!(text_of(""), "");
    }

    #[test]
    fn test_extract_links_resolves_relative() {
        let base = Url::parse("https://example.com/dir/page.html").unwrap();
        let html = r#"<a href="/about">a</a><a href="other.html">b</a>
            <a href="https://other.com/x">c</a>"#;
        let links = extract_links(html, &base);
        let strings: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(
            strings,
            vec![
                "https://example.com/about",
                "https://example.com/dir/other.html",
                "https://other.com/x"
            ]
        );
    }

    #[test]
    fn test_extract_links_skips_non_http_and_dedupes() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<a href="mailto:x@example.com">m</a><a href="/a">1</a><a href="/a">2</a>"#;
        let links = extract_links(html, &base);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://example.com/a");
    }

    #[test]
    fn test_extract_links_tolerates_malformed_markup() {
        let base = Url::parse("https://example.com/").unwrap();
        let html = r#"<a href="/ok"><div><p>unclosed"#;
        let links = extract_links(html, &base);
        assert_eq!(links.len(), 1);
    }
}
