//! HTML extraction: title, visible text and absolute outbound links.
//!
//! One walk over the parse tree in document order. The `<head>` subtree
//! contributes the title but no text; `<script>`/`<style>` text is
//! skipped everywhere.

use ego_tree::iter::Edge;
use scraper::{Html, node::Node};

use crate::models::PageData;
use crate::urlutil::resolve_url;

/// Parse `html` and collect the page snapshot.
///
/// - `title` is the first `<title>` with a text child.
/// - every `<a href>` resolving against `base_url` is appended to
///   `outbound_links` in document order.
/// - trimmed non-empty text nodes outside `<head>`/`<script>`/`<style>`
///   join `text_content`, separated by single spaces.
///
/// `status_code` and `load_time` are left for the caller to fill in.
pub fn extract(html: &str, base_url: &str) -> PageData {
    let document = Html::parse_document(html);

    let mut data = PageData {
        url: base_url.to_string(),
        ..PageData::default()
    };
    let mut text = String::new();
    let mut head_depth = 0usize;

    for edge in document.tree.root().traverse() {
        match edge {
            Edge::Open(node) => match node.value() {
                Node::Element(element) => {
                    let name = element.name();
                    if name == "head" {
                        head_depth += 1;
                    }
                    if name == "a"
                        && let Some(href) = element.attr("href")
                        && let Some(absolute) = resolve_url(base_url, href)
                        && !absolute.is_empty()
                    {
                        data.outbound_links.push(absolute);
                    }
                    if name == "title" && data.title.is_empty() {
                        let first_text = node.children().find_map(|child| match child.value() {
                            Node::Text(t) => Some(t.text.to_string()),
                            _ => None,
                        });
                        if let Some(t) = first_text {
                            data.title = t;
                        }
                    }
                }
                Node::Text(t) => {
                    if head_depth == 0 && text_parent_visible(&node) {
                        let trimmed = t.trim();
                        if !trimmed.is_empty() {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(trimmed);
                        }
                    }
                }
                _ => {}
            },
            Edge::Close(node) => {
                if let Node::Element(element) = node.value()
                    && element.name() == "head"
                {
                    head_depth -= 1;
                }
            }
        }
    }

    data.text_content = text;
    data
}

/// Link-only fast path: every `a[href]` resolved against `base_url`, in
/// document order.
#[must_use]
pub fn extract_outbound_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for edge in document.tree.root().traverse() {
        if let Edge::Open(node) = edge
            && let Node::Element(element) = node.value()
            && element.name() == "a"
            && let Some(href) = element.attr("href")
            && let Some(absolute) = resolve_url(base_url, href)
            && !absolute.is_empty()
        {
            links.push(absolute);
        }
    }

    links
}

fn text_parent_visible(node: &ego_tree::NodeRef<'_, Node>) -> bool {
    node.parent().is_none_or(|parent| match parent.value() {
        Node::Element(element) => element.name() != "script" && element.name() != "style",
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_takes_the_first_title_element() {
        let html = "<html><head><title>First</title></head>\
                    <body><title>Second</title></body></html>";
        assert_eq!(extract(html, "https://example.com").title, "First");
    }

    #[test]
    fn head_text_is_skipped_but_body_text_kept() {
        let html = "<html><head><title>T</title><style>body{}</style></head>\
                    <body><p>hello   world</p></body></html>";
        let data = extract(html, "https://example.com");
        assert_eq!(data.text_content, "hello   world");
    }

    #[test]
    fn text_nodes_collapse_to_single_space_separation() {
        let html = "<body><p>  one  </p><div>two</div>\n<span>three</span></body>";
        let data = extract(html, "https://example.com");
        assert_eq!(data.text_content, "one two three");
    }

    #[test]
    fn anchors_without_href_are_ignored() {
        let html = r##"<body><a name="top">x</a><a href="/a">a</a></body>"##;
        let links = extract_outbound_links(html, "https://example.com");
        assert_eq!(links, vec!["https://example.com/a"]);
    }

    #[test]
    fn link_only_path_matches_full_extraction() {
        let html = r#"<body><a href="/a">a</a><a href="b/c">b</a>
                      <a href="https://other.org/x">c</a></body>"#;
        let base = "https://example.com/dir/page";
        let full = extract(html, base);
        let fast = extract_outbound_links(html, base);
        assert_eq!(full.outbound_links, fast);
    }
}
