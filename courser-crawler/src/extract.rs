use scraper::{Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Elements whose subtrees carry no readable page content.
const SKIP_ELEMENTS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

pub const MAX_ANCHOR_TEXT_CHARS: usize = 200;

/// An outbound reference extracted from a page, with its URL resolved to
/// absolute form against the page's final URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// Flatten markup to readable text: drops script/style/nav/footer/header
/// subtrees, joins text nodes with line breaks, and collapses runs of three
/// or more newlines down to a single blank line.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks: Vec<&str> = Vec::new();
    collect_text(document.tree.root(), &mut chunks);
    collapse_blank_lines(&chunks.join("\n")).trim().to_string()
}

fn collect_text<'a>(node: ego_tree::NodeRef<'a, Node>, out: &mut Vec<&'a str>) {
    for child in node.children() {
        match child.value() {
            Node::Element(el) => {
                if !SKIP_ELEMENTS.contains(&el.name()) {
                    collect_text(child, out);
                }
            }
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed);
                }
            }
            _ => {}
        }
    }
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(ch);
            }
        } else {
            newline_run = 0;
            out.push(ch);
        }
    }
    out
}

/// Extract every anchor, resolved against `base_url`. Empty, fragment-only,
/// `javascript:` and `mailto:` targets are skipped; duplicates (by resolved
/// URL) keep the first occurrence and its anchor text.
pub fn extract_links(html: &str, base_url: &str) -> Vec<Link> {
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
        {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };
        let absolute = resolved.to_string();
        if !seen.insert(absolute.clone()) {
            continue;
        }

        let text: String = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        links.push(Link {
            url: absolute,
            text: clip(&text, MAX_ANCHOR_TEXT_CHARS),
        });
    }

    links
}

/// Bound a string to at most `max_chars` characters.
pub fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
