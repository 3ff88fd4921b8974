//! Primary text selection.
//!
//! The first container selector that matches anything wins, even when the
//! matched element holds no text. Only a page matching none of them falls
//! back to its leading paragraphs.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::normalize::{join_blocks, trim_text};

/// Container selectors, in priority order.
pub const CONTENT_SELECTORS: &[&str] = &["article", ".article-content", ".post-content", ".content", "main"];

/// Number of leading `<p>` elements used when no container matches.
pub const FALLBACK_PARAGRAPHS: usize = 3;

static CONTAINERS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|css| (*css, Selector::parse(css).expect("invalid selector")))
        .collect()
});

static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").expect("invalid selector"));

/// Which rule produced the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// First element matching this container selector.
    Container(&'static str),
    /// Leading paragraphs of the document.
    Paragraphs,
}

/// Resolve the page's primary text and the rule it came from.
pub fn resolve_content(doc: &Html) -> (String, ContentSource) {
    if let Some((css, element)) = first_container(doc) {
        let text = element_text(element);
        return (join_blocks([text]), ContentSource::Container(css));
    }

    let paragraphs: Vec<String> = doc
        .select(&PARAGRAPH)
        .take(FALLBACK_PARAGRAPHS)
        .map(|p| trim_text(&element_text(p)).to_string())
        .collect();

    (join_blocks(paragraphs), ContentSource::Paragraphs)
}

/// First element of the first container selector with any match.
fn first_container(doc: &Html) -> Option<(&'static str, ElementRef<'_>)> {
    CONTAINERS
        .iter()
        .find_map(|(css, selector)| doc.select(selector).next().map(|element| (*css, element)))
}

/// All descendant text of `element`, concatenated.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
