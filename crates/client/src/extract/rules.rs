//! Ordered metadata rules for title, lead image and tags.
//!
//! Each field is resolved by walking a fixed list of rules; the first rule
//! producing a non-empty value wins. An attribute that is present but empty
//! counts as absent.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::normalize::trim_text;

/// Where a rule reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Named attribute of the first matching element.
    Attr(&'static str),
    /// Text of every matching element, concatenated in document order.
    Text,
}

/// A CSS selector paired with the place its value is read from.
#[derive(Debug)]
pub struct Rule {
    selector: Selector,
    source: Source,
}

impl Rule {
    fn new(css: &'static str, source: Source) -> Self {
        let selector = Selector::parse(css).expect("invalid selector");
        Self { selector, source }
    }

    /// Rule reading `name` from the first element matching `css`.
    pub fn attr(css: &'static str, name: &'static str) -> Self {
        Self::new(css, Source::Attr(name))
    }

    /// Rule reading the text of all elements matching `css`.
    pub fn text(css: &'static str) -> Self {
        Self::new(css, Source::Text)
    }

    /// Value this rule yields for `doc`, if any.
    pub fn apply(&self, doc: &Html) -> Option<String> {
        let value = match self.source {
            Source::Attr(name) => doc
                .select(&self.selector)
                .next()
                .and_then(|el| el.value().attr(name))
                .map(str::to_string)?,
            Source::Text => doc.select(&self.selector).flat_map(|el| el.text()).collect::<String>(),
        };

        if value.is_empty() { None } else { Some(value) }
    }
}

/// Evaluate `rules` in order and return the first non-empty value, or `""`.
pub fn first_match(rules: &[Rule], doc: &Html) -> String {
    rules.iter().find_map(|rule| rule.apply(doc)).unwrap_or_default()
}

pub static TITLE_RULES: LazyLock<[Rule; 2]> =
    LazyLock::new(|| [Rule::attr(r#"meta[property="og:title"]"#, "content"), Rule::text("title")]);

pub static IMAGE_RULES: LazyLock<[Rule; 2]> = LazyLock::new(|| {
    [
        Rule::attr(r#"meta[property="og:image"]"#, "content"),
        Rule::attr(r#"meta[property="twitter:image"]"#, "content"),
    ]
});

pub static KEYWORDS_RULE: LazyLock<Rule> = LazyLock::new(|| Rule::attr(r#"meta[name="keywords"]"#, "content"));

/// Page title: `og:title`, then `<title>` text, then empty.
///
/// The title is returned as written; it is not trimmed.
pub fn resolve_title(doc: &Html) -> String {
    first_match(TITLE_RULES.as_slice(), doc)
}

/// Lead image URL: `og:image`, then `twitter:image`, then empty.
pub fn resolve_image(doc: &Html) -> String {
    first_match(IMAGE_RULES.as_slice(), doc)
}

/// Tags from the comma-separated `keywords` meta tag.
///
/// Candidates are trimmed and empty ones dropped. Order is kept and
/// duplicates are not removed.
pub fn resolve_tags(doc: &Html) -> Vec<String> {
    let keywords = KEYWORDS_RULE.apply(doc).unwrap_or_default();
    split_tags(&keywords)
}

/// Split a comma-separated keyword list into tags.
pub fn split_tags(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(trim_text)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
