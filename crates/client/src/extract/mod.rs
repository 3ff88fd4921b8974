//! Page record extraction from HTML.
//!
//! Turns a page into `{title, content, imageUrl, url, tags}` using fixed,
//! prioritised rules over the parsed document.
//!
//! ### Rules
//! - Title: `og:title`, then `<title>`.
//! - Image: `og:image`, then `twitter:image`.
//! - Content: first matching container (`article`, `.article-content`,
//!   `.post-content`, `.content`, `main`), else the first three paragraphs.
//! - Tags: comma-separated `keywords` meta tag.
//!
//! ### Failure Model
//! - Field rules never fail; a missing signal yields an empty value.
//! - Only a body that cannot be treated as markup at all is an error.
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait for loose coupling between callers and the rule set.

pub mod content;
pub mod normalize;
pub mod rules;

pub use content::{CONTENT_SELECTORS, ContentSource, resolve_content};
pub use normalize::{join_blocks, normalize_block};
pub use rules::{resolve_image, resolve_tags, resolve_title, split_tags};

use scraper::Html;
use scrapbook_core::Error;
use serde::{Deserialize, Serialize};

/// How many leading characters are inspected for binary content.
const BINARY_SNIFF_CHARS: usize = 1024;

/// A sniffed prefix with more than one control character in this many is binary.
const BINARY_CONTROL_RATIO: usize = 20;

/// Structured record extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Page title, possibly empty
    pub title: String,
    /// Normalised primary text, possibly empty
    pub content: String,
    /// Lead image URL as declared by the page, possibly empty
    pub image_url: String,
    /// The URL the caller asked for, unchanged
    #[serde(rename = "url")]
    pub source_url: String,
    /// Trimmed, non-empty keywords in page order
    pub tags: Vec<String>,
}

/// Stable extractor trait for page extraction.
///
/// This allows swapping the rule set later without changing callers.
pub trait Extractor: Send + Sync {
    /// Extract a record from `html`, echoing `source_url` into the result.
    fn extract(&self, html: &str, source_url: &str) -> Result<ExtractionResult, Error>;
}

/// Extractor applying the built-in metadata and content rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleExtractor;

impl RuleExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for RuleExtractor {
    fn extract(&self, html: &str, source_url: &str) -> Result<ExtractionResult, Error> {
        let doc = parse_html(html)?;

        let title = resolve_title(&doc);
        let image_url = resolve_image(&doc);
        let (content, content_source) = resolve_content(&doc);
        let tags = resolve_tags(&doc);

        tracing::debug!(
            source_url,
            title_len = title.len(),
            has_image = !image_url.is_empty(),
            content_len = content.len(),
            content_source = ?content_source,
            tags = tags.len(),
            "extracted page record"
        );

        Ok(ExtractionResult { title, content, image_url, source_url: source_url.to_string(), tags })
    }
}

/// Parse `html` permissively.
///
/// Malformed markup is recovered by the HTML5 tree builder and is not an
/// error. Binary data (a NUL character near the start) is rejected.
pub fn parse_html(html: &str) -> Result<Html, Error> {
    if looks_binary(html) {
        return Err(Error::ParseFailed("body is binary data, not an HTML document".into()));
    }

    let doc = Html::parse_document(html);
    if !doc.errors.is_empty() {
        tracing::trace!(errors = doc.errors.len(), "recovered from malformed markup");
    }

    Ok(doc)
}

/// C0 control density over the leading characters, ignoring tab, newline,
/// form feed and carriage return. A stray NUL in real markup stays below the bar.
fn looks_binary(html: &str) -> bool {
    let (sniffed, controls) = html
        .chars()
        .take(BINARY_SNIFF_CHARS)
        .fold((0usize, 0usize), |(n, ctl), c| {
            let is_ctl = c < ' ' && !matches!(c, '\t' | '\n' | '\r' | '\x0C');
            (n + 1, ctl + usize::from(is_ctl))
        });
    controls * BINARY_CONTROL_RATIO > sniffed
}

/// Extract a page record from HTML using the default extractor.
pub fn extract_html(html: &str, source_url: &str) -> Result<ExtractionResult, Error> {
    RuleExtractor::new().extract(html, source_url)
}
