//! Whitespace normalisation for extracted text.
//!
//! Whitespace here means the ECMAScript `\s` set, so text scraped from the
//! same page normalises identically to what a browser-side scraper produces.

use std::sync::LazyLock;

use regex::Regex;

/// Runs of whitespace inside one block of text.
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]+")
        .expect("valid whitespace regex")
});

/// A newline, optional whitespace, then another newline.
static BLANK_LINE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]*\n")
        .expect("valid blank line regex")
});

/// Separator placed between blocks by [`join_blocks`].
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Whether `c` is whitespace in the ECMAScript sense.
pub fn is_text_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Trim leading and trailing whitespace.
pub fn trim_text(s: &str) -> &str {
    s.trim_matches(is_text_whitespace)
}

/// Collapse every whitespace run in one block of text to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").into_owned()
}

/// Collapse every newline / whitespace / newline sequence to exactly one blank line.
pub fn collapse_blank_lines(s: &str) -> String {
    BLANK_LINE_RUN.replace_all(s, BLOCK_SEPARATOR).into_owned()
}

/// Normalise a single block: trim, then collapse whitespace runs.
pub fn normalize_block(s: &str) -> String {
    collapse_whitespace(trim_text(s))
}

/// Normalise each block, join them with a blank line, collapse repeated blank
/// lines and trim the result.
///
/// Whitespace inside a block never survives as a newline; only the joins
/// between blocks produce line breaks.
pub fn join_blocks<I, S>(blocks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = blocks
        .into_iter()
        .map(|block| normalize_block(block.as_ref()))
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR);

    trim_text(&collapse_blank_lines(&joined)).to_string()
}
