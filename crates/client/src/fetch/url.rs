//! Target URL validation before a page is requested.

/// Error type for URL validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse the caller-supplied URL into the URL that will be requested.
///
/// Steps:
/// 1. Trim leading/trailing whitespace
/// 2. Parse as an absolute URL (no scheme is guessed)
/// 3. Require `http` or `https`, the only schemes the HTTP client can retrieve
/// 4. Remove fragment (#...), which is never sent to the server
///
/// Host case and query string are left to the `url` crate's WHATWG parsing.
pub fn parse_target(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
