//! Unified error types for scrapbook.
//!
//! Every failure of the extraction engine falls into one of two kinds: the
//! page could not be retrieved ([`ErrorKind::Fetch`]) or the retrieved body
//! could not be treated as an HTML document ([`ErrorKind::Parse`]). Missing
//! fields on a parsed page are never errors.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for scrapbook.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Invalid tool or command arguments (e.g., empty HTML).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport failure (DNS, connect, TLS, reading the body).
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Redirect limit exceeded or redirect loop.
    #[error("REDIRECT_FAILED: {0}")]
    RedirectFailed(String),

    /// Request could not be built or the response could not be decoded.
    #[error("REQUEST_FAILED: {0}")]
    RequestFailed(String),

    /// Non-success HTTP status.
    #[error("HTTP_ERROR: status {0}")]
    HttpStatus(u16),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Retrieval aborted by the caller.
    #[error("FETCH_CANCELLED: {0}")]
    Cancelled(String),

    /// The body could not be parsed as HTML at all.
    #[error("PARSE_FAILED: {0}")]
    ParseFailed(String),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments supplied by the caller.
    Input,
    /// The target URL could not be retrieved.
    Fetch,
    /// The retrieved body is not an HTML document.
    Parse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::Input,
            Error::InvalidUrl(_)
            | Error::HttpError(_)
            | Error::HttpStatus(_)
            | Error::RedirectFailed(_)
            | Error::RequestFailed(_)
            | Error::FetchTimeout(_)
            | Error::FetchTooLarge(_)
            | Error::Cancelled(_) => ErrorKind::Fetch,
            Error::ParseFailed(_) => ErrorKind::Parse,
        }
    }

    pub fn is_fetch(&self) -> bool {
        self.kind() == ErrorKind::Fetch
    }

    pub fn is_parse(&self) -> bool {
        self.kind() == ErrorKind::Parse
    }

    /// Whether another attempt at the same request could succeed.
    ///
    /// Transport failures, timeouts and 5xx statuses qualify. Client errors,
    /// redirect failures, size limits, bad URLs and cancellation are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::HttpError(_) | Error::FetchTimeout(_) => true,
            Error::HttpStatus(status) => *status >= 500,
            _ => false,
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::ParseFailed(msg) => (-32000, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::HttpStatus(status) => (-32008, format!("status {status}")),
            Error::RedirectFailed(msg) => (-32010, msg.clone()),
            Error::RequestFailed(msg) => (-32011, msg.clone()),
            Error::Cancelled(msg) => (-32009, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
