//! Client code for scrapbook.
//!
//! This crate provides the HTTP fetch pipeline, the page extraction rules,
//! and the `Scraper` engine combining them, shared by the server and CLI.

pub mod extract;
pub mod fetch;
pub mod scrape;

pub use extract::{ContentSource, ExtractionResult, Extractor, RuleExtractor, extract_html};

pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use scrape::Scraper;
