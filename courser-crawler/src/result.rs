use crate::extract::Link;
use serde::{Deserialize, Serialize};

/// One crawled page as reported to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub text_preview: String,
    /// Only reported for the homepage entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links_on_page: Option<usize>,
}

/// A fetch that failed during a crawl. Failures are data, not aborts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlFailure {
    pub url: String,
    pub error: String,
}

/// The unit of work output for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub source_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    pub pages_crawled: Vec<PageSummary>,
    pub interesting_links_found: Vec<Link>,
    pub errors: Vec<CrawlFailure>,
}

impl CrawlResult {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            source_id: None,
            source_label: None,
            pages_crawled: Vec::new(),
            interesting_links_found: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Result of a single-page fetch+extract, bounded for LLM consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCapture {
    pub url: String,
    pub text_length: usize,
    pub text: String,
    pub links_count: usize,
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageCapture {
    pub fn with_error(url: impl Into<String>, error: String) -> Self {
        Self {
            url: url.into(),
            text_length: 0,
            text: String::new(),
            links_count: 0,
            links: Vec::new(),
            error: Some(error),
        }
    }
}
