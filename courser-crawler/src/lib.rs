pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod relevance;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::{CrawlError, Result};
pub use extract::{Link, extract_links, extract_text};
pub use fetcher::{FetchedPage, Fetcher};
pub use result::{CrawlFailure, CrawlResult, PageCapture, PageSummary};
