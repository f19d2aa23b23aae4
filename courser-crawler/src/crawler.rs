use crate::extract::{Link, clip, extract_links, extract_text};
use crate::fetcher::Fetcher;
use crate::relevance::{is_interesting, is_same_site};
use crate::result::{CrawlFailure, CrawlResult, PageCapture, PageSummary};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use url::Url;

pub const HOMEPAGE_PREVIEW_CHARS: usize = 3000;
pub const SUBPAGE_PREVIEW_CHARS: usize = 2000;
pub const MAX_TITLE_CHARS: usize = 100;

/// Cap on the reported candidate list, independent of how many are followed.
pub const MAX_REPORTED_LINKS: usize = 30;

pub const PAGE_TEXT_CHARS: usize = 15_000;
pub const PAGE_LINKS_CAP: usize = 50;

const TRUNCATION_MARKER: &str = "\n\n... (truncated, page has more content)";

/// Binary/media extensions never worth fetching as pages.
const SKIP_EXTENSIONS: [&str; 8] = ["zip", "tar", "gz", "mp4", "mov", "avi", "mp3", "wav"];

pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Bounded, best-effort crawler for a course-homepage source. All failures
/// are captured into the returned result; `crawl` never errors outward.
pub struct Crawler {
    fetcher: Fetcher,
    progress_callback: Option<ProgressCallback>,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Crawler {
    pub fn new() -> Self {
        Self {
            fetcher: Fetcher::new(),
            progress_callback: None,
            cancel_flag: None,
        }
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            fetcher: Fetcher::with_timeout(timeout_secs),
            progress_callback: None,
            cancel_flag: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Cooperative cancellation, checked between page fetches. An in-flight
    /// fetch still runs to completion or timeout.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn report_progress(&self, url: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(url);
        }
    }

    /// Crawl a source homepage and up to `max_subpages` of its candidate
    /// sub-links. The budget counts successful follows only; failed follows
    /// are recorded in `errors` and the traversal continues. Total network
    /// calls are bounded by `1 + max_subpages` successful fetches.
    pub async fn crawl(&self, seed_url: &str, max_subpages: usize) -> CrawlResult {
        info!("Crawling source {} (budget {})", seed_url, max_subpages);
        let mut result = CrawlResult::new(seed_url);

        self.report_progress(seed_url);
        let page = match self.fetcher.fetch(seed_url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to crawl source {}: {}", seed_url, e);
                result.errors.push(CrawlFailure {
                    url: seed_url.to_string(),
                    error: e.to_string(),
                });
                return result;
            }
        };

        let (text, links) = if page.is_text {
            (
                extract_text(&page.body),
                extract_links(&page.body, &page.final_url),
            )
        } else {
            (page.body.clone(), Vec::new())
        };

        result.pages_crawled.push(PageSummary {
            url: page.final_url.clone(),
            title: "Homepage".to_string(),
            text_preview: clip(&text, HOMEPAGE_PREVIEW_CHARS),
            links_on_page: Some(links.len()),
        });

        // Keyword matches are worth following, and so are same-site links
        // even without one: navigation structure often buries useful pages
        // behind generic anchor text. Extraction order is preserved.
        let candidates: Vec<Link> = links
            .into_iter()
            .filter(|link| {
                is_interesting(&link.url, &link.text) || is_same_site(seed_url, &link.url)
            })
            .collect();

        result.interesting_links_found = candidates
            .iter()
            .take(MAX_REPORTED_LINKS)
            .cloned()
            .collect();

        let mut followed = 0;
        for link in &candidates {
            if followed >= max_subpages {
                break;
            }
            if self.cancelled() {
                debug!("Crawl of {} cancelled before {}", seed_url, link.url);
                break;
            }
            if !is_followable(&link.url) {
                continue;
            }

            self.report_progress(&link.url);
            match self.fetcher.fetch(&link.url).await {
                Ok(sub_page) => {
                    let sub_text = if sub_page.is_text {
                        extract_text(&sub_page.body)
                    } else {
                        sub_page.body.clone()
                    };
                    let title = if link.text.is_empty() {
                        sub_page.final_url.clone()
                    } else {
                        clip(&link.text, MAX_TITLE_CHARS)
                    };
                    result.pages_crawled.push(PageSummary {
                        url: sub_page.final_url,
                        title,
                        text_preview: clip(&sub_text, SUBPAGE_PREVIEW_CHARS),
                        links_on_page: None,
                    });
                    followed += 1;
                }
                Err(e) => {
                    debug!("Failed to follow link {}: {}", link.url, e);
                    result.errors.push(CrawlFailure {
                        url: link.url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Crawled {} pages, {} interesting links, {} errors",
            result.pages_crawled.len(),
            result.interesting_links_found.len(),
            result.errors.len()
        );
        result
    }

    /// Fetch a single page and return its text and links, bounded for LLM
    /// consumption. Failures come back as a capture with `error` set.
    pub async fn fetch_page(&self, url: &str) -> PageCapture {
        info!("Fetching page {}", url);
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return PageCapture::with_error(url, e.to_string());
            }
        };

        let (mut text, links) = if page.is_text {
            (
                extract_text(&page.body),
                extract_links(&page.body, &page.final_url),
            )
        } else {
            (page.body.clone(), Vec::new())
        };

        if text.chars().count() > PAGE_TEXT_CHARS {
            text = clip(&text, PAGE_TEXT_CHARS);
            text.push_str(TRUNCATION_MARKER);
        }

        let links_count = links.len();
        PageCapture {
            url: page.final_url,
            text_length: text.chars().count(),
            text,
            links_count,
            links: links.into_iter().take(PAGE_LINKS_CAP).collect(),
            error: None,
        }
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Followable means an http(s) URL whose path does not end in a known
/// binary/media extension.
fn is_followable(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    let path = parsed.path().to_lowercase();
    match path.rsplit_once('.') {
        Some((_, ext)) => !SKIP_EXTENSIONS.contains(&ext),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_html(server: &MockServer, at: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html.to_string()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_crawl_respects_subpage_budget() {
        let mock_server = MockServer::start().await;

        let mut root_html = String::from("<html><body>");
        for i in 1..=5 {
            root_html.push_str(&format!(r#"<a href="/page{}">Page {}</a>"#, i, i));
        }
        root_html.push_str("</body></html>");
        mount_html(&mock_server, "/", &root_html).await;

        for i in 1..=5 {
            mount_html(
                &mock_server,
                &format!("/page{}", i),
                "<html><body>Content</body></html>",
            )
            .await;
        }

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 2).await;

        // Homepage + exactly two follows, in extraction order.
        assert_eq!(result.pages_crawled.len(), 3);
        assert!(result.pages_crawled[1].url.ends_with("/page1"));
        assert!(result.pages_crawled[2].url.ends_with("/page2"));
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_crawl_seed_failure_returns_partial_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 5).await;

        assert!(result.pages_crawled.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].error.contains("500"));
    }

    #[tokio::test]
    async fn test_failed_follow_does_not_consume_budget() {
        let mock_server = MockServer::start().await;

        let root_html = r#"<html><body>
            <a href="/broken">Broken</a>
            <a href="/good">Good</a>
        </body></html>"#;
        mount_html(&mock_server, "/", root_html).await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        mount_html(&mock_server, "/good", "<html><body>Fine</body></html>").await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 1).await;

        // The failed follow is recorded but the budget slot goes to /good.
        assert_eq!(result.pages_crawled.len(), 2);
        assert!(result.pages_crawled[1].url.ends_with("/good"));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].url.ends_with("/broken"));
    }

    #[tokio::test]
    async fn test_syllabus_link_followed_first() {
        let mock_server = MockServer::start().await;

        let root_html = r#"<html><body>
            <a href="/syllabus.html">Syllabus</a>
            <a href="/">Home</a>
            <a href="https://other.invalid/x">Elsewhere</a>
        </body></html>"#;
        mount_html(&mock_server, "/", root_html).await;
        mount_html(
            &mock_server,
            "/syllabus.html",
            "<html><body>Week 1: Intro</body></html>",
        )
        .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 1).await;

        assert_eq!(result.pages_crawled.len(), 2);
        assert_eq!(result.pages_crawled[1].title, "Syllabus");
        assert!(result.pages_crawled[1].url.ends_with("/syllabus.html"));
        assert!(result.pages_crawled[1].text_preview.contains("Week 1"));
    }

    #[tokio::test]
    async fn test_skips_non_http_schemes_and_media_extensions() {
        let mock_server = MockServer::start().await;

        let root_html = r#"<html><body>
            <a href="ftp://files.school.edu/pub">Syllabus mirror</a>
            <a href="/lecture1.mp4">Lecture video</a>
            <a href="/notes.html">Notes</a>
        </body></html>"#;
        mount_html(&mock_server, "/", root_html).await;
        mount_html(&mock_server, "/notes.html", "<html><body>Notes</body></html>").await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 10).await;

        assert_eq!(result.pages_crawled.len(), 2);
        assert!(result.pages_crawled[1].url.ends_with("/notes.html"));
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_reported_candidates_capped() {
        let mock_server = MockServer::start().await;

        let mut root_html = String::from("<html><body>");
        for i in 1..=40 {
            root_html.push_str(&format!(r#"<a href="/p{}">Item {}</a>"#, i, i));
        }
        root_html.push_str("</body></html>");
        mount_html(&mock_server, "/", root_html.as_str()).await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 0).await;

        assert_eq!(result.interesting_links_found.len(), MAX_REPORTED_LINKS);
        assert_eq!(result.pages_crawled.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_flag_stops_following() {
        let mock_server = MockServer::start().await;

        let root_html = r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#;
        mount_html(&mock_server, "/", root_html).await;

        let cancel = Arc::new(AtomicBool::new(true));
        let crawler = Crawler::new().with_cancel_flag(cancel);
        let result = crawler.crawl(&mock_server.uri(), 5).await;

        // Homepage only; cancellation is checked before each follow.
        assert_eq!(result.pages_crawled.len(), 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_non_html_subpage_stores_placeholder_text() {
        let mock_server = MockServer::start().await;

        let root_html = r#"<html><body><a href="/data">Grading data</a></body></html>"#;
        mount_html(&mock_server, "/", root_html).await;

        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("{}".as_bytes(), "application/json"),
            )
            .mount(&mock_server)
            .await;

        let crawler = Crawler::new();
        let result = crawler.crawl(&mock_server.uri(), 1).await;

        assert_eq!(result.pages_crawled.len(), 2);
        assert_eq!(
            result.pages_crawled[1].text_preview,
            "(Non-HTML content: application/json)"
        );
    }

    #[tokio::test]
    async fn test_fetch_page_caps_text_and_links() {
        let mock_server = MockServer::start().await;

        let mut html = String::from("<html><body><p>");
        html.push_str(&"lorem ".repeat(4000));
        html.push_str("</p>");
        for i in 1..=60 {
            html.push_str(&format!(r#"<a href="/l{}">Link {}</a>"#, i, i));
        }
        html.push_str("</body></html>");
        mount_html(&mock_server, "/", &html).await;

        let crawler = Crawler::new();
        let capture = crawler.fetch_page(&mock_server.uri()).await;

        assert!(capture.error.is_none());
        assert!(capture.text.ends_with("... (truncated, page has more content)"));
        assert_eq!(capture.links.len(), PAGE_LINKS_CAP);
        assert_eq!(capture.links_count, 60);
        // Reported length covers the clipped text plus the marker.
        assert_eq!(
            capture.text_length,
            PAGE_TEXT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[tokio::test]
    async fn test_fetch_page_error_is_structured() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let crawler = Crawler::new();
        let capture = crawler
            .fetch_page(&format!("{}/gone", mock_server.uri()))
            .await;

        assert!(capture.error.is_some());
        assert!(capture.text.is_empty());
        assert!(capture.links.is_empty());
    }
}
