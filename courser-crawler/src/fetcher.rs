use crate::error::{CrawlError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Hard cap on fetched body size. Content beyond it is discarded, not an error.
pub const MAX_CONTENT_LENGTH: usize = 500_000;

pub const USER_AGENT: &str = "Courser/0.1 (educational crawler)";

/// The outcome of a single fetch. Lives only for one fetch-extract cycle.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: String,
    /// URL after redirects.
    pub final_url: String,
    pub content_type: String,
    pub body: String,
    /// True when the response was `text/html` or `text/plain`. When false,
    /// `body` holds a placeholder naming the content type instead of markup.
    pub is_text: bool,
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(HTTP_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Perform exactly one GET with redirects followed. Non-2xx statuses and
    /// transport failures are errors; a non-textual content type is not.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        Url::parse(url).map_err(|e| CrawlError::InvalidUrl(format!("{}: {}", url, e)))?;

        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let is_text = content_type.contains("text/html") || content_type.contains("text/plain");
        if !is_text {
            return Ok(FetchedPage {
                requested_url: url.to_string(),
                final_url,
                body: format!("(Non-HTML content: {})", content_type),
                content_type,
                is_text,
            });
        }

        let mut body = response.text().await?;
        if body.len() > MAX_CONTENT_LENGTH {
            let mut cut = MAX_CONTENT_LENGTH;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        Ok(FetchedPage {
            requested_url: url.to_string(),
            final_url,
            content_type,
            body,
            is_text,
        })
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_html_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<html><body>Welcome</body></html>"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let page = fetcher.fetch(&mock_server.uri()).await.unwrap();

        assert!(page.is_text);
        assert!(page.body.contains("Welcome"));
        assert_eq!(page.requested_url, mock_server.uri());
    }

    #[tokio::test]
    async fn test_fetch_non_html_yields_placeholder() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/zip")
                    .set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let page = fetcher
            .fetch(&format!("{}/archive", mock_server.uri()))
            .await
            .unwrap();

        assert!(!page.is_text);
        assert_eq!(page.body, "(Non-HTML content: application/zip)");
    }

    #[tokio::test]
    async fn test_fetch_missing_content_type_yields_placeholder() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/raw"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"data".to_vec()))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let page = fetcher
            .fetch(&format!("{}/raw", mock_server.uri()))
            .await
            .unwrap();

        assert!(!page.is_text);
        assert!(page.body.starts_with("(Non-HTML content:"));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let err = fetcher
            .fetch(&format!("{}/broken", mock_server.uri()))
            .await
            .unwrap_err();

        match err {
            CrawlError::Status { status, .. } => assert_eq!(status, 500),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = Fetcher::new();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, CrawlError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_body_capped_at_limit() {
        let mock_server = MockServer::start().await;

        let big = "a".repeat(MAX_CONTENT_LENGTH + 10_000);
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string(big),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new();
        let page = fetcher
            .fetch(&format!("{}/big", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(page.body.len(), MAX_CONTENT_LENGTH);
    }
}
