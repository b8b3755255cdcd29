use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use scraper::Html;
use url::Url;

use crate::error::MonitorError;

// eBay serves a differently-shaped page to non-desktop user agents, and the
// extractor's anchors only exist in the desktop layout.
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_3) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.149 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can turn a URL into a parsed document.
///
/// The poll loop is written against this seam so it can be driven by
/// in-memory pages in tests. `?Send` because `scraper::Html` is not `Send`
/// and the whole pipeline runs on a single-threaded arbiter.
#[async_trait(?Send)]
pub trait PageSource {
    async fn fetch_document(&self, url: &str) -> Result<Html, MonitorError>;
}

/// HTTP client for search and item pages.
#[derive(Clone)]
pub struct PageClient {
    http: Client,
}

impl PageClient {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent(DESKTOP_USER_AGENT)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .redirect(Policy::limited(8))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap();

        Self { http }
    }

    /// GET a page and parse it. Non-200 responses are a fetch error; retry
    /// policy belongs to the caller.
    pub async fn get(&self, url: &str) -> Result<Html, MonitorError> {
        let parsed = Url::parse(url).map_err(|err| MonitorError::Fetch {
            url: url.to_string(),
            detail: format!("bad url: {err}"),
        })?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(MonitorError::Fetch {
                url: url.to_string(),
                detail: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let resp = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|err| MonitorError::Fetch {
                url: url.to_string(),
                detail: err.to_string(),
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(MonitorError::Fetch {
                url: url.to_string(),
                detail: format!("status {}", status.as_u16()),
            });
        }

        let body = resp.text().await.map_err(|err| MonitorError::Parse {
            what: "page body",
            detail: err.to_string(),
        })?;

        Ok(Html::parse_document(&body))
    }
}

impl Default for PageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl PageSource for PageClient {
    async fn fetch_document(&self, url: &str) -> Result<Html, MonitorError> {
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let client = PageClient::new();
        let err = client.get("ftp://example.com/listing").await.unwrap_err();
        assert!(matches!(err, MonitorError::Fetch { .. }));
    }

    #[tokio::test]
    async fn rejects_unparseable_urls() {
        let client = PageClient::new();
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, MonitorError::Fetch { .. }));
    }
}
