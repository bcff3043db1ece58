//! Upstream page access.
//!
//! The sync engine only sees [`PageFetcher`]: give it a page number, get back
//! the records on that page, or an empty batch once past the last published
//! week.

pub mod scrape;

use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::models::MealBatch;

pub use scrape::parse_week_page;

/// Default menu page of the upstream site.
pub const DEFAULT_SOURCE_URL: &str = "https://hs.clehrd.or.kr/kr/html/sub02/0204.html?";

/// Fetches one weekly page by page number.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page's records, or an empty batch if the page has none.
    async fn fetch(&self, page: u64) -> Result<MealBatch, FetchError>;
}

/// Configuration for [`HttpPageFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Menu page URL; the page number is posted as form field `mng_no`.
    pub source_url: String,
    /// Whole-request timeout (default: 20s)
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            timeout: Duration::from_secs(20),
            user_agent: format!("mealcache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fetches pages from the upstream site over HTTP.
pub struct HttpPageFetcher {
    http: Client,
    source_url: String,
}

impl HttpPageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http,
            source_url: config.source_url,
        })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: u64) -> Result<MealBatch, FetchError> {
        let response = self
            .http
            .post(&self.source_url)
            .form(&[("mng_no", page)])
            .send()
            .await
            .map_err(|e| FetchError::Transport(page, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(page, status));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(page, e.to_string()))?;

        let batch = parse_week_page(&body);
        tracing::debug!("Page {} has {} day(s)", page, batch.len());
        Ok(batch)
    }
}

/// Errors that can occur while fetching an upstream page.
#[derive(Debug)]
pub enum FetchError {
    /// The HTTP client could not be built.
    Client(String),
    /// Connection, timeout, or body read failure for a page.
    Transport(u64, String),
    /// Upstream answered with a non-success status.
    Status(u64, StatusCode),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Client(e) => write!(f, "Failed to build HTTP client: {}", e),
            FetchError::Transport(page, e) => write!(f, "Failed to fetch page {}: {}", page, e),
            FetchError::Status(page, status) => {
                write!(f, "Page {} returned HTTP {}", page, status)
            }
        }
    }
}

impl std::error::Error for FetchError {}
