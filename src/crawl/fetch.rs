//! Fetch capability consumed by the decision core
//!
//! Workers and the robots resolver download through the [`Fetcher`] trait so
//! tests can script responses. The production implementation is a thin
//! reqwest client; a non-2xx status or transport failure is "no content" to
//! every caller, never a crash.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during a fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content too large: {0} bytes")]
    ContentTooLarge(usize),
    #[error("invalid content type: {0}")]
    InvalidContentType(String),
}

/// Result of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Decoded response body, when one was returned
    pub body: Option<String>,
}

impl FetchedPage {
    /// The body, only when the exchange actually succeeded.
    pub fn ok_body(&self) -> Option<&str> {
        if (200..300).contains(&self.status) {
            self.body.as_deref()
        } else {
            None
        }
    }
}

/// Synchronous-per-worker download capability
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn download(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// reqwest-backed fetcher for pages and robots.txt
pub struct HttpFetcher {
    client: reqwest::Client,
    max_content_size: usize,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_content_size: usize,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_content_size,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn download(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !content_type.contains("text/html")
            && !content_type.contains("application/xhtml")
            && !content_type.contains("text/plain")
        {
            return Err(FetchError::InvalidContentType(content_type));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_content_size {
                return Err(FetchError::ContentTooLarge(len as usize));
            }
        }

        let body = response.text().await?;
        if body.len() > self.max_content_size {
            return Err(FetchError::ContentTooLarge(body.len()));
        }

        Ok(FetchedPage {
            final_url,
            status,
            body: Some(body),
        })
    }
}
