// src/fetch/mod.rs

//! Network retrieval interface.
//!
//! The resolver consumes retrieval through the [`Fetch`] trait so tests can
//! run against the in-memory [`MockFetch`] backend instead of a live server.

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};

use crate::error::Result;
use crate::models::HttpConfig;

pub use mock::MockFetch;

/// Content types requested for single-file fetches.
const ACCEPT_MARKDOWN: &str = "text/markdown, text/plain;q=0.9, */*;q=0.1";

/// Retrieval capability for fully qualified content locations.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the body text at `url`, bypassing any intermediate cache.
    ///
    /// Returns `Ok(None)` for a non-success status; transport failures
    /// surface as errors and are absorbed by the caller.
    async fn get_text(&self, url: &str) -> Result<Option<String>>;

    /// Existence-only probe. No body is transferred.
    async fn exists(&self, url: &str) -> Result<bool>;
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for std::sync::Arc<F> {
    async fn get_text(&self, url: &str) -> Result<Option<String>> {
        (**self).get_text(url).await
    }

    async fn exists(&self, url: &str) -> Result<bool> {
        (**self).exists(url).await
    }
}

/// HTTP retrieval backend.
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    /// Create a configured HTTP backend.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetch {
    async fn get_text(&self, url: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_MARKDOWN)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        if !response.status().is_success() {
            log::debug!("Fetch of {} returned status {}", url, response.status());
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    async fn exists(&self, url: &str) -> Result<bool> {
        let response = self
            .client
            .head(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}
