//! Mock retrieval backend for testing.
//!
//! Provides [`MockFetch`] for unit testing without network access.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use url::Url;

use crate::error::{AppError, Result};
use crate::fetch::Fetch;

/// In-memory retrieval backend keyed by request path.
///
/// Bodies are registered under origin-relative paths; incoming fully
/// qualified URLs are reduced to their path component before lookup. Use
/// the builder methods to configure test content.
#[derive(Debug, Default)]
pub struct MockFetch {
    files: RwLock<HashMap<String, String>>,
    failures: RwLock<HashSet<String>>,
    requests: RwLock<Vec<String>>,
}

impl MockFetch {
    /// Create a new empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body under an origin-relative path.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(path, body);
        self
    }

    /// Register a path that fails at the transport level.
    #[must_use]
    pub fn with_failure(self, path: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(path.into());
        self
    }

    /// Add or replace a body after construction.
    pub fn insert(&self, path: impl Into<String>, body: impl Into<String>) {
        self.files.write().unwrap().insert(path.into(), body.into());
    }

    /// Remove a registered body.
    pub fn remove(&self, path: &str) {
        self.files.write().unwrap().remove(path);
    }

    /// Requests issued so far, in order, as `"GET /path"` / `"HEAD /path"`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    fn request_path(url: &str) -> String {
        Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string())
    }

    fn record(&self, path: &str) {
        self.requests.write().unwrap().push(path.to_string());
    }
}

#[async_trait]
impl Fetch for MockFetch {
    async fn get_text(&self, url: &str) -> Result<Option<String>> {
        let path = Self::request_path(url);
        self.record(&format!("GET {path}"));

        if self.failures.read().unwrap().contains(&path) {
            return Err(AppError::transport(url, "simulated transport failure"));
        }
        Ok(self.files.read().unwrap().get(&path).cloned())
    }

    async fn exists(&self, url: &str) -> Result<bool> {
        let path = Self::request_path(url);
        self.record(&format!("HEAD {path}"));

        if self.failures.read().unwrap().contains(&path) {
            return Err(AppError::transport(url, "simulated transport failure"));
        }
        Ok(self.files.read().unwrap().contains_key(&path))
    }
}
