// src/services/discovery.rs

//! Content base location discovery.
//!
//! Probes an ordered list of candidate base locations with existence-only
//! requests against a small set of well-known filenames. The first
//! candidate that answers any probe wins.

use crate::fetch::Fetch;
use crate::models::ContentConfig;
use crate::utils::{join_origin, path::normalize};

/// Service for locating the base directory that actually serves content.
pub struct DirectoryDiscovery<'a> {
    fetch: &'a dyn Fetch,
    config: &'a ContentConfig,
}

impl<'a> DirectoryDiscovery<'a> {
    /// Create a new discovery service.
    pub fn new(fetch: &'a dyn Fetch, config: &'a ContentConfig) -> Self {
        Self { fetch, config }
    }

    /// Probe candidates in list order and return the first base location
    /// for which any well-known filename exists.
    ///
    /// Probe failures (transport errors included) only skip to the next
    /// candidate; an exhausted list yields `None`. Memoization of a
    /// successful result is the caller's responsibility.
    pub async fn discover(&self) -> Option<String> {
        for base in &self.config.base_candidates {
            let base = normalize(base);

            for probe in &self.config.probe_files {
                let path = normalize(&format!("{base}/{probe}"));
                let url = match join_origin(&self.config.origin, &path) {
                    Ok(url) => url,
                    Err(e) => {
                        log::warn!("Cannot build probe URL for {path}: {e}");
                        continue;
                    }
                };

                match self.fetch.exists(&url).await {
                    Ok(true) => {
                        log::debug!("Discovered content base {base} via {probe}");
                        return Some(base);
                    }
                    Ok(false) => {}
                    Err(e) => log::debug!("Probe {path} failed: {e}"),
                }
            }
        }

        log::warn!("No candidate base location answered any probe");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetch;

    fn config(candidates: &[&str]) -> ContentConfig {
        ContentConfig {
            origin: "http://test.local".to_string(),
            base_candidates: candidates.iter().map(|s| s.to_string()).collect(),
            probe_files: vec!["index.txt".to_string(), "first-post.md".to_string()],
            ..ContentConfig::default()
        }
    }

    #[tokio::test]
    async fn test_first_answering_candidate_wins() {
        let fetch = MockFetch::new().with_file("/posts/first-post.md", "x");
        let config = config(&["/content/posts", "/posts"]);

        let base = DirectoryDiscovery::new(&fetch, &config).discover().await;
        assert_eq!(base.as_deref(), Some("/posts"));
    }

    #[tokio::test]
    async fn test_list_order_respected() {
        let fetch = MockFetch::new()
            .with_file("/content/posts/index.txt", "a.md\n")
            .with_file("/posts/index.txt", "b.md\n");
        let config = config(&["/content/posts", "/posts"]);

        let base = DirectoryDiscovery::new(&fetch, &config).discover().await;
        assert_eq!(base.as_deref(), Some("/content/posts"));
    }

    #[tokio::test]
    async fn test_probe_errors_are_skipped() {
        let fetch = MockFetch::new()
            .with_failure("/content/posts/index.txt")
            .with_failure("/content/posts/first-post.md")
            .with_file("/posts/index.txt", "a.md\n");
        let config = config(&["/content/posts", "/posts"]);

        let base = DirectoryDiscovery::new(&fetch, &config).discover().await;
        assert_eq!(base.as_deref(), Some("/posts"));
    }

    #[tokio::test]
    async fn test_exhausted_candidates_yield_none() {
        let fetch = MockFetch::new();
        let config = config(&["/content/posts", "/posts"]);

        let base = DirectoryDiscovery::new(&fetch, &config).discover().await;
        assert!(base.is_none());
    }
}
