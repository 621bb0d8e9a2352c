// src/resolver.rs

//! Public resolution entry points and the cache layer in front of them.
//!
//! A [`Resolver`] owns the four process-wide caches (raw documents,
//! slug→path, the materialized post collection and the discovered base
//! location) and composes discovery, enumeration, fetching and parsing
//! into `load_all_posts` / `load_post` / `load_page`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::fetch::{Fetch, HttpFetch};
use crate::models::{Config, Document, Metadata};
use crate::services::parser::{looks_like_html_shell, split_front_matter};
use crate::services::{DOCUMENT_EXTENSION, DirectoryDiscovery, FileEnumerator};
use crate::utils::{join_origin, path::normalize};

/// Read-only content resolver with process-lifetime caches.
///
/// Construct one instance at process start; all entry points take `&self`
/// and overlapping calls interleave only at network boundaries. Cache locks
/// are never held across an await point.
pub struct Resolver {
    config: Config,
    fetch: Box<dyn Fetch>,

    /// Raw-document cache, keyed by the path exactly as requested. Two
    /// spellings of the same file are cached twice (documented quirk).
    documents: Mutex<HashMap<String, Document>>,

    /// Slug → requested path, written only as a side effect of a
    /// successful post fetch. Skips filename guessing on repeat lookups.
    slugs: Mutex<HashMap<String, String>>,

    /// Materialized sorted post collection, set once per process unless
    /// cleared through [`Resolver::invalidate_posts`].
    posts: Mutex<Option<Arc<Vec<Document>>>>,

    /// Memoized discovered base location. Success is cached for the
    /// process lifetime; failure is not, so discovery may be retried.
    base: Mutex<Option<String>>,
}

impl Resolver {
    /// Create a resolver backed by a configured HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let fetch = Box::new(HttpFetch::new(&config.http)?);
        Ok(Self::with_fetch(config, fetch))
    }

    /// Create a resolver with a custom retrieval backend.
    pub fn with_fetch(config: Config, fetch: Box<dyn Fetch>) -> Self {
        Self {
            config,
            fetch,
            documents: Mutex::new(HashMap::new()),
            slugs: Mutex::new(HashMap::new()),
            posts: Mutex::new(None),
            base: Mutex::new(None),
        }
    }

    /// Load the full post collection, sorted descending by date.
    ///
    /// Memoized for the process lifetime: repeat calls return the same
    /// collection even if backing content changes. Failed discovery yields
    /// an empty collection without caching it, so a later call may retry.
    /// Individual file failures are skipped, never fatal.
    pub async fn load_all_posts(&self) -> Arc<Vec<Document>> {
        if let Some(posts) = self.posts.lock().unwrap().clone() {
            return posts;
        }

        let Some(base) = self.discover_base().await else {
            return Arc::new(Vec::new());
        };

        let paths = FileEnumerator::new(self.fetch.as_ref(), &self.config.content)
            .enumerate(&base)
            .await;

        // Bounded concurrency; `buffered` keeps enumeration order so the
        // result is deterministic before sorting.
        let concurrency = self.config.http.max_concurrent.max(1);
        let mut fetches = stream::iter(paths)
            .map(|path| async move {
                let document = self.fetch_document(&path, true).await;
                (path, document)
            })
            .buffered(concurrency);

        let mut loaded = Vec::new();
        while let Some((path, document)) = fetches.next().await {
            match document {
                Some(document) => loaded.push(document),
                None => log::debug!("Skipping unresolvable post {path}"),
            }
        }

        // Stable sort: any pair where either side lacks a parseable date
        // compares equal and keeps its enumeration order.
        loaded.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(a_date), Some(b_date)) => b_date.cmp(&a_date),
            _ => std::cmp::Ordering::Equal,
        });

        log::info!("Loaded {} posts from {base}", loaded.len());

        let posts = Arc::new(loaded);
        *self.posts.lock().unwrap() = Some(Arc::clone(&posts));
        posts
    }

    /// Resolve a single post by slug.
    ///
    /// Tries the slug cache, then hyphen/underscore filename variants under
    /// the discovered base, then an exact-slug search of the full
    /// collection. `None` is the normal not-found outcome.
    pub async fn load_post(&self, slug: &str) -> Option<Document> {
        let known_path = self.slugs.lock().unwrap().get(slug).cloned();
        if let Some(path) = known_path {
            if let Some(document) = self.fetch_document(&path, true).await {
                return Some(document);
            }
        }

        let base = self.discover_base().await?;

        for candidate in filename_candidates(slug) {
            let path = normalize(&format!("{base}/{candidate}{DOCUMENT_EXTENSION}"));
            if let Some(document) = self.fetch_document(&path, true).await {
                return Some(document);
            }
        }

        log::debug!("No filename variant matched {slug}, searching full collection");
        self.load_all_posts()
            .await
            .iter()
            .find(|d| d.metadata.slug == slug)
            .cloned()
    }

    /// Resolve a single page by slug through the fixed template list.
    ///
    /// Pages share the raw-document cache but never touch the slug cache
    /// or the post collection.
    pub async fn load_page(&self, slug: &str) -> Option<Document> {
        for template in &self.config.content.page_templates {
            let path = normalize(&template.replace("{slug}", slug));
            if let Some(document) = self.fetch_document(&path, false).await {
                return Some(document);
            }
        }
        None
    }

    /// Clear the materialized post collection so the next
    /// [`Resolver::load_all_posts`] rebuilds it. The raw-document, slug and
    /// base caches keep their entries.
    pub fn invalidate_posts(&self) {
        *self.posts.lock().unwrap() = None;
    }

    /// Fetch and parse a single document, populating the raw-document
    /// cache and, for posts, the slug cache. All failures (transport,
    /// empty or shell bodies, malformed headers) collapse to `None`.
    async fn fetch_document(&self, path: &str, index_slug: bool) -> Option<Document> {
        if let Some(document) = self.documents.lock().unwrap().get(path) {
            return Some(document.clone());
        }

        let normalized = normalize(path);
        let url = match join_origin(&self.config.content.origin, &normalized) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Invalid document location {path}: {e}");
                return None;
            }
        };

        let text = match self.fetch.get_text(&url).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::debug!("No content at {normalized}");
                return None;
            }
            Err(e) => {
                log::warn!("Fetch failed for {normalized}: {e}");
                return None;
            }
        };

        if text.trim().is_empty() || looks_like_html_shell(&text) {
            log::debug!("Response at {normalized} is not a document");
            return None;
        }

        let (fields, body) = match split_front_matter(&text) {
            Ok(parts) => parts,
            Err(e) => {
                log::debug!("Malformed document at {normalized}: {e}");
                return None;
            }
        };

        let metadata = Metadata::from_header(fields, &normalized, &body, Utc::now());
        let document = Document { metadata, body };

        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), document.clone());
        if index_slug {
            self.slugs
                .lock()
                .unwrap()
                .insert(document.metadata.slug.clone(), path.to_string());
        }

        Some(document)
    }

    /// Run directory discovery, memoizing only success.
    async fn discover_base(&self) -> Option<String> {
        if let Some(base) = self.base.lock().unwrap().clone() {
            return Some(base);
        }

        let discovered = DirectoryDiscovery::new(self.fetch.as_ref(), &self.config.content)
            .discover()
            .await?;
        *self.base.lock().unwrap() = Some(discovered.clone());
        Some(discovered)
    }
}

/// Ordered filename guesses for a slug: as-is, hyphens→underscores,
/// underscores→hyphens. Duplicates removed, order kept.
fn filename_candidates(slug: &str) -> Vec<String> {
    let variants = [
        slug.to_string(),
        slug.replace('-', "_"),
        slug.replace('_', "-"),
    ];

    let mut candidates = Vec::new();
    for variant in variants {
        if !candidates.contains(&variant) {
            candidates.push(variant);
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetch;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.content.origin = "http://test.local".to_string();
        config
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\ndate: {date}\n---\n\nBody of {title}.\n")
    }

    fn resolver(fetch: &Arc<MockFetch>) -> Resolver {
        Resolver::with_fetch(test_config(), Box::new(Arc::clone(fetch)))
    }

    #[tokio::test]
    async fn test_collection_sorted_by_date_descending() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "a.md\nb.md\n")
                .with_file("/content/posts/a.md", post("A", "2024-01-02"))
                .with_file("/content/posts/b.md", post("B", "2024-01-01")),
        );
        let resolver = resolver(&fetch);

        let posts = resolver.load_all_posts().await;
        let titles: Vec<_> = posts.iter().map(|p| p.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_collection_memoized_across_content_changes() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "a.md\n")
                .with_file("/content/posts/a.md", post("A", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let first = resolver.load_all_posts().await;
        assert_eq!(first.len(), 1);

        // Backing content changes are invisible until invalidation.
        fetch.insert("/content/posts/index.txt", "a.md\nb.md\n");
        fetch.insert("/content/posts/b.md", post("B", "2024-01-03"));

        let second = resolver.load_all_posts().await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);

        resolver.invalidate_posts();
        let third = resolver.load_all_posts().await;
        assert_eq!(third.len(), 2);
        assert_eq!(third[0].metadata.title, "B");
    }

    #[tokio::test]
    async fn test_failed_discovery_yields_empty_and_is_not_cached() {
        let fetch = Arc::new(MockFetch::new());
        let resolver = resolver(&fetch);

        assert!(resolver.load_all_posts().await.is_empty());

        // Content appearing later is picked up because failure was not memoized.
        fetch.insert("/content/posts/index.txt", "a.md\n");
        fetch.insert("/content/posts/a.md", post("A", "2024-01-02"));

        assert_eq!(resolver.load_all_posts().await.len(), 1);
    }

    #[tokio::test]
    async fn test_discovery_memoized_after_success() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "a.md\n")
                .with_file("/content/posts/a.md", post("A", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let _ = resolver.load_all_posts().await;
        let probes_after_first = probe_count(&fetch);

        resolver.invalidate_posts();
        let _ = resolver.load_all_posts().await;

        assert_eq!(probe_count(&fetch), probes_after_first);
    }

    fn probe_count(fetch: &MockFetch) -> usize {
        // Existence probes are HEAD requests; manifest reads are GETs.
        fetch
            .requests()
            .iter()
            .filter(|p| p.starts_with("HEAD "))
            .count()
    }

    #[tokio::test]
    async fn test_failing_files_are_skipped_not_fatal() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "a.md\nbroken.md\nb.md\n")
                .with_file("/content/posts/a.md", post("A", "2024-01-02"))
                .with_failure("/content/posts/broken.md")
                .with_file("/content/posts/b.md", post("B", "2024-01-01")),
        );
        let resolver = resolver(&fetch);

        let posts = resolver.load_all_posts().await;
        assert_eq!(posts.len(), 2);
    }

    #[tokio::test]
    async fn test_seed_fallback_still_yields_collection() {
        // Manifest fails at the transport level; the seed list resolves.
        let fetch = Arc::new(
            MockFetch::new()
                .with_failure("/content/posts/index.txt")
                .with_file("/content/posts/first-post.md", post("First", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let posts = resolver.load_all_posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].metadata.title, "First");
    }

    #[tokio::test]
    async fn test_load_post_exact_match_tried_first() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "")
                .with_file("/content/posts/my-slug.md", post("Hyphens", "2024-01-02"))
                .with_file("/content/posts/my_slug.md", post("Underscores", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let document = resolver.load_post("my-slug").await.unwrap();
        assert_eq!(document.metadata.title, "Hyphens");
    }

    #[tokio::test]
    async fn test_load_post_underscore_variant_matches() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "")
                .with_file("/content/posts/my_slug.md", post("Underscores", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let document = resolver.load_post("my-slug").await.unwrap();
        assert_eq!(document.metadata.title, "Underscores");
        assert_eq!(document.metadata.slug, "my_slug");
    }

    #[tokio::test]
    async fn test_load_post_falls_back_to_collection_search() {
        // Filename bears no relation to the declared slug.
        let body = "---\ntitle: Odd\nslug: actual-slug\ndate: 2024-01-02\n---\nbody";
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "weird-name.md\n")
                .with_file("/content/posts/weird-name.md", body),
        );
        let resolver = resolver(&fetch);

        let document = resolver.load_post("actual-slug").await.unwrap();
        assert_eq!(document.metadata.title, "Odd");
    }

    #[tokio::test]
    async fn test_load_post_missing_returns_none() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "a.md\n")
                .with_file("/content/posts/a.md", post("A", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        assert!(resolver.load_post("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_load_post_repeat_lookup_hits_caches() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/index.txt", "")
                .with_file("/content/posts/my-slug.md", post("A", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        assert!(resolver.load_post("my-slug").await.is_some());
        let requests_after_first = fetch.requests().len();

        // Slug cache points at the cached document; no network traffic.
        assert!(resolver.load_post("my-slug").await.is_some());
        assert_eq!(fetch.requests().len(), requests_after_first);
    }

    #[tokio::test]
    async fn test_load_page_primary_template() {
        let fetch = Arc::new(
            MockFetch::new().with_file("/content/pages/about.md", post("About", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        let document = resolver.load_page("about").await.unwrap();
        assert_eq!(document.metadata.title, "About");
    }

    #[tokio::test]
    async fn test_load_page_fallback_template() {
        let fetch =
            Arc::new(MockFetch::new().with_file("/pages/about.md", post("About", "2024-01-02")));
        let resolver = resolver(&fetch);

        assert!(resolver.load_page("about").await.is_some());
    }

    #[tokio::test]
    async fn test_load_page_does_not_write_slug_cache() {
        let fetch = Arc::new(
            MockFetch::new().with_file("/content/pages/about.md", post("About", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        assert!(resolver.load_page("about").await.is_some());
        assert!(resolver.slugs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_raw_cache_keyed_by_requested_spelling() {
        let fetch = Arc::new(
            MockFetch::new().with_file("/content/posts/a.md", post("A", "2024-01-02")),
        );
        let resolver = resolver(&fetch);

        // Two spellings of the same file produce two cache entries.
        assert!(
            resolver
                .fetch_document("/content/posts/a.md", true)
                .await
                .is_some()
        );
        assert!(
            resolver
                .fetch_document("content//posts/a.md", true)
                .await
                .is_some()
        );
        assert_eq!(resolver.documents.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_shell_and_empty_bodies_are_not_found() {
        let fetch = Arc::new(
            MockFetch::new()
                .with_file("/content/posts/empty.md", "   \n")
                .with_file(
                    "/content/posts/shell.md",
                    "<!DOCTYPE html><html><div id=\"root\"></div></html>",
                ),
        );
        let resolver = resolver(&fetch);

        assert!(
            resolver
                .fetch_document("/content/posts/empty.md", true)
                .await
                .is_none()
        );
        assert!(
            resolver
                .fetch_document("/content/posts/shell.md", true)
                .await
                .is_none()
        );
        assert!(resolver.documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_header_is_not_found() {
        let fetch = Arc::new(
            MockFetch::new().with_file("/content/posts/bad.md", "---\ntitle: T\nno end"),
        );
        let resolver = resolver(&fetch);

        assert!(
            resolver
                .fetch_document("/content/posts/bad.md", true)
                .await
                .is_none()
        );
    }

    #[test]
    fn test_filename_candidates_order_and_dedup() {
        assert_eq!(
            filename_candidates("my-long_slug"),
            vec!["my-long_slug", "my_long_slug", "my-long-slug"]
        );
        assert_eq!(filename_candidates("plain"), vec!["plain"]);
    }
}
