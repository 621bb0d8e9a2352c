// src/services/manifest.rs

//! Content file enumeration.
//!
//! Reads the plain-text manifest inside a discovered base location, falling
//! back to a fixed seed list when the manifest is missing or unreadable.

use crate::fetch::Fetch;
use crate::models::ContentConfig;
use crate::services::DOCUMENT_EXTENSION;
use crate::services::parser::looks_like_html_shell;
use crate::utils::{join_origin, path::normalize};

/// Service for enumerating the files a base location contains.
pub struct FileEnumerator<'a> {
    fetch: &'a dyn Fetch,
    config: &'a ContentConfig,
}

impl<'a> FileEnumerator<'a> {
    /// Create a new enumerator.
    pub fn new(fetch: &'a dyn Fetch, config: &'a ContentConfig) -> Self {
        Self { fetch, config }
    }

    /// List candidate document paths under `base`, fully joined and free of
    /// doubled separators.
    ///
    /// Prefers the explicit manifest resource; a missing, unreadable or
    /// empty manifest falls back to the configured seed filenames.
    pub async fn enumerate(&self, base: &str) -> Vec<String> {
        let filenames = match self.read_manifest(base).await {
            Some(names) if !names.is_empty() => names,
            _ => {
                log::debug!("No usable manifest under {base}, using seed list");
                self.config.seed_files.clone()
            }
        };

        filenames
            .iter()
            .map(|name| normalize(&format!("{base}/{name}")))
            .collect()
    }

    /// Read and parse the manifest: one filename per line, blank lines
    /// ignored, entries without the document extension ignored.
    async fn read_manifest(&self, base: &str) -> Option<Vec<String>> {
        let path = normalize(&format!("{base}/{}", self.config.manifest_file));
        let url = join_origin(&self.config.origin, &path).ok()?;

        let text = match self.fetch.get_text(&url).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("Manifest read failed for {path}: {e}");
                return None;
            }
        };

        if looks_like_html_shell(&text) {
            return None;
        }

        Some(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && line.ends_with(DOCUMENT_EXTENSION))
                .map(String::from)
                .collect(),
        )
    }
}
