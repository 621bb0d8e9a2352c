//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Content discovery and resolution settings
    #[serde(default)]
    pub content: ContentConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::config("http.max_concurrent must be > 0"));
        }
        if Url::parse(&self.content.origin).is_err() {
            return Err(AppError::config(format!(
                "content.origin is not a valid URL: {}",
                self.content.origin
            )));
        }
        if self.content.base_candidates.is_empty() {
            return Err(AppError::config("No content.base_candidates defined"));
        }
        if self.content.probe_files.is_empty() {
            return Err(AppError::config("No content.probe_files defined"));
        }
        if self.content.manifest_file.trim().is_empty() {
            return Err(AppError::config("content.manifest_file is empty"));
        }
        if self.content.page_templates.is_empty() {
            return Err(AppError::config("No content.page_templates defined"));
        }
        for template in &self.content.page_templates {
            if !template.contains("{slug}") {
                return Err(AppError::config(format!(
                    "Page template missing {{slug}} placeholder: {template}"
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent fetches when loading the full collection
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Content discovery and resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Origin the content is served from
    #[serde(default = "defaults::origin")]
    pub origin: String,

    /// Ordered candidate base locations probed during discovery
    #[serde(default = "defaults::base_candidates")]
    pub base_candidates: Vec<String>,

    /// Well-known filenames used for existence probes
    #[serde(default = "defaults::probe_files")]
    pub probe_files: Vec<String>,

    /// Plain-text manifest resource inside the base location
    #[serde(default = "defaults::manifest_file")]
    pub manifest_file: String,

    /// Seed filenames assumed to exist when no manifest is readable
    #[serde(default = "defaults::seed_files")]
    pub seed_files: Vec<String>,

    /// Ordered page path templates; `{slug}` is substituted
    #[serde(default = "defaults::page_templates")]
    pub page_templates: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            origin: defaults::origin(),
            base_candidates: defaults::base_candidates(),
            probe_files: defaults::probe_files(),
            manifest_file: defaults::manifest_file(),
            seed_files: defaults::seed_files(),
            page_templates: defaults::page_templates(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; mdresolver/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Content defaults
    pub fn origin() -> String {
        "http://localhost:5173".into()
    }
    pub fn base_candidates() -> Vec<String> {
        vec![
            "/content/posts".into(),
            "/posts".into(),
            "/blog/posts".into(),
            "/content".into(),
        ]
    }
    pub fn probe_files() -> Vec<String> {
        vec![
            "index.txt".into(),
            "first-post.md".into(),
            "hello-world.md".into(),
        ]
    }
    pub fn manifest_file() -> String {
        "index.txt".into()
    }
    pub fn seed_files() -> Vec<String> {
        vec!["first-post.md".into(), "second-post.md".into()]
    }
    pub fn page_templates() -> Vec<String> {
        vec!["/content/pages/{slug}.md".into(), "/pages/{slug}.md".into()]
    }
}
