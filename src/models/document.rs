//! Parsed document structures.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Number of grapheme clusters used for the derived excerpt.
const EXCERPT_GRAPHEMES: usize = 100;

/// Metadata extracted from a document's front matter header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// Document title (falls back to the slug when absent)
    pub title: String,

    /// Canonical identifier (falls back to the filename stem when absent)
    pub slug: String,

    /// ISO 8601 date string. Defaults to the resolution time when the
    /// header carries no date; this is a documented fallback, not the
    /// file's true creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Short summary. Defaults to the leading graphemes of the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Additional scalar header fields, passed through unchanged.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Build metadata from parsed header fields, applying the defaulting
    /// rules for absent `slug`, `title`, `date` and `excerpt`.
    pub fn from_header(
        mut fields: BTreeMap<String, String>,
        path: &str,
        body: &str,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        let slug = fields
            .remove("slug")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| filename_stem(path));
        let title = fields
            .remove("title")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug.clone());
        let date = fields
            .remove("date")
            .filter(|s| !s.is_empty())
            .or_else(|| Some(resolved_at.to_rfc3339()));
        let excerpt = fields
            .remove("excerpt")
            .filter(|s| !s.is_empty())
            .or_else(|| Some(derive_excerpt(body)));

        Self {
            title,
            slug,
            date,
            excerpt,
            extra: fields,
        }
    }
}

/// A parsed content document. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    /// Parse the metadata date as a UTC timestamp.
    ///
    /// Accepts RFC 3339 as well as plain `YYYY-MM-DD` dates. Returns `None`
    /// when the date is absent or unparseable; collection ordering treats
    /// such documents as equal to any neighbor.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.metadata.date.as_deref()?;

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

/// Derive the filename stem of a content path (strip directories and the
/// `.md` extension).
fn filename_stem(path: &str) -> String {
    let filename = path.rsplit('/').next().unwrap_or(path);
    filename
        .strip_suffix(".md")
        .unwrap_or(filename)
        .to_string()
}

/// First `EXCERPT_GRAPHEMES` grapheme clusters of the body plus an
/// ellipsis marker.
fn derive_excerpt(body: &str) -> String {
    let mut excerpt: String = body.graphemes(true).take(EXCERPT_GRAPHEMES).collect();
    excerpt.push('…');
    excerpt
}
