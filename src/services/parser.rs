// src/services/parser.rs

//! Front matter parsing.
//!
//! Splits the leading `---` delimited YAML header from a document body and
//! classifies HTML application shells that a dev server returns in place of
//! missing files.

use std::collections::BTreeMap;

use crate::error::{AppError, Result};

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Split a leading front matter header from the remaining body text.
///
/// Text without an opening delimiter is all body with empty metadata.
/// Scalar header values are stringified; nested values are skipped. An
/// empty body after the header is valid.
///
/// # Errors
///
/// Returns an error when the opening delimiter is present but never
/// terminated, or when the header block is not valid YAML. Callers treat
/// both as "no document".
pub fn split_front_matter(text: &str) -> Result<(BTreeMap<String, String>, String)> {
    let Some(rest) = strip_opening_delimiter(text) else {
        return Ok((BTreeMap::new(), text.to_string()));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((parse_header(header)?, body.to_string()));
        }
        offset += line.len();
    }

    Err(AppError::parse("front matter header is not terminated"))
}

/// Strip the opening delimiter line, returning the remainder.
fn strip_opening_delimiter(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n')
}

/// Parse the header block as a YAML mapping of scalar values.
fn parse_header(header: &str) -> Result<BTreeMap<String, String>> {
    if header.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let mapping: serde_yaml::Mapping = serde_yaml::from_str(header)?;
    let mut fields = BTreeMap::new();

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            // Sequences, mappings and nulls have no string form
            _ => continue,
        };
        fields.insert(key.to_string(), value);
    }

    Ok(fields)
}

/// Check whether a response body looks like an HTML application shell
/// rather than document content.
///
/// Dev servers answer unknown paths with the bundled index.html; a doctype
/// declaration or a dev-client bootstrap script marks such a body as
/// "not found" rather than a document.
pub fn looks_like_html_shell(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(512)
        .collect::<String>()
        .to_lowercase();

    head.starts_with("<!doctype html")
        || head.starts_with("<html")
        || head.contains("/@vite/client")
        || head.contains("<div id=\"root\">")
}
