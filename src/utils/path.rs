// src/utils/path.rs

//! Content path normalization.

/// Normalize a content path before any network access.
///
/// Guarantees exactly one leading separator and no internal runs of
/// consecutive separators. An absolute `http://`/`https://` URL keeps its
/// scheme and authority untouched; only the path part is collapsed.
/// Pure function, always succeeds, idempotent.
///
/// # Examples
/// ```
/// use mdresolver::utils::path::normalize;
///
/// assert_eq!(normalize("content//posts/a.md"), "/content/posts/a.md");
/// ```
pub fn normalize(path: &str) -> String {
    if let Some(scheme_end) = path.find("://") {
        let after_authority = &path[scheme_end + 3..];
        return match after_authority.find('/') {
            Some(idx) => {
                let (head, rest) = path.split_at(scheme_end + 3 + idx);
                format!("{head}{}", collapse_separators(rest))
            }
            None => path.to_string(),
        };
    }

    collapse_separators(&format!("/{path}"))
}

/// Collapse runs of `/` into a single separator.
fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_was_separator = false;

    for c in path.chars() {
        if c == '/' {
            if previous_was_separator {
                continue;
            }
            previous_was_separator = true;
        } else {
            previous_was_separator = false;
        }
        out.push(c);
    }

    out
}
