//! Utility functions and helpers.

pub mod path;

use url::Url;

use crate::error::Result;

/// Join a normalized content path against the serving origin,
/// producing a fully qualified URL.
pub fn join_origin(origin: &str, path: &str) -> Result<String> {
    let base = Url::parse(origin)?;
    Ok(base.join(path)?.to_string())
}
