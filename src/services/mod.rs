//! Resolution services: parsing, discovery and enumeration.

pub mod discovery;
pub mod manifest;
pub mod parser;

pub use discovery::DirectoryDiscovery;
pub use manifest::FileEnumerator;

/// Recognized document file extension.
pub const DOCUMENT_EXTENSION: &str = ".md";
