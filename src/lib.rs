// src/lib.rs

//! Markdown content resolver library.
//!
//! Resolves post and page slugs into parsed documents fetched over HTTP
//! from a runtime-discovered content directory.

pub mod error;
pub mod fetch;
pub mod models;
pub mod resolver;
pub mod services;
pub mod utils;

pub use models::{Config, Document, Metadata};
pub use resolver::Resolver;
