// src/models/mod.rs

//! Domain models for the resolver.

mod config;
mod document;

// Re-export all public types
pub use config::{Config, ContentConfig, HttpConfig};
pub use document::{Document, Metadata};
