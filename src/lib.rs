//! # get-papers-list
//!
//! Search PubMed and keep only the articles with at least one author affiliated
//! with a pharmaceutical or biotech organization.
//!
//! ## Architecture
//!
//! - [`sources`]: the [`ArticleSource`] trait and the PubMed E-utilities client
//! - [`classify`]: affiliation keyword classifier and email extraction
//! - [`pipeline`]: search, per-article fetch and filtering
//! - [`output`]: CSV and console table rendering
//! - [`models`]: [`ArticleRecord`] and [`SearchQuery`]
//! - [`config`]: configuration management
//! - [`utils`]: HTTP client

pub mod classify;
pub mod config;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{ArticleRecord, SearchQuery};
pub use sources::{ArticleSource, PubMedSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
