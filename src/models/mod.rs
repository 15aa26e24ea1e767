//! Core data models for article records and search requests.

mod article;
mod search;

pub use article::ArticleRecord;
pub use search::{SearchQuery, DEFAULT_MAX_RESULTS};
