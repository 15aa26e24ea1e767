//! Article sources.
//!
//! An [`ArticleSource`] performs the two remote round trips of a run: a search
//! returning identifiers, and a per-identifier detail fetch returning a parsed
//! [`ArticleRecord`] candidate. [`PubMedSource`] talks to NCBI E-utilities;
//! [`MockSource`] serves canned data for tests.

mod mock;
mod pubmed;

pub use mock::{make_company_record, MockSource};
pub use pubmed::{parse_article_xml, parse_search_json, PubMedSource};

use async_trait::async_trait;

use crate::models::{ArticleRecord, SearchQuery};

/// Interface for a literature database that can be searched and queried per article.
#[async_trait]
pub trait ArticleSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Return the identifiers matching `query`, in the order the source ranks them
    async fn search_ids(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError>;

    /// Fetch and parse one article.
    ///
    /// The returned record may have no qualifying affiliation; filtering is the
    /// caller's job.
    async fn fetch_article(&self, id: &str) -> Result<ArticleRecord, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The remote endpoint answered with a non-success status
    #[error("Failed to fetch from {endpoint}: HTTP status {status}")]
    RemoteFetch { endpoint: &'static str, status: u16 },

    /// Parsing error (XML or JSON body)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error (report file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// HTTP status carried by a [`SourceError::RemoteFetch`]
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::RemoteFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<csv::Error> for SourceError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SourceError::Io(io),
            other => SourceError::Io(std::io::Error::other(format!("CSV: {:?}", other))),
        }
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
