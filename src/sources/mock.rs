//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{ArticleRecord, SearchQuery};
use crate::sources::{ArticleSource, SourceError};

/// Canned outcome for one identifier
#[derive(Debug, Clone)]
enum MockArticle {
    Record(ArticleRecord),
    /// HTTP status returned instead of a document
    Status(u16),
    /// Parse failure message
    Malformed(String),
}

/// A mock source for testing that returns predefined responses.
///
/// Identifiers without a configured article fail with a 404 `RemoteFetch` error.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Mutex<Option<Result<Vec<String>, u16>>>,
    articles: Mutex<HashMap<String, MockArticle>>,
    fetched: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifiers returned by a search.
    pub fn set_search_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.ids.lock().unwrap();
        *guard = Some(Ok(ids.into_iter().map(Into::into).collect()));
    }

    /// Make searches fail with the given HTTP status.
    pub fn fail_search(&self, status: u16) {
        let mut guard = self.ids.lock().unwrap();
        *guard = Some(Err(status));
    }

    /// Return `record` when its identifier is fetched.
    pub fn add_article(&self, record: ArticleRecord) {
        let mut guard = self.articles.lock().unwrap();
        guard.insert(record.pubmed_id.clone(), MockArticle::Record(record));
    }

    /// Fail fetches of `id` with the given HTTP status.
    pub fn fail_article(&self, id: &str, status: u16) {
        let mut guard = self.articles.lock().unwrap();
        guard.insert(id.to_string(), MockArticle::Status(status));
    }

    /// Fail fetches of `id` with a parse error.
    pub fn malformed_article(&self, id: &str, message: &str) {
        let mut guard = self.articles.lock().unwrap();
        guard.insert(id.to_string(), MockArticle::Malformed(message.to_string()));
    }

    /// Identifiers fetched so far, in call order.
    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search_ids(&self, _query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        let guard = self.ids.lock().unwrap();
        match &*guard {
            Some(Ok(ids)) => Ok(ids.clone()),
            Some(Err(status)) => Err(SourceError::RemoteFetch {
                endpoint: "mock search",
                status: *status,
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_article(&self, id: &str) -> Result<ArticleRecord, SourceError> {
        self.fetched.lock().unwrap().push(id.to_string());

        let guard = self.articles.lock().unwrap();
        match guard.get(id) {
            Some(MockArticle::Record(record)) => Ok(record.clone()),
            Some(MockArticle::Status(status)) => Err(SourceError::RemoteFetch {
                endpoint: "mock fetch",
                status: *status,
            }),
            Some(MockArticle::Malformed(message)) => Err(SourceError::Parse(message.clone())),
            None => Err(SourceError::RemoteFetch {
                endpoint: "mock fetch",
                status: 404,
            }),
        }
    }
}

/// Helper function to create a qualifying mock record for testing.
pub fn make_company_record(id: &str, author: &str, affiliation: &str) -> ArticleRecord {
    let mut record = ArticleRecord::new(id);
    record.title = Some(format!("Article {}", id));
    record.publication_date = Some("2024".to_string());
    record.add_company_author(author, affiliation);
    record
}
