//! PubMed research source implementation using E-utilities API.
//!
//! Search goes through `esearch` (JSON), article details through `efetch`
//! (XML). Each call is a single request; there is no retry.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Deserialize;
use std::sync::Arc;

use crate::classify::{extract_email, is_pharma_biotech};
use crate::config::{Config, PubMedConfig};
use crate::models::{ArticleRecord, SearchQuery};
use crate::sources::{ArticleSource, SourceError};
use crate::utils::HttpClient;

/// PubMed research source
///
/// Uses NCBI E-utilities API for searching and fetching PubMed records.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    config: PubMedConfig,
}

impl PubMedSource {
    /// Create a PubMed source against the public E-utilities endpoints
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&Config::default())
    }

    /// Create a PubMed source from application configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)?;
        Ok(Self::with_client(Arc::new(client), config.pubmed.clone()))
    }

    /// Create with a shared HTTP client
    pub fn with_client(client: Arc<HttpClient>, config: PubMedConfig) -> Self {
        Self { client, config }
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let params = [
            ("db", self.config.database.clone()),
            ("term", query.query.clone()),
            ("retmax", query.max_results.to_string()),
            ("retmode", "json".to_string()),
        ];
        format!("{}?{}", self.config.esearch_url, encode_params(&params))
    }

    /// Build E-utilities fetch URL for one PubMed ID
    fn build_fetch_url(&self, id: &str) -> String {
        let params = [
            ("db", self.config.database.clone()),
            ("id", id.to_string()),
            ("retmode", "xml".to_string()),
        ];
        format!("{}?{}", self.config.efetch_url, encode_params(&params))
    }
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait]
impl ArticleSource for PubMedSource {
    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search_ids(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }
        if query.max_results == 0 {
            return Err(SourceError::InvalidRequest(
                "max results must be at least 1".to_string(),
            ));
        }

        let url = self.build_search_url(query);
        let body = self.client.get_text("esearch", &url).await?;
        let ids = parse_search_json(&body)?;

        tracing::info!(query = %query.query, count = ids.len(), "PubMed search returned ids");
        Ok(ids)
    }

    async fn fetch_article(&self, id: &str) -> Result<ArticleRecord, SourceError> {
        if id.trim().is_empty() {
            return Err(SourceError::InvalidRequest(
                "article identifier must not be empty".to_string(),
            ));
        }

        let url = self.build_fetch_url(id);
        let xml = self.client.get_text("efetch", &url).await?;
        parse_article_xml(id, &xml)
    }
}

/// Parse an `esearch` JSON body into the ordered identifier list.
///
/// A body without `esearchresult.idlist` yields no identifiers.
pub fn parse_search_json(json: &str) -> Result<Vec<String>, SourceError> {
    #[derive(Debug, Deserialize)]
    struct ESearchResponse {
        #[serde(default)]
        esearchresult: Option<ESearchResult>,
    }

    #[derive(Debug, Deserialize)]
    struct ESearchResult {
        #[serde(default)]
        idlist: Vec<String>,
        #[serde(rename = "ERROR", default)]
        error: Option<String>,
    }

    let response: ESearchResponse = serde_json::from_str(json)
        .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search JSON: {}", e)))?;

    match response.esearchresult {
        Some(result) => {
            if let Some(error) = &result.error {
                tracing::warn!(%error, "PubMed search reported an error");
            }
            Ok(result.idlist)
        }
        None => Ok(Vec::new()),
    }
}

/// Field whose text is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Year,
    LastName,
    ForeName,
    Affiliation,
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

/// An `Author` element under construction
#[derive(Debug, Default)]
struct AuthorState {
    depth: usize,
    validated: bool,
    last_name: Option<String>,
    fore_name: Option<String>,
    affiliations: Vec<String>,
}

impl AuthorState {
    fn full_name(&self) -> Option<String> {
        match (self.fore_name.as_deref(), self.last_name.as_deref()) {
            (Some(fore), Some(last)) if !fore.is_empty() && !last.is_empty() => {
                Some(format!("{} {}", fore, last))
            }
            _ => None,
        }
    }

    /// Fold this author into the record.
    ///
    /// Authors lacking a fore or last name contribute nothing. Validated
    /// authors offer the email found in their last affiliation.
    fn apply_to(self, record: &mut ArticleRecord) {
        let Some(full_name) = self.full_name() else {
            return;
        };

        for affiliation in &self.affiliations {
            if is_pharma_biotech(affiliation) {
                record.add_company_author(&full_name, affiliation);
            }
        }

        if self.validated {
            if let Some(email) = self.affiliations.last().and_then(|a| extract_email(a)) {
                record.offer_email(email);
            }
        }
    }
}

/// Decide whether the element opening at `depth` starts a field capture
fn capture_for(
    name: &str,
    parent: Option<&str>,
    depth: usize,
    record: &ArticleRecord,
    author: Option<&AuthorState>,
) -> Option<Capture> {
    let direct_author_child = author.is_some_and(|a| a.depth + 1 == depth);

    let field = match name {
        "ArticleTitle" if record.title.is_none() => Field::Title,
        "Year" if parent == Some("PubDate") && record.publication_date.is_none() => Field::Year,
        "LastName" if direct_author_child => Field::LastName,
        "ForeName" if direct_author_child => Field::ForeName,
        "Affiliation" if author.is_some() && parent == Some("AffiliationInfo") => {
            Field::Affiliation
        }
        _ => return None,
    };

    Some(Capture {
        field,
        depth,
        text: String::new(),
    })
}

fn finish_capture(capture: Capture, record: &mut ArticleRecord, author: Option<&mut AuthorState>) {
    let text = capture.text.trim().to_string();
    match (capture.field, author) {
        (Field::Title, _) => record.title = Some(text),
        (Field::Year, _) => record.publication_date = Some(text),
        (Field::LastName, Some(author)) => {
            author.last_name.get_or_insert(text);
        }
        (Field::ForeName, Some(author)) => {
            author.fore_name.get_or_insert(text);
        }
        (Field::Affiliation, Some(author)) => author.affiliations.push(text),
        _ => {}
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn reject_second_root(saw_root: bool, stack: &[String]) -> Result<(), SourceError> {
    if saw_root && stack.is_empty() {
        return Err(SourceError::Parse(
            "content after the root element".to_string(),
        ));
    }
    Ok(())
}

fn get_attr(e: &BytesStart<'_>, attr_name: &str) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == attr_name.as_bytes())
        .and_then(|a| {
            std::str::from_utf8(a.value.as_ref())
                .ok()
                .map(|s| s.to_string())
        })
}

/// Parse an `efetch` XML document into an [`ArticleRecord`] candidate.
///
/// - title: first `ArticleTitle` anywhere in the document
/// - publication date: first `PubDate/Year`
/// - every `Author` with both `ForeName` and `LastName` has each
///   `AffiliationInfo/Affiliation` classified; matches are recorded
/// - `ValidYN="Y"` authors offer an email from their last affiliation
///
/// The document must be well formed; otherwise [`SourceError::Parse`] is returned.
pub fn parse_article_xml(pubmed_id: &str, xml: &str) -> Result<ArticleRecord, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut record = ArticleRecord::new(pubmed_id);
    let mut stack: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut author: Option<AuthorState> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                reject_second_root(saw_root, &stack)?;
                saw_root = true;
                let name = element_name(e);
                let depth = stack.len() + 1;

                if capture.is_none() {
                    capture = capture_for(
                        &name,
                        stack.last().map(String::as_str),
                        depth,
                        &record,
                        author.as_ref(),
                    );
                }

                if name == "Author" && author.is_none() {
                    author = Some(AuthorState {
                        depth,
                        validated: get_attr(e, "ValidYN").as_deref() == Some("Y"),
                        ..Default::default()
                    });
                }

                stack.push(name);
            }
            Event::Empty(ref e) => {
                reject_second_root(saw_root, &stack)?;
                saw_root = true;
                // <Tag/> behaves like an element with empty text
                if capture.is_none() {
                    let name = element_name(e);
                    let depth = stack.len() + 1;
                    if let Some(empty) = capture_for(
                        &name,
                        stack.last().map(String::as_str),
                        depth,
                        &record,
                        author.as_ref(),
                    ) {
                        finish_capture(empty, &mut record, author.as_mut());
                    }
                }
            }
            Event::Text(ref e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                let name = stack.pop().ok_or_else(|| {
                    SourceError::Parse("closing tag without matching opening tag".to_string())
                })?;

                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let Some(done) = capture.take() {
                        finish_capture(done, &mut record, author.as_mut());
                    }
                }

                if name == "Author" && author.as_ref().is_some_and(|a| a.depth == depth) {
                    if let Some(done) = author.take() {
                        done.apply_to(&mut record);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(SourceError::Parse(
            "PubMed document has no root element".to_string(),
        ));
    }
    if let Some(open) = stack.last() {
        return Err(SourceError::Parse(format!(
            "PubMed document ends inside <{}>",
            open
        )));
    }

    Ok(record)
}
