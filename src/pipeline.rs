//! Search-then-filter orchestration.
//!
//! A run searches once, then fetches every identifier in order. A failed
//! detail fetch is recorded in the [`Report`] without stopping the run; a
//! failed search aborts it.

use crate::models::{ArticleRecord, SearchQuery};
use crate::sources::{ArticleSource, SourceError};

/// Detail fetch that failed for one identifier
#[derive(Debug)]
pub struct FetchFailure {
    pub pubmed_id: String,
    pub error: SourceError,
}

/// Outcome of a full run
#[derive(Debug, Default)]
pub struct Report {
    /// Qualifying records in search order
    pub records: Vec<ArticleRecord>,

    /// Identifiers whose fetch or parse failed
    pub failures: Vec<FetchFailure>,

    /// Identifiers fetched successfully but without a qualifying affiliation
    pub skipped: Vec<String>,
}

impl Report {
    /// Number of identifiers returned by the search
    pub fn searched(&self) -> usize {
        self.records.len() + self.failures.len() + self.skipped.len()
    }
}

/// Fetch one article and keep it only if it has a pharma/biotech author.
///
/// With `debug` set the record's summary is printed to stdout before filtering.
/// `Ok(None)` means the article does not qualify.
pub async fn fetch_paper_details<S>(
    source: &S,
    pubmed_id: &str,
    debug: bool,
) -> Result<Option<ArticleRecord>, SourceError>
where
    S: ArticleSource + ?Sized,
{
    let record = source.fetch_article(pubmed_id).await?;

    if debug {
        println!("{}", record.debug_summary());
    }

    if record.has_pharma_biotech_affiliation {
        Ok(Some(record))
    } else {
        tracing::debug!(pubmed_id, "no pharma/biotech affiliation, skipping");
        Ok(None)
    }
}

/// Run the whole search and filter pass for `query`.
pub async fn run<S>(source: &S, query: &SearchQuery, debug: bool) -> Result<Report, SourceError>
where
    S: ArticleSource + ?Sized,
{
    let ids = source.search_ids(query).await?;
    tracing::info!(source = source.name(), count = ids.len(), "fetching article details");

    let mut report = Report::default();

    for id in ids {
        match fetch_paper_details(source, &id, debug).await {
            Ok(Some(record)) => report.records.push(record),
            Ok(None) => report.skipped.push(id),
            Err(error) => {
                tracing::debug!(pubmed_id = %id, %error, "detail fetch failed");
                report.failures.push(FetchFailure {
                    pubmed_id: id,
                    error,
                });
            }
        }
    }

    tracing::info!(
        qualifying = report.records.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "run complete"
    );

    Ok(report)
}
