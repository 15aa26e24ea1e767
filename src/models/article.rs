//! Article record produced for each fetched PubMed entry.

/// Per-article metadata gathered from a detail document.
///
/// A record is built while one detail document is parsed. Only records with
/// `has_pharma_biotech_affiliation` set ever reach the report; the rest are
/// dropped by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Source-system article identifier (PMID)
    pub pubmed_id: String,

    /// Article title
    pub title: Option<String>,

    /// Four-digit publication year
    pub publication_date: Option<String>,

    /// Full names of authors with a qualifying affiliation, first occurrence order
    pub non_academic_authors: Vec<String>,

    /// Distinct qualifying affiliation texts, first occurrence order
    pub company_affiliations: Vec<String>,

    /// First email found among validated authors' affiliations
    pub corresponding_author_email: Option<String>,

    /// Whether any author matched the affiliation classifier
    pub has_pharma_biotech_affiliation: bool,
}

impl ArticleRecord {
    /// Create an empty record for the given identifier
    pub fn new(pubmed_id: impl Into<String>) -> Self {
        Self {
            pubmed_id: pubmed_id.into(),
            ..Default::default()
        }
    }

    /// Record a qualifying author/affiliation pair.
    ///
    /// Duplicates are skipped, so both lists stay in document order.
    pub fn add_company_author(&mut self, full_name: &str, affiliation: &str) {
        push_unique(&mut self.non_academic_authors, full_name);
        push_unique(&mut self.company_affiliations, affiliation);
        self.has_pharma_biotech_affiliation = true;
    }

    /// Record an email unless one was already found; the first one wins.
    pub fn offer_email(&mut self, email: String) {
        if self.corresponding_author_email.is_none() {
            self.corresponding_author_email = Some(email);
        }
    }

    /// Human-readable dump printed in debug mode
    pub fn debug_summary(&self) -> String {
        format!(
            "Processed paper ID: {}\n\
             Title: {}\n\
             Non-academic authors: {:?}\n\
             Company affiliations: {:?}\n\
             Corresponding author email: {}\n\
             {}",
            self.pubmed_id,
            self.title.as_deref().unwrap_or("None"),
            self.non_academic_authors,
            self.company_affiliations,
            self.corresponding_author_email.as_deref().unwrap_or("None"),
            "-".repeat(50),
        )
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
