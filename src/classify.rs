//! Affiliation classification and email extraction.
//!
//! Classification is a static, case-insensitive substring match against
//! [`PHARMA_BIOTECH_KEYWORDS`]. False positives such as "Therapy Clinic" and
//! unlisted companies are accepted behavior.

use regex::Regex;
use std::sync::OnceLock;

/// Keywords marking an affiliation as pharmaceutical or biotech (lowercase)
pub const PHARMA_BIOTECH_KEYWORDS: &[&str] = &[
    "pharma",
    "biotech",
    "pharmaceutical",
    "biotechnology",
    "inc.",
    "ltd.",
    "corp.",
    "company",
    "research and development",
    "drug",
    "vaccine",
    "therapy",
    "biologics",
    "genentech",
    "pfizer",
    "moderna",
    "astrazeneca",
    "novartis",
    "roche",
    "johnson & johnson",
    "merck",
    "gilead",
    "sanofi",
    "bayer",
];

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    // The pattern is a compile-time constant
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Check whether an affiliation belongs to a pharmaceutical or biotech organization.
pub fn is_pharma_biotech(affiliation: &str) -> bool {
    let affiliation = affiliation.to_lowercase();
    PHARMA_BIOTECH_KEYWORDS
        .iter()
        .any(|keyword| affiliation.contains(keyword))
}

/// Return the first email address embedded in `text`, if any.
pub fn extract_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}
