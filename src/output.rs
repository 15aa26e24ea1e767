//! Report rendering: CSV file output and a console table.

use comfy_table::{Attribute, Cell, Table};
use std::io::Write;
use std::path::Path;

use crate::models::ArticleRecord;
use crate::sources::SourceError;

/// Printed instead of a table when no article qualifies
pub const EMPTY_NOTICE: &str = "No articles with pharmaceutical/biotech affiliations found.";

/// CSV/table column names, in order
pub const COLUMNS: [&str; 7] = [
    "PubmedID",
    "Title",
    "PublicationDate",
    "NonAcademicAuthors",
    "CompanyAffiliations",
    "CorrespondingAuthorEmail",
    "HasPharmaBiotechAffiliation",
];

/// Cell values for one record, in [`COLUMNS`] order.
///
/// Absent values are empty; list columns use the list's `Debug` form.
pub fn record_fields(record: &ArticleRecord) -> [String; 7] {
    [
        record.pubmed_id.clone(),
        record.title.clone().unwrap_or_default(),
        record.publication_date.clone().unwrap_or_default(),
        format!("{:?}", record.non_academic_authors),
        format!("{:?}", record.company_affiliations),
        record.corresponding_author_email.clone().unwrap_or_default(),
        record.has_pharma_biotech_affiliation.to_string(),
    ]
}

/// Write records as CSV, header first (also when there are no records)
pub fn write_csv<W: Write>(records: &[ArticleRecord], writer: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.write_record(record_fields(record))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write records as CSV to `path`, replacing any existing file
pub fn write_csv_file(records: &[ArticleRecord], path: &Path) -> Result<(), SourceError> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)?;
    Ok(())
}

/// Render CSV into a string
pub fn to_csv_string(records: &[ArticleRecord]) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Build a console table of the records
pub fn render_table(records: &[ArticleRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(COLUMNS.to_vec());

    for record in records {
        let [id, rest @ ..] = record_fields(record);
        let mut row = vec![Cell::new(id).add_attribute(Attribute::Bold)];
        row.extend(rest.into_iter().map(Cell::new));
        table.add_row(row);
    }

    table
}

/// Write the console form of the report: a table, or a notice when empty
pub fn write_table<W: Write>(records: &[ArticleRecord], out: &mut W) -> std::io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "{}", EMPTY_NOTICE);
    }
    writeln!(out, "{}", render_table(records))
}
