use anyhow::{Context, Result};
use clap::Parser;
use get_papers_list::config::{find_config_file, load_config, Config};
use get_papers_list::models::SearchQuery;
use get_papers_list::output::{write_csv_file, write_table};
use get_papers_list::pipeline;
use get_papers_list::sources::{ArticleSource, PubMedSource};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch research papers from PubMed with pharmaceutical/biotech affiliations.
#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch research papers from PubMed with pharmaceutical/biotech affiliations.", long_about = None)]
#[command(after_help = "Example: get-papers-list 'COVID-19 vaccine' --file output.csv")]
struct Cli {
    /// PubMed query to search for papers
    query: String,

    /// Print debug information during execution
    #[arg(long, short)]
    debug: bool,

    /// Filename to save the results as a CSV file
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Maximum number of papers to fetch [default: 10]
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error log output
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if let Some(max) = self.max_results {
            config.pubmed.max_results = max;
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_secs = Some(timeout);
        }
    }

    fn log_level<'a>(&self, config: &'a Config) -> &'a str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("get_papers_list={}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);

    init_tracing(cli.log_level(&config));
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let source = PubMedSource::from_config(&config).context("Failed to create PubMed client")?;
    let query = SearchQuery::new(cli.query.as_str()).max_results(config.pubmed.max_results);

    execute(
        &cli,
        &source,
        &query,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    )
    .await
}

/// Run one search and write the report.
///
/// Progress and the table go to `out`; per-paper fetch failures go to `err`
/// regardless of the log level. A failed search is returned as an error.
async fn execute<S, O, E>(
    cli: &Cli,
    source: &S,
    query: &SearchQuery,
    out: &mut O,
    err: &mut E,
) -> Result<()>
where
    S: ArticleSource + ?Sized,
    O: Write,
    E: Write,
{
    if cli.debug {
        writeln!(out, "Fetching papers for query: {}", cli.query)?;
    }

    let report = pipeline::run(source, query, cli.debug)
        .await
        .context("Failed to fetch papers")?;

    for failure in &report.failures {
        writeln!(
            err,
            "Error fetching details for paper {}: {}",
            failure.pubmed_id, failure.error
        )?;
    }
    if !report.failures.is_empty() {
        tracing::warn!(
            "{} of {} papers could not be fetched",
            report.failures.len(),
            report.searched()
        );
    }

    match &cli.file {
        Some(path) => {
            write_csv_file(&report.records, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Results saved to {}", path.display())?;
        }
        None => write_table(&report.records, out)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use get_papers_list::models::ArticleRecord;
    use get_papers_list::output::EMPTY_NOTICE;
    use get_papers_list::sources::{make_company_record, MockSource};
    use tempfile::tempdir;

    async fn execute_with(cli: &Cli, source: &MockSource) -> (Result<()>, String, String) {
        let query = SearchQuery::new(cli.query.as_str());
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = execute(cli, source, &query, &mut out, &mut err).await;
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_cli_query_only() {
        let cli = Cli::parse_from(["get-papers-list", "COVID-19 vaccine"]);
        assert_eq!(cli.query, "COVID-19 vaccine");
        assert!(!cli.debug);
        assert!(cli.file.is_none());
        assert!(cli.max_results.is_none());
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["get-papers-list"]).is_err());
    }

    #[test]
    fn test_cli_debug_and_file_flags() {
        let cli = Cli::parse_from(["get-papers-list", "cancer", "-d", "-f", "out.csv"]);
        assert!(cli.debug);
        assert_eq!(cli.file, Some(PathBuf::from("out.csv")));

        let cli = Cli::parse_from(["get-papers-list", "cancer", "--debug", "--file", "x.csv"]);
        assert!(cli.debug);
        assert_eq!(cli.file, Some(PathBuf::from("x.csv")));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["get-papers-list", "cancer", "-n", "25", "--timeout", "60"]);
        let mut config = Config::default();
        cli.apply_to(&mut config);

        assert_eq!(config.pubmed.max_results, 25);
        assert_eq!(config.http.timeout_secs, Some(60));
    }

    #[test]
    fn test_cli_log_level() {
        let config = Config::default();

        let cli = Cli::parse_from(["get-papers-list", "q"]);
        assert_eq!(cli.log_level(&config), "info");

        let cli = Cli::parse_from(["get-papers-list", "q", "-vv"]);
        assert_eq!(cli.log_level(&config), "trace");

        let cli = Cli::parse_from(["get-papers-list", "q", "-v", "-q"]);
        assert_eq!(cli.log_level(&config), "error");
    }

    #[tokio::test]
    async fn test_execute_debug_announces_query() {
        let source = MockSource::new();
        source.set_search_ids(["1"]);
        source.add_article(make_company_record("1", "Jane Doe", "Pfizer Inc."));

        let cli = Cli::parse_from(["get-papers-list", "covid vaccine", "-d"]);
        let (result, out, _) = execute_with(&cli, &source).await;
        result.unwrap();
        assert!(out.starts_with("Fetching papers for query: covid vaccine\n"));
        assert!(out.contains("Pfizer Inc."));

        let cli = Cli::parse_from(["get-papers-list", "covid vaccine"]);
        let (_, out, _) = execute_with(&cli, &source).await;
        assert!(!out.contains("Fetching papers for query"));
    }

    #[tokio::test]
    async fn test_execute_saves_csv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let source = MockSource::new();
        source.set_search_ids(["1", "2"]);
        source.add_article(make_company_record("1", "Jane Doe", "Pfizer Inc."));
        source.add_article(ArticleRecord::new("2"));

        let file = path.to_str().unwrap();
        let cli = Cli::parse_from(["get-papers-list", "q", "-f", file]);
        let (result, out, _) = execute_with(&cli, &source).await;
        result.unwrap();

        assert_eq!(out, format!("Results saved to {}\n", path.display()));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_execute_reports_empty_result() {
        let source = MockSource::new();
        source.set_search_ids(["2"]);
        source.add_article(ArticleRecord::new("2"));

        let cli = Cli::parse_from(["get-papers-list", "q"]);
        let (result, out, _) = execute_with(&cli, &source).await;
        result.unwrap();
        assert_eq!(out, format!("{}\n", EMPTY_NOTICE));
    }

    #[tokio::test]
    async fn test_execute_prints_fetch_failures() {
        let source = MockSource::new();
        source.set_search_ids(["1", "2"]);
        source.fail_article("1", 500);
        source.add_article(make_company_record("2", "Jane Doe", "Moderna"));

        let cli = Cli::parse_from(["get-papers-list", "q", "-q"]);
        let (result, out, err) = execute_with(&cli, &source).await;
        result.unwrap();
        assert!(err.starts_with("Error fetching details for paper 1:"));
        assert_eq!(err.lines().count(), 1);
        assert!(out.contains("Moderna"));
    }

    #[tokio::test]
    async fn test_execute_fails_on_search_error() {
        let source = MockSource::new();
        source.fail_search(503);

        let cli = Cli::parse_from(["get-papers-list", "q"]);
        let (result, out, _) = execute_with(&cli, &source).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch papers"));
        assert!(out.is_empty());
        assert!(source.fetched_ids().is_empty());
    }
}
