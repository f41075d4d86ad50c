//! Command-line surface for the listing comparison tool.

use crate::spreadsheet::DEFAULT_OUTPUT;
use clap::Parser;
use std::path::PathBuf;

/// Enrich a spreadsheet of listing URLs with signals scraped from each page.
///
/// ```sh
/// listing-scout listings.csv
/// listing-scout listings.csv -o out.csv --json-report run.json --preview
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated input file, header row first, ISO-8859-1 encoded
    pub input: PathBuf,

    /// Where to write the comparison table
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Also write the table and run statistics as JSON
    #[arg(long)]
    pub json_report: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Keep blank-header ("Unnamed") columns instead of dropping them
    #[arg(long)]
    pub keep_unnamed: bool,

    /// Fetch every cell's page separately instead of once per row
    #[arg(long)]
    pub no_page_cache: bool,

    /// Print the result table to stdout
    #[arg(long)]
    pub preview: bool,

    /// Shared password, checked against LISTING_SCOUT_SECRET
    #[arg(long, env = "LISTING_SCOUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}
