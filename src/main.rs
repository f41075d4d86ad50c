mod cli;
mod comparison;
mod models;
mod scrapers;
mod session;
mod spreadsheet;

use clap::Parser;
use cli::Cli;
use comparison::PageReuse;
use scrapers::{FetchParams, HttpPageFetcher};
use session::{AccessGate, Session};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Cli::parse();
    debug!(?args.input, ?args.output, "Parsed CLI arguments");

    info!("📊 Listing Scout - comparison tool");
    info!("==================================");

    let gate = AccessGate::from_env();
    let mut session = Session::new();
    session.login(&gate, args.password.as_deref())?;
    session.require()?;

    let table = spreadsheet::read_input(&args.input, !args.keep_unnamed).await?;
    if table.is_empty() {
        warn!("Input has no data rows; writing an empty comparison table");
    }

    let fetcher = HttpPageFetcher::with_params(FetchParams::with_timeout_secs(args.timeout_secs))?;
    let reuse = if args.no_page_cache {
        PageReuse::PerCell
    } else {
        PageReuse::PerRow
    };

    let report = comparison::enrich(&fetcher, &table, reuse).await;

    if args.preview {
        println!("{}", report.table.columns.join(" | "));
        for row in &report.table.rows {
            println!("{}", row.join(" | "));
        }
        println!();
    }

    spreadsheet::write_results(&args.output, &report.table).await?;

    if let Some(path) = &args.json_report {
        spreadsheet::write_report_json(path, &report).await?;
    }

    Ok(())
}
