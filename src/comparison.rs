//! Table orchestrator: walks the uploaded spreadsheet row by row and builds
//! the comparison table.

use crate::models::{
    CellValue, ComparisonReport, InputTable, ResultTable, INVALID_URL, WEBSITE_COLUMN,
};
use crate::scrapers::dispatch::{fetchable_url, process_column, Extractor};
use crate::scrapers::fetcher::ParsedPage;
use crate::scrapers::traits::PageSource;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// How pages are shared between the cells of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageReuse {
    /// Fetch each distinct URL once per row
    #[default]
    PerRow,
    /// Fetch once per cell
    PerCell,
}

/// Wraps a page source and counts fetches and failures
struct CountingSource<'a, S: ?Sized> {
    inner: &'a S,
    fetched: AtomicUsize,
    failed: AtomicUsize,
}

impl<'a, S: PageSource + ?Sized> CountingSource<'a, S> {
    fn new(inner: &'a S) -> Self {
        Self {
            inner,
            fetched: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl<'a, S: PageSource + ?Sized> PageSource for CountingSource<'a, S> {
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let body = self.inner.fetch_page(url).await;
        self.fetched.fetch_add(1, Ordering::Relaxed);
        if body.is_none() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        body
    }

    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Network location (`[user[:pass]@]host[:port]`) of a URL exactly as
/// written: no case folding, no default-port removal. Empty when the text
/// has no `//` authority after its scheme.
pub fn network_location(text: &str) -> String {
    let cleaned: String = text
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\r' | '\n'))
        .collect();

    let rest = match cleaned.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => cleaned.as_str(),
    };

    let Some(authority) = rest.strip_prefix("//") else {
        return String::new();
    };
    let end = authority.find(|c| matches!(c, '/' | '?' | '#')).unwrap_or(authority.len());
    authority[..end].to_string()
}

/// Identifier for a result row, taken from the first column's URL.
/// Empty and typed (numeric or boolean) cells get a `Row N` placeholder.
pub fn website_for_row(first: Option<&CellValue>, index: usize) -> String {
    match first.and_then(CellValue::as_text) {
        Some(text) => network_location(text),
        None => format!("Row {}", index + 1),
    }
}

fn result_columns(table: &InputTable) -> Vec<String> {
    std::iter::once(WEBSITE_COLUMN.to_string())
        .chain(
            table
                .columns
                .iter()
                .filter(|c| c.as_str() != WEBSITE_COLUMN)
                .cloned(),
        )
        .collect()
}

async fn enrich_row<S: PageSource + ?Sized>(
    source: &S,
    columns: &[String],
    cells: &[CellValue],
    reuse: PageReuse,
) -> Vec<String> {
    let targets = columns
        .iter()
        .zip(cells)
        .filter(|(column, _)| column.as_str() != WEBSITE_COLUMN);

    match reuse {
        PageReuse::PerCell => {
            let mut out = Vec::with_capacity(columns.len());
            for (column, cell) in targets {
                out.push(process_column(source, column, cell).await.to_string());
            }
            out
        }
        PageReuse::PerRow => {
            let mut bodies: HashMap<&str, Option<String>> = HashMap::new();
            for (_, cell) in targets.clone() {
                if let Some(url) = fetchable_url(cell) {
                    if !bodies.contains_key(url) {
                        let body = source.fetch_page(url).await;
                        bodies.insert(url, body);
                    }
                }
            }

            let pages: HashMap<&str, Option<ParsedPage>> = bodies
                .into_iter()
                .map(|(url, body)| (url, body.map(|b| ParsedPage::parse(&b))))
                .collect();

            targets
                .map(|(column, cell)| match fetchable_url(cell) {
                    Some(url) => {
                        let page = pages.get(url).and_then(Option::as_ref);
                        Extractor::for_column(column).apply(column, page).to_string()
                    }
                    None => INVALID_URL.to_string(),
                })
                .collect()
        }
    }
}

/// Enrich every row with one signal per cell, recording run metadata
/// alongside the result table.
pub async fn enrich<S: PageSource + ?Sized>(
    source: &S,
    table: &InputTable,
    reuse: PageReuse,
) -> ComparisonReport {
    let started_at = Utc::now();
    let counting = CountingSource::new(source);
    let columns = result_columns(table);

    info!(
        "Enriching {} rows x {} columns via {}",
        table.len(),
        table.columns.len(),
        source.source_name()
    );

    let mut rows = Vec::with_capacity(table.len());
    for (index, cells) in table.rows.iter().enumerate() {
        let website = website_for_row(cells.first(), index);
        debug!(row = index + 1, website = %website, "Processing row");

        let mut row = vec![website];
        row.extend(enrich_row(&counting, &table.columns, cells, reuse).await);
        rows.push(row);

        info!("Processed row {}/{}", index + 1, table.len());
    }

    let report = ComparisonReport {
        started_at,
        finished_at: Utc::now(),
        rows: rows.len(),
        pages_fetched: counting.fetched.load(Ordering::Relaxed),
        fetch_failures: counting.failed.load(Ordering::Relaxed),
        table: ResultTable { columns, rows },
    };

    info!(
        "✅ Enriched {} rows ({} pages fetched, {} failed)",
        report.rows, report.pages_fetched, report.fetch_failures
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{FetchParams, HttpPageFetcher};
    use std::sync::Mutex;

    /// Serves fixed HTML per URL and records every request
    struct MapSource {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageSource for MapSource {
        async fn fetch_page(&self, url: &str) -> Option<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned()
        }

        fn source_name(&self) -> &'static str {
            "map"
        }
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> InputTable {
        let mut table = InputTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|f| CellValue::from_field(f)).collect());
        }
        table
    }

    #[test]
    fn network_location_keeps_port_and_credentials() {
        assert_eq!(network_location("https://www.example.com/hotel?id=1"), "www.example.com");
        assert_eq!(network_location("http://127.0.0.1:8080/x"), "127.0.0.1:8080");
        assert_eq!(network_location("https://bob:pw@example.com/"), "bob:pw@example.com");
        assert_eq!(network_location("example.com/path"), "");
        assert_eq!(network_location("mailto:a@b.c"), "");
    }

    #[test]
    fn network_location_keeps_text_as_written() {
        assert_eq!(network_location("http://example.com:80/x"), "example.com:80");
        assert_eq!(network_location("https://WWW.Example.com"), "WWW.Example.com");
        assert_eq!(network_location("http:example.com"), "");
        assert_eq!(network_location("//cdn.example.com/img.jpg"), "cdn.example.com");
        assert_eq!(network_location("https://a.test?q=1#frag"), "a.test");
        assert_eq!(network_location("  https://a.test/x"), "a.test");
    }

    #[test]
    fn website_placeholder_for_non_text_first_cell() {
        assert_eq!(website_for_row(Some(&CellValue::Scalar("17".into())), 1), "Row 2");
        assert_eq!(website_for_row(Some(&CellValue::from_field("N/A")), 3), "Row 4");
    }

    #[test]
    fn website_placeholder_for_empty_first_cell() {
        assert_eq!(website_for_row(Some(&CellValue::Empty), 0), "Row 1");
        assert_eq!(website_for_row(None, 4), "Row 5");
        assert_eq!(
            website_for_row(Some(&CellValue::Text("not a url".into())), 2),
            ""
        );
    }

    #[tokio::test]
    async fn website_column_comes_first() {
        let source = MapSource::new(&[("https://a.test/1", "<h1>A</h1><img><img>")]);
        let input = table(
            &["URL", "No. of Images", "Page Placement"],
            &[&["https://a.test/1", "https://a.test/1", "https://a.test/1"]],
        );

        let result = enrich(&source, &input, PageReuse::PerRow).await.table;

        assert_eq!(result.columns, vec!["Website", "URL", "No. of Images", "Page Placement"]);
        assert_eq!(result.rows[0], vec!["a.test", "Not Found", "2", "A"]);
    }

    #[tokio::test]
    async fn per_row_cache_fetches_each_url_once() {
        let source = MapSource::new(&[
            ("https://a.test/", "<p>pool and breakfast</p>"),
            ("https://b.test/", "<p>nothing here</p>"),
        ]);
        let input = table(
            &["URL", "Pool", "Restaurant", "Gym"],
            &[
                &["https://a.test/", "https://a.test/", "https://a.test/", "https://b.test/"],
                &["https://a.test/", "https://a.test/", "", "https://a.test/"],
            ],
        );

        let report = enrich(&source, &input, PageReuse::PerRow).await;

        // Row 1 touches two URLs, row 2 re-fetches a.test since the cache is per row
        assert_eq!(source.request_count(), 3);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.fetch_failures, 0);
        assert_eq!(report.table.cell(0, "Pool"), Some("Found"));
        assert_eq!(report.table.cell(0, "Restaurant"), Some("Found"));
        assert_eq!(report.table.cell(0, "Gym"), Some("Not Found"));
        assert_eq!(report.table.cell(1, "Restaurant"), Some("Invalid URL"));
    }

    #[tokio::test]
    async fn per_cell_mode_matches_per_row_results() {
        let source = MapSource::new(&[("https://a.test/", "<div>Rating 8.9</div><img width=\"900\" src=\"h.jpg\">")]);
        let input = table(
            &["URL", "Current Rating", "Hero Photo?"],
            &[&["https://a.test/", "https://a.test/", "https://a.test/"]],
        );

        let per_row = enrich(&source, &input, PageReuse::PerRow).await;
        assert_eq!(source.request_count(), 1);

        let per_cell = enrich(&source, &input, PageReuse::PerCell).await;
        assert_eq!(source.request_count(), 4);

        assert_eq!(per_row.table, per_cell.table);
        assert_eq!(per_cell.table.cell(0, "Current Rating"), Some("Rating 8.9"));
        assert_eq!(per_cell.table.cell(0, "Hero Photo?"), Some("h.jpg"));
    }

    #[tokio::test]
    async fn input_website_column_is_replaced() {
        let source = MapSource::new(&[]);
        let input = table(&["URL", "Website"], &[&["https://x.test/a", "https://x.test/a"]]);

        let result = enrich(&source, &input, PageReuse::PerRow).await.table;

        assert_eq!(result.columns, vec!["Website", "URL"]);
        assert_eq!(result.rows[0], vec!["x.test", "Error"]);
        assert_eq!(source.request_count(), 1);
    }

    #[tokio::test]
    async fn one_bad_cell_does_not_stop_the_run() {
        let source = MapSource::new(&[("https://ok.test/", "<p>spa</p>")]);
        let input = table(
            &["URL", "Pool"],
            &[&["", "https://ok.test/"], &["https://down.test/", "https://down.test/"]],
        );

        let report = enrich(&source, &input, PageReuse::PerRow).await;

        assert_eq!(report.table.rows[0], vec!["Row 1", "Invalid URL", "Found"]);
        assert_eq!(report.table.rows[1], vec!["down.test", "Error", "Error"]);
        assert_eq!(report.fetch_failures, 1);
    }

    #[tokio::test]
    async fn end_to_end_against_http_server() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/villa")
            .with_status(200)
            .with_body("<html><body><p>Private Jacuzzi on the terrace</p></body></html>")
            .create_async()
            .await;

        let up = format!("{}/villa", server.url());
        let up = up.as_str();
        let down = "http://127.0.0.1:1/gone";
        let input = table(&["URL", "Pool"], &[&[up, up], &[down, down]]);

        let fetcher = HttpPageFetcher::with_params(FetchParams::default()).unwrap();
        let result = enrich(&fetcher, &input, PageReuse::default()).await.table;

        let host = network_location(&server.url());
        assert_eq!(result.rows[0], vec![host.as_str(), "Not Found", "Found"]);
        assert_eq!(result.cell(0, "Pool"), Some("Found"));
        assert_eq!(result.cell(1, "Website"), Some("127.0.0.1:1"));
        assert_eq!(result.cell(1, "Pool"), Some("Error"));
    }
}
