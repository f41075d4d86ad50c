//! Reading the uploaded spreadsheet and writing the comparison results.
//!
//! Input is comma-separated text in ISO-8859-1 with a header row. Output is
//! UTF-8 comma-separated text with minimal quoting.

use crate::models::{is_scalar_column, CellValue, ComparisonReport, InputTable, ResultTable};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Default download name for the enriched table
pub const DEFAULT_OUTPUT: &str = "comparison_results.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Give blank headers a placeholder name and suffix duplicates (`Pool`,
/// `Pool.1`, `Pool.2`).
fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.enumerate()
        .map(|(idx, name)| {
            let base = if name.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Parse raw spreadsheet bytes into an input table
pub fn parse_input(bytes: &[u8], drop_unnamed: bool) -> Result<InputTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = encoding_rs::mem::decode_latin1(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().context("Failed to read header row")?.clone();
    let names = normalize_headers(headers.iter());

    let keep: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| !(drop_unnamed && name.starts_with("Unnamed")))
        .map(|(idx, _)| idx)
        .collect();

    if keep.len() < names.len() {
        debug!("Dropping {} unnamed columns", names.len() - keep.len());
    }

    let mut table = InputTable::new(keep.iter().map(|&idx| names[idx].clone()).collect());
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse data row {}", line + 1))?;
        table.push_row(
            keep.iter()
                .map(|&idx| CellValue::from_field(record.get(idx).unwrap_or("")))
                .collect(),
        );
    }

    for col in 0..table.columns.len() {
        if is_scalar_column(table.rows.iter().map(|row| &row[col])) {
            debug!("Column '{}' holds no text values", table.columns[col]);
            for row in &mut table.rows {
                row[col] = std::mem::replace(&mut row[col], CellValue::Empty).into_scalar();
            }
        }
    }

    Ok(table)
}

pub async fn read_input(path: impl AsRef<Path>, drop_unnamed: bool) -> Result<InputTable> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let table = parse_input(&bytes, drop_unnamed)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    info!(
        "📥 Loaded {} rows with columns [{}] from {}",
        table.len(),
        table.columns.join(", "),
        path.display()
    );
    Ok(table)
}

/// Serialize the result table as comma-separated text
pub fn to_csv_string(table: &ResultTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

pub async fn write_results(path: impl AsRef<Path>, table: &ResultTable) -> Result<()> {
    let path = path.as_ref();
    let csv = to_csv_string(table)?;
    tokio::fs::write(path, csv)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("💾 Saved {} result rows to {}", table.rows.len(), path.display());
    Ok(())
}

pub async fn write_report_json(path: impl AsRef<Path>, report: &ComparisonReport) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("💾 Saved run report to {}", path.display());
    Ok(())
}
