use super::types::{FeedbackDataset, FeedbackRecord};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads the whole delimited file into memory.
pub fn load_dataset(path: &Path, delimiter: u8) -> Result<FeedbackDataset> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    parse_dataset(file, delimiter).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Runs [`load_dataset`] on the blocking pool.
pub async fn load_dataset_async(path: PathBuf, delimiter: u8) -> Result<FeedbackDataset> {
    tokio::task::spawn_blocking(move || load_dataset(&path, delimiter))
        .await
        .context("Dataset loader task panicked")?
}

/// Parses CSV text with a header row.
///
/// Rows with fewer cells than the header simply lack the trailing fields;
/// extra cells are named `_<column index>`. Blank lines are skipped.
pub fn parse_dataset<R: Read>(reader: R, delimiter: u8) -> Result<FeedbackDataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = header_names(reader.headers().context("Failed to read header row")?);

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let row_record = result.with_context(|| format!("Malformed row {}", row + 1))?;
        records.push(to_feedback_record(&headers, &row_record));
    }

    tracing::debug!("Parsed {} rows with {} columns", records.len(), headers.len());
    Ok(FeedbackDataset::new(records))
}

fn header_names(headers: &StringRecord) -> Vec<Arc<str>> {
    headers
        .iter()
        .enumerate()
        .map(|(column, name)| {
            if column == 0 {
                Arc::from(name.trim_start_matches(BYTE_ORDER_MARK))
            } else {
                Arc::from(name)
            }
        })
        .collect()
}

fn to_feedback_record(headers: &[Arc<str>], row: &StringRecord) -> FeedbackRecord {
    let fields = row
        .iter()
        .enumerate()
        .map(|(column, value)| {
            let name = headers
                .get(column)
                .cloned()
                .unwrap_or_else(|| Arc::from(format!("_{column}")));
            (name, value.to_string())
        })
        .collect();

    FeedbackRecord::new(fields)
}
