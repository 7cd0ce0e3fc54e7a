//! CSV corpus loader
//!
//! Reads the two tracker exports: one row per ticket, one row per epic.
//! Column names are configurable; defaults match a Jira CSV export.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use super::{Initiative, WorkItem};
use crate::error::CorpusError;

/// Column mapping for the ticket table
#[derive(Debug, Clone)]
pub struct TicketColumns {
    pub key: String,
    pub parent_key: String,
    pub parent_summary: String,
    pub title: String,
}

impl Default for TicketColumns {
    fn default() -> Self {
        Self {
            key: "Issue key".to_string(),
            parent_key: "Parent key".to_string(),
            parent_summary: "Parent summary".to_string(),
            title: "Summary".to_string(),
        }
    }
}

/// Column mapping for the epic table
#[derive(Debug, Clone)]
pub struct EpicColumns {
    pub key: String,
    pub summary: String,
}

impl Default for EpicColumns {
    fn default() -> Self {
        Self {
            key: "Issue key".to_string(),
            summary: "Summary".to_string(),
        }
    }
}

/// Load tickets from a CSV file
pub fn load_work_items(path: &Path, columns: &TicketColumns) -> Result<Vec<WorkItem>, CorpusError> {
    let file = open(path)?;
    let items = read_work_items(file, &path.display().to_string(), columns)?;
    info!(path = %path.display(), count = items.len(), "Loaded tickets");
    Ok(items)
}

/// Load epics from a CSV file
pub fn load_initiatives(
    path: &Path,
    columns: &EpicColumns,
) -> Result<Vec<Initiative>, CorpusError> {
    let file = open(path)?;
    let initiatives = read_initiatives(file, &path.display().to_string(), columns)?;
    info!(path = %path.display(), count = initiatives.len(), "Loaded epics");
    Ok(initiatives)
}

/// Parse tickets from any reader; `source_name` only labels errors
pub fn read_work_items<R: Read>(
    reader: R,
    source_name: &str,
    columns: &TicketColumns,
) -> Result<Vec<WorkItem>, CorpusError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = headers(&mut reader, source_name)?;

    let key_idx = column_index(&headers, &columns.key, source_name)?;
    let parent_key_idx = column_index(&headers, &columns.parent_key, source_name)?;
    let parent_summary_idx = column_index(&headers, &columns.parent_summary, source_name)?;
    let title_idx = column_index(&headers, &columns.title, source_name)?;

    let mut items = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let row = record.map_err(|source| csv_error(source_name, source))?;
        let key = field(&row, key_idx);
        if key.is_empty() {
            warn!(source = source_name, row = row_no + 1, "Ticket row without key skipped");
            continue;
        }
        items.push(WorkItem {
            key,
            parent_key: field(&row, parent_key_idx),
            parent_summary: field(&row, parent_summary_idx),
            title: field(&row, title_idx),
            body: render_row(&headers, &row),
        });
    }
    Ok(items)
}

/// Parse epics from any reader; `source_name` only labels errors
pub fn read_initiatives<R: Read>(
    reader: R,
    source_name: &str,
    columns: &EpicColumns,
) -> Result<Vec<Initiative>, CorpusError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = headers(&mut reader, source_name)?;

    let key_idx = column_index(&headers, &columns.key, source_name)?;
    let summary_idx = column_index(&headers, &columns.summary, source_name)?;

    let mut initiatives = Vec::new();
    for record in reader.records() {
        let row = record.map_err(|source| csv_error(source_name, source))?;
        let key = field(&row, key_idx);
        if key.is_empty() {
            continue;
        }
        initiatives.push(Initiative {
            key,
            summary: field(&row, summary_idx),
        });
    }
    Ok(initiatives)
}

/// Whole row as `header: value` lines
fn render_row(headers: &StringRecord, row: &StringRecord) -> String {
    headers
        .iter()
        .zip(row.iter())
        .map(|(h, v)| format!("{}: {}", h.trim(), v.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn open(path: &Path) -> Result<File, CorpusError> {
    File::open(path).map_err(|source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn headers<R: Read>(
    reader: &mut csv::Reader<R>,
    source_name: &str,
) -> Result<StringRecord, CorpusError> {
    reader
        .headers()
        .cloned()
        .map_err(|source| csv_error(source_name, source))
}

// First match wins; tracker exports repeat some headers (Sprint, Labels)
fn column_index(
    headers: &StringRecord,
    column: &str,
    source_name: &str,
) -> Result<usize, CorpusError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| CorpusError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        })
}

fn field(row: &StringRecord, idx: usize) -> String {
    row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn csv_error(source_name: &str, source: csv::Error) -> CorpusError {
    CorpusError::Csv {
        source_name: source_name.to_string(),
        source,
    }
}
