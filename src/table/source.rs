//! Record source: streams validated rows from the input table.
//!
//! Rows are read lazily on a blocking task and handed to the pipeline
//! through a bounded channel. Validation enforces the input contract:
//! no empty rows, and every row carries the same column count as the
//! first. A violation terminates the stream with the offending line.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::Record;

/// Depth of the source → orchestrator channel
const SOURCE_QUEUE_DEPTH: usize = 256;

/// Errors raised while reading the input table
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("empty record found on line {line}")]
    MalformedInput { line: u64 },

    #[error("expected {expected} columns but found {found} columns on line {line}")]
    SchemaMismatch {
        expected: usize,
        found: usize,
        line: u64,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse input: {0}")]
    Csv(#[from] csv::Error),
}

/// Spawn the reader task for the input table.
///
/// Returns the record stream and the reader's join handle; the handle
/// resolves to the structural validation result once the input is
/// exhausted or invalid. The stream is finite and non-restartable.
pub fn spawn_source(path: PathBuf) -> (mpsc::Receiver<Record>, JoinHandle<Result<(), SourceError>>) {
    let (tx, rx) = mpsc::channel(SOURCE_QUEUE_DEPTH);
    let handle = tokio::task::spawn_blocking(move || read_records(&path, tx));
    (rx, handle)
}

fn read_records(path: &Path, tx: mpsc::Sender<Record>) -> Result<(), SourceError> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut expected_columns: Option<usize> = None;
    let mut record_count: u64 = 0;

    for row in reader.records() {
        record_count += 1;
        let row = row?;
        let line = row.position().map_or(record_count, |p| p.line());

        // A row with no fields, or a lone empty field, is an empty row.
        if row.is_empty() || (row.len() == 1 && row[0].is_empty()) {
            return Err(SourceError::MalformedInput { line });
        }

        match expected_columns {
            None => expected_columns = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(SourceError::SchemaMismatch {
                    expected,
                    found: row.len(),
                    line,
                });
            }
            Some(_) => {}
        }

        let record = Record::new(line, row.iter().map(str::to_string).collect());
        if tx.blocking_send(record).is_err() {
            // Pipeline shut down; stop reading.
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_input(temp: &TempDir, contents: &str) -> PathBuf {
        let path = temp.path().join("input.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    async fn collect(path: PathBuf) -> (Vec<Record>, Result<(), SourceError>) {
        let (mut rx, handle) = spawn_source(path);
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        (records, handle.await.unwrap())
    }

    #[tokio::test]
    async fn yields_numbered_records() {
        let temp = TempDir::new().unwrap();
        let path = write_input(&temp, "hello,greeting\nworld,noun\n");

        let (records, result) = collect(path).await;
        result.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[0].key(), "hello");
        assert_eq!(records[1].line, 2);
        assert_eq!(
            records[1].columns,
            vec!["world".to_string(), "noun".to_string()]
        );
    }

    #[tokio::test]
    async fn schema_mismatch_names_line_and_counts() {
        let temp = TempDir::new().unwrap();
        let path = write_input(&temp, "a,b\nc,d,e\n");

        let (records, result) = collect(path).await;
        assert_eq!(records.len(), 1);
        match result.unwrap_err() {
            SourceError::SchemaMismatch {
                expected,
                found,
                line,
            } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_row_is_malformed() {
        let temp = TempDir::new().unwrap();
        let path = write_input(&temp, "a\n\"\"\nb\n");

        let (_, result) = collect(path).await;
        match result.unwrap_err() {
            SourceError::MalformedInput { line } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn end_of_stream_terminates_normally() {
        let temp = TempDir::new().unwrap();
        let path = write_input(&temp, "");

        let (records, result) = collect(path).await;
        result.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let (_, result) = collect(temp.path().join("missing.csv")).await;
        assert!(matches!(result.unwrap_err(), SourceError::Io(_)));
    }
}
