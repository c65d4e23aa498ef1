//! Result sink: serializes output records to the output table.
//!
//! Records arrive from any worker in any order and are written in arrival
//! order to a temp file beside the output path. The sink flushes only once
//! the channel reports that no more records will arrive; the orchestrator
//! persists the temp file to its final name on overall success, so a fatal
//! error never leaves a half-written output table behind.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::OutputRecord;

/// Errors raised while writing the output table
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to persist output: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Spawn the writer task for the output table.
///
/// The handle resolves to the flushed temp file once every queued record
/// has been drained; callers persist it to `output_path` on success and
/// simply drop it on failure.
pub fn spawn_sink(
    output_path: PathBuf,
    rx: mpsc::Receiver<OutputRecord>,
) -> JoinHandle<Result<NamedTempFile, SinkError>> {
    tokio::task::spawn_blocking(move || write_records(&output_path, rx))
}

fn write_records(
    output_path: &Path,
    mut rx: mpsc::Receiver<OutputRecord>,
) -> Result<NamedTempFile, SinkError> {
    let dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = tempfile::Builder::new()
        .prefix(".mynah-out-")
        .tempfile_in(dir)?;

    let mut writer = csv::Writer::from_writer(BufWriter::new(temp.reopen()?));
    while let Some(record) = rx.blocking_recv() {
        writer.write_record(record.columns())?;
    }
    writer.flush()?;

    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use tempfile::TempDir;

    fn output(line: u64, columns: &[&str], filename: &str) -> OutputRecord {
        Record::new(line, columns.iter().map(|c| c.to_string()).collect())
            .into_output(filename.to_string())
    }

    #[tokio::test]
    async fn writes_records_in_arrival_order() {
        let temp = TempDir::new().unwrap();
        let output_path = temp.path().join("out.csv");

        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_sink(output_path.clone(), rx);

        tx.send(output(2, &["b"], "bbb.mp3")).await.unwrap();
        tx.send(output(1, &["a"], "aaa.mp3")).await.unwrap();
        drop(tx);

        let flushed = handle.await.unwrap().unwrap();
        flushed.persist(&output_path).unwrap();

        let contents = tokio::fs::read_to_string(&output_path).await.unwrap();
        assert_eq!(contents, "b,bbb.mp3\na,aaa.mp3\n");
    }

    #[tokio::test]
    async fn nothing_visible_until_persisted() {
        let temp = TempDir::new().unwrap();
        let output_path = temp.path().join("out.csv");

        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_sink(output_path.clone(), rx);

        tx.send(output(1, &["a"], "aaa.mp3")).await.unwrap();
        drop(tx);

        let flushed = handle.await.unwrap().unwrap();
        assert!(!output_path.exists());
        drop(flushed);
        assert!(!output_path.exists());
    }

    #[tokio::test]
    async fn empty_input_persists_an_empty_table() {
        let temp = TempDir::new().unwrap();
        let output_path = temp.path().join("out.csv");

        let (tx, rx) = mpsc::channel::<OutputRecord>(8);
        let handle = spawn_sink(output_path.clone(), rx);
        drop(tx);

        let flushed = handle.await.unwrap().unwrap();
        flushed.persist(&output_path).unwrap();
        let contents = tokio::fs::read_to_string(&output_path).await.unwrap();
        assert!(contents.is_empty());
    }
}
