//! Pipeline orchestration.
//!
//! Wires the stages together and owns the shutdown protocol: stream
//! records from the source, check each against the duplicate tracker,
//! dispatch a worker per record, and once the source is exhausted join
//! every worker before closing the sink channel — join, then signal, then
//! drain. The output table is persisted only after the sink has flushed,
//! so a fatal error anywhere leaves no output file behind.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::BlobStore;
use crate::domain::{Record, VoiceProfile};
use crate::synth::{RateLimiter, Synthesizer};
use crate::table::{spawn_sink, spawn_source, SinkError, SourceError};

use super::seen::{SeenOutcome, SeenTracker, SeenTrackerError};
use super::worker::{process_record, AddressLocks, WorkerContext, WorkerError, WorkerStats};

/// Depth of the workers → sink channel
const SINK_QUEUE_DEPTH: usize = 256;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("duplicate \"{key}\" found on line {line}, previously on line {original_line}")]
    DuplicateKey {
        key: String,
        line: u64,
        original_line: u64,
    },

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Tracker(#[from] SeenTrackerError),

    #[error("pipeline task failed: {0}")]
    Join(#[from] JoinError),
}

/// Accounting for one completed run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Records accepted from the source
    pub rows: u64,

    /// Duplicate keys reported (non-fatal unless strict mode)
    pub duplicates: u64,

    /// Records served from the artifact cache
    pub cache_hits: u64,

    /// External synthesis calls performed
    pub synthesized: u64,
}

/// The synthesis pipeline
pub struct Pipeline {
    store: Arc<dyn BlobStore>,
    synthesizer: Arc<dyn Synthesizer>,
    limiter: Arc<RateLimiter>,
    voice: VoiceProfile,
    fail_on_duplicate: bool,
}

impl Pipeline {
    /// Create a pipeline over the given collaborators
    pub fn new(
        store: Arc<dyn BlobStore>,
        synthesizer: Arc<dyn Synthesizer>,
        limiter: Arc<RateLimiter>,
        voice: VoiceProfile,
    ) -> Self {
        Self {
            store,
            synthesizer,
            limiter,
            voice,
            fail_on_duplicate: false,
        }
    }

    /// Treat duplicate keys as fatal instead of merely reporting them
    pub fn fail_on_duplicate(mut self, fail: bool) -> Self {
        self.fail_on_duplicate = fail;
        self
    }

    /// Run the pipeline from `input` to `output`.
    ///
    /// On success the output table is persisted atomically; on any error
    /// it is discarded, though artifacts already written to the store
    /// remain valid for future runs.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            input = %input.display(),
            output = %output.display(),
            engine = %self.voice.tier,
            "starting synthesis run"
        );

        let (records, source_handle) = spawn_source(input.to_path_buf());
        let (out_tx, out_rx) = mpsc::channel(SINK_QUEUE_DEPTH);
        let sink_handle = spawn_sink(output.to_path_buf(), out_rx);
        let tracker = SeenTracker::spawn();

        let stats = Arc::new(WorkerStats::default());
        let ctx = Arc::new(WorkerContext {
            store: Arc::clone(&self.store),
            synthesizer: Arc::clone(&self.synthesizer),
            limiter: Arc::clone(&self.limiter),
            voice: self.voice.clone(),
            locks: AddressLocks::default(),
            stats: Arc::clone(&stats),
            out: out_tx,
        });

        let mut rows = 0u64;
        let mut duplicates = 0u64;
        let outcome = self
            .drive(records, source_handle, tracker, ctx, &mut rows, &mut duplicates)
            .await;

        if let Err(err) = outcome {
            // Workers fail with SinkClosed when the sink dies under them;
            // the sink's own error is the root cause, so surface that.
            if sink_handle.is_finished() {
                if let Ok(Err(sink_err)) = sink_handle.await {
                    return Err(sink_err.into());
                }
            }
            return Err(err);
        }

        let flushed = sink_handle.await??;
        flushed.persist(output).map_err(SinkError::from)?;

        let report = PipelineReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            rows,
            duplicates,
            cache_hits: stats.cache_hits.load(Ordering::Relaxed),
            synthesized: stats.synthesized.load(Ordering::Relaxed),
        };
        info!(
            %run_id,
            rows = report.rows,
            duplicates = report.duplicates,
            cache_hits = report.cache_hits,
            synthesized = report.synthesized,
            "synthesis run complete"
        );
        Ok(report)
    }

    /// Streaming and draining phases.
    ///
    /// Consumes the worker context so the sink channel closes exactly when
    /// the last worker has finished and this function returns.
    async fn drive(
        &self,
        mut records: mpsc::Receiver<Record>,
        source_handle: JoinHandle<Result<(), SourceError>>,
        tracker: SeenTracker,
        ctx: Arc<WorkerContext>,
        rows: &mut u64,
        duplicates: &mut u64,
    ) -> Result<(), PipelineError> {
        let mut workers = JoinSet::new();

        while let Some(record) = records.recv().await {
            *rows += 1;

            match tracker.check(record.key(), record.line).await? {
                SeenOutcome::FirstSeen => {}
                SeenOutcome::Duplicate { original_line } => {
                    *duplicates += 1;
                    warn!(
                        key = %record.key(),
                        line = record.line,
                        original_line,
                        "duplicate key"
                    );
                    if self.fail_on_duplicate {
                        return Err(PipelineError::DuplicateKey {
                            key: record.key().to_string(),
                            line: record.line,
                            original_line,
                        });
                    }
                }
            }

            workers.spawn(process_record(Arc::clone(&ctx), record));

            // Harvest finished workers as we go so a fatal worker error
            // stops the run without waiting for the source to drain.
            while let Some(finished) = workers.try_join_next() {
                finished??;
            }
        }

        // Source exhausted or failed; a structural error aborts here,
        // before the drain.
        source_handle.await??;

        // Join every dispatched worker, then let the sink channel close.
        while let Some(finished) = workers.join_next().await {
            finished??;
        }

        Ok(())
    }
}
