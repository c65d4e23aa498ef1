//! Synthesis worker: one task per input record.
//!
//! A worker either reuses a cached artifact or performs a rate-limited
//! synthesis call, writes the artifact, and emits the output row. Workers
//! for the same content address serialize on a per-address guard, so a key
//! appearing twice in one run costs at most one external call no matter
//! how the tasks interleave.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::cache::{BlobStore, CacheError};
use crate::domain::{ContentAddress, OutputRecord, Record, VoiceProfile};
use crate::synth::{RateLimiter, SynthesisError, SynthesisRequest, Synthesizer};

/// Errors raised by a worker; all of them abort the run
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("output sink closed before the record on line {line} could be written")]
    SinkClosed { line: u64 },
}

/// Per-run worker counters
#[derive(Debug, Default)]
pub(crate) struct WorkerStats {
    pub cache_hits: AtomicU64,
    pub synthesized: AtomicU64,
}

/// Shared state handed to every worker task
pub(crate) struct WorkerContext {
    pub store: Arc<dyn BlobStore>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub limiter: Arc<RateLimiter>,
    pub voice: VoiceProfile,
    pub locks: AddressLocks,
    pub stats: Arc<WorkerStats>,
    pub out: mpsc::Sender<OutputRecord>,
}

/// Process one record to completion.
///
/// Holds the address guard across the probe-synthesize-write window so a
/// second worker for the same address waits, then sees the cache hit.
pub(crate) async fn process_record(
    ctx: Arc<WorkerContext>,
    record: Record,
) -> Result<(), WorkerError> {
    let address = ContentAddress::for_key(record.key());
    let guard = ctx.locks.acquire(&address).await;

    if ctx.store.exists(&address).await? {
        debug!(line = record.line, address = %address, "cache hit");
        ctx.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
    } else {
        ctx.limiter.take().await;

        let request = SynthesisRequest {
            text: record.key().to_string(),
            language_code: ctx.voice.language.clone(),
            voice_id: ctx.voice.voice.clone(),
            engine: ctx.voice.tier,
        };
        debug!(line = record.line, address = %address, "synthesizing");
        let audio = ctx.synthesizer.synthesize(&request).await?;

        ctx.store.write(&address, &audio).await?;
        ctx.stats.synthesized.fetch_add(1, Ordering::Relaxed);
    }
    drop(guard);

    let line = record.line;
    let output = record.into_output(address.filename());
    ctx.out
        .send(output)
        .await
        .map_err(|_| WorkerError::SinkClosed { line })
}

/// Lazily-built per-address mutexes.
///
/// The map grows by one entry per distinct address per run, mirroring the
/// seen-key mapping's lifetime.
#[derive(Clone, Default)]
pub(crate) struct AddressLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl AddressLocks {
    async fn acquire(&self, address: &ContentAddress) -> OwnedMutexGuard<()> {
        let cell = {
            let mut map = self.inner.lock().await;
            Arc::clone(map.entry(address.hex().to_string()).or_default())
        };
        cell.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn address_lock_serializes_same_address() {
        let locks = AddressLocks::default();
        let address = ContentAddress::for_key("same");

        let guard = locks.acquire(&address).await;

        let contender = {
            let locks = locks.clone();
            let address = address.clone();
            tokio::spawn(async move {
                locks.acquire(&address).await;
            })
        };

        sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn address_lock_allows_distinct_addresses() {
        let locks = AddressLocks::default();
        let _a = locks.acquire(&ContentAddress::for_key("a")).await;
        // Must not block on a different address.
        let _b = locks.acquire(&ContentAddress::for_key("b")).await;
    }
}
