//! Duplicate key tracking.
//!
//! A single actor task owns the key → first-seen-line mapping; callers
//! reach it through a request channel and get their verdict back on a
//! per-request oneshot. Serializing every check through one task is what
//! makes the check-and-record atomic: of any number of racing checks for
//! the same key, the first to arrive at the actor records it and everyone
//! after sees a duplicate. The mapping lives for one run only.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Depth of the tracker request channel
const TRACKER_QUEUE_DEPTH: usize = 64;

/// Errors from the tracker handle
#[derive(Debug, Error)]
pub enum SeenTrackerError {
    #[error("seen tracker task terminated unexpectedly")]
    Terminated,
}

/// Verdict for one check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenOutcome {
    /// Key was not in the mapping; it is now recorded under this line
    FirstSeen,

    /// Key was already recorded; the mapping is unchanged
    Duplicate {
        /// Line on which the key was first seen
        original_line: u64,
    },
}

struct SeenRequest {
    key: String,
    line: u64,
    reply: oneshot::Sender<SeenOutcome>,
}

/// Handle to the tracker actor; clone freely across tasks
#[derive(Clone)]
pub struct SeenTracker {
    tx: mpsc::Sender<SeenRequest>,
}

impl SeenTracker {
    /// Spawn the actor task and return a handle to it.
    ///
    /// The actor exits once every handle has been dropped.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel::<SeenRequest>(TRACKER_QUEUE_DEPTH);

        tokio::spawn(async move {
            let mut seen: HashMap<String, u64> = HashMap::new();
            while let Some(request) = rx.recv().await {
                let outcome = match seen.get(&request.key) {
                    Some(&original_line) => SeenOutcome::Duplicate { original_line },
                    None => {
                        seen.insert(request.key, request.line);
                        SeenOutcome::FirstSeen
                    }
                };
                // Caller may have gone away; that's its problem, not ours.
                let _ = request.reply.send(outcome);
            }
        });

        Self { tx }
    }

    /// Check a key, recording it if unseen
    pub async fn check(&self, key: &str, line: u64) -> Result<SeenOutcome, SeenTrackerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(SeenRequest {
                key: key.to_string(),
                line,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SeenTrackerError::Terminated)?;
        reply_rx.await.map_err(|_| SeenTrackerError::Terminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_check_records_the_key() {
        let tracker = SeenTracker::spawn();
        assert_eq!(
            tracker.check("hello", 1).await.unwrap(),
            SeenOutcome::FirstSeen
        );
    }

    #[tokio::test]
    async fn duplicate_reports_original_line() {
        let tracker = SeenTracker::spawn();
        tracker.check("hello", 1).await.unwrap();
        tracker.check("world", 2).await.unwrap();

        assert_eq!(
            tracker.check("hello", 3).await.unwrap(),
            SeenOutcome::Duplicate { original_line: 1 }
        );
        // The recorded line never changes, no matter how often it recurs.
        assert_eq!(
            tracker.check("hello", 9).await.unwrap(),
            SeenOutcome::Duplicate { original_line: 1 }
        );
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let tracker = SeenTracker::spawn();
        assert_eq!(tracker.check("a", 1).await.unwrap(), SeenOutcome::FirstSeen);
        assert_eq!(tracker.check("b", 2).await.unwrap(), SeenOutcome::FirstSeen);
    }

    #[tokio::test]
    async fn exactly_one_first_seen_under_contention() {
        let tracker = SeenTracker::spawn();

        let mut tasks = Vec::new();
        for line in 1..=32u64 {
            let tracker = tracker.clone();
            tasks.push(tokio::spawn(
                async move { tracker.check("same", line).await },
            ));
        }

        let mut first_seen = 0;
        let mut duplicates = 0;
        for task in tasks {
            match task.await.unwrap().unwrap() {
                SeenOutcome::FirstSeen => first_seen += 1,
                SeenOutcome::Duplicate { .. } => duplicates += 1,
            }
        }

        assert_eq!(first_seen, 1);
        assert_eq!(duplicates, 31);
    }
}
