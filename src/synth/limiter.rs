//! Admission control for external synthesis calls.
//!
//! A pacing limiter shared by every worker: each admission is assigned the
//! next free time slot, spaced so the long-run call rate never exceeds the
//! configured ceiling. Callers queue FIFO-ish on the internal mutex. The
//! limiter never fails; it only delays.

use std::num::NonZeroU32;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Paces admissions to at most a fixed number per second
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// Create a limiter admitting at most `ceiling` calls per second
    pub fn per_second(ceiling: NonZeroU32) -> Self {
        Self {
            interval: Duration::from_secs(1) / ceiling.get(),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Block until admission is granted
    pub async fn take(&self) {
        let slot = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.interval;
            slot
        };
        sleep_until(slot).await;
    }
}
