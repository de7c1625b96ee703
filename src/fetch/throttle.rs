//! Per-source request spacing.
//!
//! Each source gets its own slot holding the time of its last request. A
//! caller waits on that slot only, so a slow or tightly limited source never
//! holds up requests to another one.

use crate::sources::{SourceConfig, SourceId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

type Slot = Arc<AsyncMutex<Option<Instant>>>;

/// Delay scheduler keyed by [`SourceId`].
#[derive(Debug, Default)]
pub struct Throttle {
    min_delay: Duration,
    slots: Mutex<HashMap<SourceId, Slot>>,
}

impl Throttle {
    /// `min_delay` is the smallest gap between two requests to the same
    /// source, whatever its rate limit.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Gap enforced between requests to `source`: the larger of its
    /// requests-per-minute budget and the global minimum delay.
    pub fn interval_for(&self, source: &SourceConfig) -> Duration {
        let by_rate = match source.rate_limit {
            0 => Duration::ZERO,
            per_minute => Duration::from_secs(60) / per_minute,
        };
        by_rate.max(self.min_delay)
    }

    fn slot(&self, id: SourceId) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(id).or_default().clone()
    }

    /// Wait until a request to `source` is allowed, then claim the slot.
    pub async fn acquire(&self, source: &SourceConfig) {
        let interval = self.interval_for(source);
        let slot = self.slot(source.id);
        let mut last = slot.lock().await;
        if let Some(previous) = *last {
            let ready = previous + interval;
            if ready > Instant::now() {
                debug!(source = %source.id, wait_ms = (ready - Instant::now()).as_millis() as u64, "Throttling");
                sleep_until(ready).await;
            }
        }
        *last = Some(Instant::now());
    }
}
