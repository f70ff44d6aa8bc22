//! Expiry sweeper
//!
//! A background task that periodically removes records whose time-to-live
//! has passed. Each removal is announced by the broker as a `delete` event
//! with reason `expired`. A sweep is idempotent, so a missed tick is simply
//! caught up by the next one.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::broker::engine::{SharedBroker, lock_broker};
use crate::store::RecordId;

/// Runs one sweep at `now`.
pub fn sweep_once(broker: &SharedBroker, now: DateTime<Utc>) -> Vec<RecordId> {
    lock_broker(broker).sweep(now)
}

/// Sweeps every `every` for the lifetime of the process.
pub async fn start_sweep_loop(broker: SharedBroker, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let removed = sweep_once(&broker, Utc::now());
        debug!(removed = removed.len(), "sweep tick");
    }
}
