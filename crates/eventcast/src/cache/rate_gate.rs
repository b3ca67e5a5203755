//! Shared pacing flag for outbound upstream calls.
//!
//! A single well-known key is set with a short TTL before and after every
//! upstream call. While it exists, callers wait for it to expire. The gate is
//! best effort: waiters that observe it open at the same moment may both
//! proceed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use eventcast_core::cache::{Cache, KeyTtl, RATE_GATE_KEY};

/// Upper bound on sleep rounds in [`RateGate::wait_until_open`].
const MAX_WAIT_ROUNDS: u32 = 10;

#[derive(Clone)]
pub struct RateGate {
    store: Arc<dyn Cache>,
}

impl RateGate {
    pub fn new(store: Arc<dyn Cache>) -> Self {
        Self { store }
    }

    /// Whole seconds until the gate opens, rounded up. 0 means open.
    ///
    /// Store failures and flags without expiry read as open.
    pub async fn seconds_until_open(&self) -> u64 {
        match self.store.ttl(RATE_GATE_KEY).await {
            Ok(KeyTtl::Missing) => 0,
            Ok(KeyTtl::Expires(remaining)) => ceil_secs(remaining),
            Ok(KeyTtl::Persistent) => {
                tracing::warn!(key = RATE_GATE_KEY, "Rate gate flag has no expiry");
                0
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read rate gate");
                0
            }
        }
    }

    /// Closes the gate for `seconds`, overwriting any existing flag.
    pub async fn mark_busy(&self, seconds: u64) {
        if seconds == 0 {
            return;
        }
        let stamp = Utc::now().to_rfc3339();
        if let Err(err) = self
            .store
            .set(
                RATE_GATE_KEY,
                stamp.as_bytes(),
                Some(Duration::from_secs(seconds)),
            )
            .await
        {
            tracing::warn!(error = %err, "Failed to set rate gate");
        }
    }

    /// Sleeps until the gate reads open, for at most a bounded number of
    /// rounds.
    pub async fn wait_until_open(&self) {
        for _ in 0..MAX_WAIT_ROUNDS {
            let seconds = self.seconds_until_open().await;
            if seconds == 0 {
                return;
            }
            tracing::debug!(seconds, "Waiting for rate gate");
            tokio::time::sleep(Duration::from_secs(seconds)).await;
        }
        tracing::warn!(rounds = MAX_WAIT_ROUNDS, "Rate gate still closed, proceeding");
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
