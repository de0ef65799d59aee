//! Entropy reservoir count.
//!
//! The reservoir contract exposes `get_count() -> u64`. The call result is a
//! list of felts; the count is the first one and nothing else is accepted.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::RpcError;
use crate::provider::StarknetProvider;
use crate::receipt::parse_felt;

const GET_COUNT: &str = "get_count";

#[derive(Debug, thiserror::Error)]
pub enum ReservoirError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("malformed get_count result: {0}")]
    Malformed(String),
}

/// Decode a `get_count` call result.
pub fn decode_count(result: &[String]) -> Result<u64, ReservoirError> {
    let first = result
        .first()
        .ok_or_else(|| ReservoirError::Malformed("empty result".into()))?;

    let value = parse_felt(first)
        .ok_or_else(|| ReservoirError::Malformed(format!("{first} is not a felt")))?;

    u64::try_from(&value)
        .map_err(|_| ReservoirError::Malformed(format!("{first} does not fit in u64")))
}

pub async fn read_count(
    provider: &dyn StarknetProvider,
    reservoir_address: &str,
) -> Result<u64, ReservoirError> {
    let result = provider.call(reservoir_address, GET_COUNT, &[]).await?;
    decode_count(&result)
}

/// Periodically refreshes the reservoir count.
///
/// The published value is `None` until the first successful read; a failed
/// refresh keeps the last good value.
pub struct ReservoirMonitor {
    count_rx: watch::Receiver<Option<u64>>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReservoirMonitor {
    /// Spawn the refresh loop. The first read runs immediately.
    pub fn start(
        provider: Arc<dyn StarknetProvider>,
        reservoir_address: String,
        interval: Duration,
    ) -> Self {
        let (count_tx, count_rx) = watch::channel(None);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let result = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    result = read_count(provider.as_ref(), &reservoir_address) => result,
                };

                match result {
                    Ok(count) => {
                        debug!(count, "Reservoir count refreshed");
                        count_tx.send_replace(Some(count));
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read reservoir count");
                    }
                }
            }

            info!("Reservoir monitor stopped");
        });

        Self {
            count_rx,
            shutdown_tx,
            handle,
        }
    }

    /// Last successfully read count.
    pub fn count(&self) -> Option<u64> {
        *self.count_rx.borrow()
    }

    /// Receiver that observes every refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.count_rx.clone()
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Reservoir monitor task failed");
        }
    }
}
