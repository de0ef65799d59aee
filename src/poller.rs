//! Receipt polling for a submitted randomness request.
//!
//! [`TransactionWatcher`] re-fetches the receipt on a fixed cadence until the
//! node reports one, then decodes the random value out of it. Node failures
//! are reported through the published status and polling carries on; there
//! is no backoff beyond the fixed interval. Dropping the future returned by
//! [`TransactionWatcher::run`] stops polling.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::{ErrorKind, RpcError};
use crate::metrics::Metrics;
use crate::provider::StarknetProvider;
use crate::receipt::decode_random_value;

/// Progress markers, in the order they are reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TxSteps {
    pub submitted: bool,
    pub processing: bool,
    pub confirmed: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxPhase {
    Pending,
    Confirmed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&RpcError> for UpstreamFailure {
    fn from(e: &RpcError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxStatus {
    pub tx_hash: String,
    pub steps: TxSteps,
    pub random_value: Option<String>,
    pub revert_reason: Option<String>,
    pub last_error: Option<UpstreamFailure>,
}

impl TxStatus {
    pub fn new(tx_hash: &str) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            steps: TxSteps {
                submitted: true,
                ..TxSteps::default()
            },
            random_value: None,
            revert_reason: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> TxPhase {
        if self.steps.completed {
            TxPhase::Completed
        } else if self.steps.confirmed {
            TxPhase::Confirmed
        } else {
            TxPhase::Pending
        }
    }

    /// Fold a receipt into the status. Returns whether a value was decoded.
    fn apply_receipt(&mut self, receipt: &Value, event_key: &str) -> bool {
        self.steps.processing = true;
        self.steps.confirmed = true;
        self.last_error = None;

        if receipt.get("execution_status").and_then(Value::as_str) == Some("REVERTED") {
            self.revert_reason = Some(
                receipt
                    .get("revert_reason")
                    .and_then(Value::as_str)
                    .unwrap_or("reverted")
                    .to_string(),
            );
        }

        self.random_value = decode_random_value(Some(receipt), event_key);
        self.steps.completed = self.random_value.is_some();
        self.steps.completed
    }
}

/// Polls one transaction's receipt and publishes its [`TxStatus`].
pub struct TransactionWatcher {
    provider: Arc<dyn StarknetProvider>,
    tx_hash: String,
    event_key: String,
    interval: Duration,
    metrics: Arc<Metrics>,
    status_tx: watch::Sender<TxStatus>,
}

impl TransactionWatcher {
    /// Build a watcher; nothing is fetched until [`run`](Self::run).
    pub fn new(
        provider: Arc<dyn StarknetProvider>,
        tx_hash: &str,
        event_key: &str,
        interval: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        let (status_tx, _) = watch::channel(TxStatus::new(tx_hash));
        Self {
            provider,
            tx_hash: tx_hash.to_string(),
            event_key: event_key.to_string(),
            interval,
            metrics,
            status_tx,
        }
    }

    /// Follow progress while [`run`](Self::run) is polling.
    pub fn subscribe(&self) -> watch::Receiver<TxStatus> {
        self.status_tx.subscribe()
    }

    /// Poll until the node returns a receipt, then return the final status.
    pub async fn run(self) -> TxStatus {
        let started = Instant::now();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(tx_hash = %self.tx_hash, interval = ?self.interval, "Watching transaction");

        loop {
            ticker.tick().await;
            self.metrics.record_poll();
            self.status_tx.send_modify(|s| s.steps.processing = true);

            match self.provider.transaction_receipt(&self.tx_hash).await {
                Ok(Some(receipt)) => {
                    self.metrics.record_receipt();

                    let mut status = self.status_tx.borrow().clone();
                    if status.apply_receipt(&receipt, &self.event_key) {
                        let latency_ms = started.elapsed().as_millis() as u64;
                        self.metrics.record_value(latency_ms);
                        info!(
                            tx_hash = %self.tx_hash,
                            value = status.random_value.as_deref().unwrap_or_default(),
                            latency_ms,
                            "Random value decoded"
                        );
                    } else {
                        self.metrics.record_miss();
                        warn!(
                            tx_hash = %self.tx_hash,
                            revert_reason = status.revert_reason.as_deref(),
                            "Receipt carries no random value"
                        );
                    }

                    self.status_tx.send_replace(status.clone());
                    return status;
                }
                Ok(None) => {
                    debug!(tx_hash = %self.tx_hash, "Receipt not available yet");
                }
                Err(e) => {
                    self.metrics.record_failure();
                    warn!(tx_hash = %self.tx_hash, kind = ?e.kind(), error = %e, "Receipt fetch failed");
                    let failure = UpstreamFailure::from(&e);
                    self.status_tx.send_modify(|s| s.last_error = Some(failure));
                }
            }
        }
    }
}

/// Fetch the receipt once and report where the transaction stands.
pub async fn check_once(
    provider: &dyn StarknetProvider,
    tx_hash: &str,
    event_key: &str,
) -> Result<TxStatus, RpcError> {
    let mut status = TxStatus::new(tx_hash);
    status.steps.processing = true;

    if let Some(receipt) = provider.transaction_receipt(tx_hash).await? {
        status.apply_receipt(&receipt, event_key);
    }

    Ok(status)
}
