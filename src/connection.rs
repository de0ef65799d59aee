//! Node/account connection tracking.
//!
//! [`ConnectionWatcher`] owns a background task that probes the node on a
//! fixed interval and publishes a [`ConnectionState`] snapshot. Consumers
//! read the snapshot instead of probing themselves.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::error::{ErrorKind, RpcError};
use crate::format::format_address;
use crate::provider::StarknetProvider;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// No probe has completed yet.
    Unknown,
    Connected {
        chain_id: String,
        account: Option<String>,
    },
    Disconnected {
        kind: ErrorKind,
        message: String,
    },
}

impl ConnectionState {
    /// Whether the last probe succeeded.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    fn disconnected(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Disconnected {
            kind,
            message: message.into(),
        }
    }
}

/// What a probe checks against.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub expected_chain_id: String,
    pub account: Option<String>,
}

/// Single connection check. Holds no state between calls.
pub async fn probe(provider: &dyn StarknetProvider, target: &ProbeTarget) -> ConnectionState {
    let chain_id = match provider.chain_id().await {
        Ok(id) => id,
        Err(e) => return ConnectionState::disconnected(ErrorKind::NotConnected, e.to_string()),
    };

    if chain_id != target.expected_chain_id {
        return ConnectionState::disconnected(
            ErrorKind::WrongNetwork,
            format!(
                "node reports {chain_id}, expected {}",
                target.expected_chain_id
            ),
        );
    }

    if let Some(account) = &target.account {
        if let Err(e) = provider.nonce(account).await {
            let kind = match e {
                RpcError::Node { .. } => e.kind(),
                _ => ErrorKind::NotConnected,
            };
            return ConnectionState::disconnected(kind, e.to_string());
        }
    }

    ConnectionState::Connected {
        chain_id,
        account: target.account.clone(),
    }
}

/// Background connection check publishing the latest [`ConnectionState`].
pub struct ConnectionWatcher {
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ConnectionWatcher {
    /// Spawn the check loop. The first check runs immediately.
    pub fn start(
        provider: Arc<dyn StarknetProvider>,
        target: ProbeTarget,
        interval: Duration,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Unknown);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let next = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    next = probe(provider.as_ref(), &target) => next,
                };
                state_tx.send_if_modified(|current| {
                    if *current == next {
                        return false;
                    }
                    log_transition(&next);
                    *current = next;
                    true
                });
            }

            info!("Connection watcher stopped");
        });

        Self {
            state_rx,
            shutdown_tx,
            handle,
        }
    }

    /// Snapshot of the most recent check.
    pub fn state(&self) -> ConnectionState {
        self.state_rx.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Connection watcher task failed");
        }
    }
}

fn log_transition(state: &ConnectionState) {
    match state {
        ConnectionState::Connected { chain_id, account } => info!(
            chain_id = %chain_id,
            account = account.as_deref().map(format_address).as_deref(),
            "Connected"
        ),
        ConnectionState::Disconnected { kind, message } => {
            warn!(?kind, reason = %message, "Disconnected")
        }
        ConnectionState::Unknown => {}
    }
}
