use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::StarknetProvider;
use crate::error::RpcError;

/// Scripted responses, consumed in order. The last entry repeats once the
/// queue is down to one item.
type Script<T> = Arc<Mutex<VecDeque<Result<T, (i64, String)>>>>;

#[derive(Clone, Default)]
pub(crate) struct MockProvider {
    receipts: Script<Option<Value>>,
    chain_ids: Script<String>,
    nonces: Script<String>,
    calls: Script<Vec<String>>,
    receipt_calls: Arc<Mutex<usize>>,
    last_call: Arc<Mutex<Option<(String, String)>>>,
    delay: Duration,
}

fn next<T: Clone>(script: &Script<T>) -> Result<T, RpcError> {
    let mut queue = script.lock().unwrap();
    let item = if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    };
    match item {
        Some(Ok(v)) => Ok(v),
        Some(Err((code, message))) if code < 0 => Err(RpcError::Transport(message)),
        Some(Err((code, message))) => Err(RpcError::Node { code, message }),
        None => Err(RpcError::Transport("no scripted response".into())),
    }
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Every response is held back for `delay`.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn respond(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    pub(crate) fn push_receipt(self, receipt: Option<Value>) -> Self {
        self.receipts.lock().unwrap().push_back(Ok(receipt));
        self
    }

    pub(crate) fn push_chain_id(self, chain_id: &str) -> Self {
        self.chain_ids.lock().unwrap().push_back(Ok(chain_id.to_string()));
        self
    }

    pub(crate) fn push_nonce(self, nonce: &str) -> Self {
        self.nonces.lock().unwrap().push_back(Ok(nonce.to_string()));
        self
    }

    pub(crate) fn push_call(self, result: &[&str]) -> Self {
        let felts = result.iter().map(|s| s.to_string()).collect();
        self.calls.lock().unwrap().push_back(Ok(felts));
        self
    }

    /// A negative code scripts a transport failure, otherwise a node error.
    pub(crate) fn push_receipt_error(self, code: i64, message: &str) -> Self {
        self.receipts
            .lock()
            .unwrap()
            .push_back(Err((code, message.to_string())));
        self
    }

    pub(crate) fn push_chain_id_error(self, code: i64, message: &str) -> Self {
        self.chain_ids
            .lock()
            .unwrap()
            .push_back(Err((code, message.to_string())));
        self
    }

    pub(crate) fn push_nonce_error(self, code: i64, message: &str) -> Self {
        self.nonces
            .lock()
            .unwrap()
            .push_back(Err((code, message.to_string())));
        self
    }

    pub(crate) fn push_call_error(self, code: i64, message: &str) -> Self {
        self.calls
            .lock()
            .unwrap()
            .push_back(Err((code, message.to_string())));
        self
    }

    pub(crate) fn receipt_call_count(&self) -> usize {
        *self.receipt_calls.lock().unwrap()
    }

    pub(crate) fn last_call(&self) -> Option<(String, String)> {
        self.last_call.lock().unwrap().clone()
    }
}

#[async_trait]
impl StarknetProvider for MockProvider {
    async fn transaction_receipt(&self, _tx_hash: &str) -> Result<Option<Value>, RpcError> {
        *self.receipt_calls.lock().unwrap() += 1;
        self.respond().await;
        next(&self.receipts)
    }

    async fn chain_id(&self) -> Result<String, RpcError> {
        self.respond().await;
        next(&self.chain_ids)
    }

    async fn nonce(&self, _address: &str) -> Result<String, RpcError> {
        self.respond().await;
        next(&self.nonces)
    }

    async fn call(
        &self,
        contract_address: &str,
        entry_point: &str,
        _calldata: &[String],
    ) -> Result<Vec<String>, RpcError> {
        *self.last_call.lock().unwrap() =
            Some((contract_address.to_string(), entry_point.to_string()));
        self.respond().await;
        next(&self.calls)
    }
}
