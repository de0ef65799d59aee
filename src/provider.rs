//! Read-only view of a Starknet node used by the watchers.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

#[cfg(test)]
pub(crate) mod mock;

#[async_trait]
pub trait StarknetProvider: Send + Sync {
    /// Raw receipt JSON, or `None` while the node does not know the hash yet.
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Value>, RpcError>;

    /// Chain id decoded to its short-string form, e.g. `SN_SEPOLIA`.
    async fn chain_id(&self) -> Result<String, RpcError>;

    async fn nonce(&self, address: &str) -> Result<String, RpcError>;

    /// Invoke a view function at the latest block and return its felts.
    async fn call(
        &self,
        contract_address: &str,
        entry_point: &str,
        calldata: &[String],
    ) -> Result<Vec<String>, RpcError>;
}
