//! Starknet JSON-RPC client.
//!
//! Speaks the v0.7 node API over HTTP and implements [`StarknetProvider`].
//! Receipts are passed through as raw JSON; [`crate::receipt`] decides what
//! in them is usable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{codes, RpcError};
use crate::provider::StarknetProvider;
use crate::receipt::parse_felt;
use crate::selector::selector_hex;

/// HTTP request timeout for node RPC calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Block tag used for reads.
const LATEST: &str = "latest";

#[derive(Clone)]
pub struct RpcClient {
    rpc_url: String,
    http: reqwest::Client,
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonRpcRequest<T: Serialize> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'static str,
    params: T,
}

#[derive(Deserialize, Debug)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize, Debug)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Serialize)]
struct FunctionCall<'a> {
    contract_address: &'a str,
    entry_point_selector: String,
    calldata: &'a [String],
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            http,
        })
    }

    async fn request<P, R>(&self, method: &'static str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "1",
            method,
            params,
        };

        debug!(method, "Sending RPC request");

        let resp: JsonRpcResponse<R> = self
            .http
            .post(&self.rpc_url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.error {
            return Err(RpcError::Node {
                code: err.code,
                message: err.message,
            });
        }

        resp.result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{method} returned null result")))
    }
}

#[async_trait]
impl StarknetProvider for RpcClient {
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Option<Value>, RpcError> {
        let params = serde_json::json!({ "transaction_hash": tx_hash });

        match self
            .request::<_, Value>("starknet_getTransactionReceipt", params)
            .await
        {
            Ok(receipt) => Ok(Some(receipt)),
            Err(RpcError::Node { code, .. }) if code == codes::TXN_HASH_NOT_FOUND => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn chain_id(&self) -> Result<String, RpcError> {
        let raw: String = self.request("starknet_chainId", Vec::<Value>::new()).await?;
        decode_short_string(&raw)
            .ok_or_else(|| RpcError::InvalidResponse(format!("chain id {raw} is not a short string")))
    }

    async fn nonce(&self, address: &str) -> Result<String, RpcError> {
        let params = serde_json::json!({
            "block_id": LATEST,
            "contract_address": address,
        });
        self.request("starknet_getNonce", params).await
    }

    async fn call(
        &self,
        contract_address: &str,
        entry_point: &str,
        calldata: &[String],
    ) -> Result<Vec<String>, RpcError> {
        let request = FunctionCall {
            contract_address,
            entry_point_selector: selector_hex(entry_point),
            calldata,
        };
        let params = serde_json::json!({
            "request": request,
            "block_id": LATEST,
        });
        self.request("starknet_call", params).await
    }
}

/// Decode a felt holding an ASCII short string (Cairo `'SN_SEPOLIA'`).
pub fn decode_short_string(felt: &str) -> Option<String> {
    let value = parse_felt(felt)?;
    let bytes = value.to_bytes_be();
    if bytes == [0] {
        return Some(String::new());
    }
    if !bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        return None;
    }
    String::from_utf8(bytes).ok()
}
