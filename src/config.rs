//! Application configuration loaded from environment variables.
//!
//! Every variable is optional and defaults to the Starknet Sepolia
//! deployment of the playground contracts:
//! `RPC_URL`, `EXPLORER_TX_URL`, `RAND_EVENT_KEY`,
//! `RESERVOIR_CONTRACT_ADDRESS`, `RANDOM_PROVIDER_CONTRACT_ADDRESS`,
//! `ACCOUNT_ADDRESS`, `EXPECTED_CHAIN_ID`, `HTTP_PORT`,
//! `RECEIPT_POLL_INTERVAL_MS`, `CONNECTION_CHECK_INTERVAL_MS`,
//! `COUNT_REFRESH_INTERVAL_MS`

use anyhow::{ensure, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::format::build_explorer_url;
use crate::receipt::RAND_EVENT_KEY;

pub const SEPOLIA_RPC_URL: &str = "https://starknet-sepolia.public.blastapi.io/rpc/v0_7";
pub const SEPOLIA_EXPLORER_TX_URL: &str = "https://sepolia.voyager.online/tx/";
pub const SEPOLIA_CHAIN_ID: &str = "SN_SEPOLIA";
pub const RESERVOIR_CONTRACT_ADDRESS: &str =
    "0x06c301bcc487b175b559fa93d5e428506a9d53f52152a8f59449762ca56dd1d5";
pub const RANDOM_PROVIDER_CONTRACT_ADDRESS: &str =
    "0x06228386dcba7494effd28d088d20b2ad69a1ea67cb3f3d94c736ba981bf4190";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Starknet JSON-RPC endpoint.
    pub rpc_url: String,
    /// Explorer prefix; the transaction hash is appended.
    pub explorer_tx_url: String,
    /// Selector of the `Rand` event.
    pub rand_event_key: String,
    pub reservoir_address: String,
    pub random_provider_address: String,
    /// Account whose deployment is checked by the connection watcher.
    pub account_address: Option<String>,
    /// Chain id the node must report, as a short string.
    pub expected_chain_id: String,
    pub http_port: u16,
    pub receipt_poll_interval: Duration,
    pub connection_check_interval: Duration,
    pub count_refresh_interval: Duration,
}

impl AppConfig {
    /// Defaults without consulting the environment.
    pub fn sepolia() -> Self {
        Self {
            rpc_url: SEPOLIA_RPC_URL.into(),
            explorer_tx_url: SEPOLIA_EXPLORER_TX_URL.into(),
            rand_event_key: RAND_EVENT_KEY.into(),
            reservoir_address: RESERVOIR_CONTRACT_ADDRESS.into(),
            random_provider_address: RANDOM_PROVIDER_CONTRACT_ADDRESS.into(),
            account_address: None,
            expected_chain_id: SEPOLIA_CHAIN_ID.into(),
            http_port: 8080,
            receipt_poll_interval: Duration::from_millis(2000),
            connection_check_interval: Duration::from_millis(3000),
            count_refresh_interval: Duration::from_millis(5000),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::sepolia();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);
        let millis = |key: &str, default: Duration| {
            parsed::<u64>(lookup(key))
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let config = Self {
            rpc_url: string("RPC_URL", defaults.rpc_url),
            explorer_tx_url: string("EXPLORER_TX_URL", defaults.explorer_tx_url),
            rand_event_key: string("RAND_EVENT_KEY", defaults.rand_event_key),
            reservoir_address: string("RESERVOIR_CONTRACT_ADDRESS", defaults.reservoir_address),
            random_provider_address: string(
                "RANDOM_PROVIDER_CONTRACT_ADDRESS",
                defaults.random_provider_address,
            ),
            account_address: lookup("ACCOUNT_ADDRESS").filter(|s| !s.is_empty()),
            expected_chain_id: string("EXPECTED_CHAIN_ID", defaults.expected_chain_id),
            http_port: parsed(lookup("HTTP_PORT")).unwrap_or(defaults.http_port),
            receipt_poll_interval: millis(
                "RECEIPT_POLL_INTERVAL_MS",
                defaults.receipt_poll_interval,
            ),
            connection_check_interval: millis(
                "CONNECTION_CHECK_INTERVAL_MS",
                defaults.connection_check_interval,
            ),
            count_refresh_interval: millis(
                "COUNT_REFRESH_INTERVAL_MS",
                defaults.count_refresh_interval,
            ),
        };

        ensure!(
            !config.rand_event_key.trim().is_empty(),
            "RAND_EVENT_KEY must not be empty"
        );
        ensure!(!config.rpc_url.is_empty(), "RPC_URL must not be empty");

        Ok(config)
    }

    /// Explorer page for a transaction hash.
    pub fn explorer_url(&self, tx_hash: &str) -> String {
        build_explorer_url(&self.explorer_tx_url, tx_hash)
    }
}

fn parsed<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.parse().ok())
}
