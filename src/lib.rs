//! Entropify
//!
//! Off-chain companion for the Starknet randomness provider: watches
//! `rand` transactions, decodes the `Rand` event value out of their
//! receipts, and tracks the node connection and entropy reservoir.

pub mod api;
pub mod config;
pub mod connection;
pub mod error;
pub mod format;
pub mod metrics;
pub mod poller;
pub mod provider;
pub mod receipt;
pub mod reservoir;
pub mod rpc;
pub mod selector;
