//! Error classification for node and wallet-facing failures.
//!
//! Callers switch on [`ErrorKind`] instead of inspecting message text.

use serde::Serialize;

/// Starknet JSON-RPC error codes this service reacts to.
pub mod codes {
    pub const CONTRACT_NOT_FOUND: i64 = 20;
    pub const TXN_HASH_NOT_FOUND: i64 = 29;
    pub const CONTRACT_ERROR: i64 = 40;
    pub const TRANSACTION_EXECUTION_ERROR: i64 = 41;
    pub const INSUFFICIENT_ACCOUNT_BALANCE: i64 = 54;
    pub const VALIDATION_FAILURE: i64 = 55;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotConnected,
    WrongNetwork,
    AccountRequired,
    InsufficientFunds,
    TransactionNotFound,
    ExecutionFailed,
    ValidationFailed,
    Network,
    InvalidResponse,
    Unknown,
}

impl ErrorKind {
    /// Text suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotConnected => "Please connect your wallet first",
            Self::WrongNetwork => "Connected to the wrong network",
            Self::AccountRequired => {
                "Account is required. Please ensure your wallet is properly connected"
            }
            Self::InsufficientFunds => "Insufficient funds to complete this transaction",
            Self::TransactionNotFound => "Transaction not found",
            Self::ExecutionFailed => "Transaction execution failed",
            Self::ValidationFailed => "Transaction validation failed",
            Self::Network => "Network request failed",
            Self::InvalidResponse => "Unexpected response from node",
            Self::Unknown => "Failed to generate random number",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
}

impl RpcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) => ErrorKind::Network,
            Self::InvalidResponse(_) => ErrorKind::InvalidResponse,
            Self::Node { code, .. } => match *code {
                codes::CONTRACT_NOT_FOUND => ErrorKind::AccountRequired,
                codes::TXN_HASH_NOT_FOUND => ErrorKind::TransactionNotFound,
                codes::CONTRACT_ERROR | codes::TRANSACTION_EXECUTION_ERROR => {
                    ErrorKind::ExecutionFailed
                }
                codes::INSUFFICIENT_ACCOUNT_BALANCE => ErrorKind::InsufficientFunds,
                codes::VALIDATION_FAILURE => ErrorKind::ValidationFailed,
                _ => ErrorKind::Unknown,
            },
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(code: i64) -> RpcError {
        RpcError::Node {
            code,
            message: "boom".into(),
        }
    }

    #[test]
    fn classifies_by_code() {
        assert_eq!(node(29).kind(), ErrorKind::TransactionNotFound);
        assert_eq!(node(54).kind(), ErrorKind::InsufficientFunds);
        assert_eq!(node(20).kind(), ErrorKind::AccountRequired);
        assert_eq!(node(41).kind(), ErrorKind::ExecutionFailed);
        assert_eq!(node(40).kind(), ErrorKind::ExecutionFailed);
        assert_eq!(node(55).kind(), ErrorKind::ValidationFailed);
        assert_eq!(node(-32603).kind(), ErrorKind::Unknown);
    }

    #[test]
    fn message_text_does_not_affect_kind() {
        let err = RpcError::Node {
            code: -32603,
            message: "insufficient funds".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }

    #[test]
    fn transport_and_decode_kinds() {
        assert_eq!(RpcError::Transport("x".into()).kind(), ErrorKind::Network);
        assert_eq!(
            RpcError::InvalidResponse("x".into()).kind(),
            ErrorKind::InvalidResponse
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(ErrorKind::InsufficientFunds).unwrap();
        assert_eq!(v, serde_json::json!("insufficient_funds"));
    }
}
