//! Display helpers for hashes, addresses and explorer links.

/// Truncation shape for long hex strings: `prefix...suffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortFormat {
    pub prefix: usize,
    pub suffix: usize,
}

impl ShortFormat {
    /// Account and contract addresses: `0x06c3...d1d5`.
    pub const ADDRESS: Self = Self { prefix: 6, suffix: 4 };
    /// Transaction hashes: `0x06228386...a1bf4190`.
    pub const TX_HASH: Self = Self { prefix: 10, suffix: 8 };

    /// Strings shorter than this are returned as-is.
    pub const fn min_len(&self) -> usize {
        self.prefix + self.suffix
    }

    pub fn apply(&self, s: &str) -> String {
        let len = s.chars().count();
        if len < self.min_len() {
            return s.to_string();
        }

        let head: String = s.chars().take(self.prefix).collect();
        let tail: String = s.chars().skip(len - self.suffix).collect();
        format!("{head}...{tail}")
    }
}

/// Shorten an address to `0x1234...abcd`.
pub fn format_address(address: &str) -> String {
    ShortFormat::ADDRESS.apply(address)
}

/// Shorten a transaction hash to its first 10 and last 8 characters.
pub fn format_tx_hash(tx_hash: &str) -> String {
    ShortFormat::TX_HASH.apply(tx_hash)
}

/// Explorer page for a transaction. The hash is appended verbatim.
pub fn build_explorer_url(base_url: &str, tx_hash: &str) -> String {
    format!("{base_url}{tx_hash}")
}
