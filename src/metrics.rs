//! Counters for receipt polling and decoding.
//!
//! All counters are backed by atomics for lock-free concurrent access.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe via atomics; share as `Arc<Metrics>`.
#[derive(Default)]
pub struct Metrics {
    /// Receipt fetches issued against the node.
    pub receipts_polled: AtomicU64,
    /// Fetches that returned a receipt.
    pub receipts_found: AtomicU64,
    /// Receipts that yielded a random value.
    pub values_decoded: AtomicU64,
    /// Receipts that were present but carried no usable value.
    pub decode_misses: AtomicU64,
    /// Node or transport failures seen while polling.
    pub upstream_failures: AtomicU64,
    /// Sum of submit-to-value latencies in milliseconds.
    pub value_latency_sum_ms: AtomicU64,
    /// Number of decoded values contributing to the latency sum.
    pub value_latency_count: AtomicU64,
}

impl Metrics {
    /// Create a new zeroed metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a receipt fetch issued against the node.
    pub fn record_poll(&self) {
        self.receipts_polled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fetch that returned a receipt.
    pub fn record_receipt(&self) {
        self.receipts_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decoded value whose submit-to-value latency is unknown.
    pub fn record_decoded(&self) {
        self.values_decoded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decoded value with the time it took since watching began.
    pub fn record_value(&self, latency_ms: u64) {
        self.record_decoded();
        self.value_latency_sum_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.value_latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a receipt that carried no usable value.
    pub fn record_miss(&self) {
        self.decode_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a node or transport failure.
    pub fn record_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Average submit-to-value latency in milliseconds, or 0 if none.
    pub fn avg_latency_ms(&self) -> u64 {
        let count = self.value_latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return 0;
        }
        self.value_latency_sum_ms.load(Ordering::Relaxed) / count
    }

    /// Serialize metrics as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "receipts_polled": self.receipts_polled.load(Ordering::Relaxed),
            "receipts_found": self.receipts_found.load(Ordering::Relaxed),
            "values_decoded": self.values_decoded.load(Ordering::Relaxed),
            "decode_misses": self.decode_misses.load(Ordering::Relaxed),
            "upstream_failures": self.upstream_failures.load(Ordering::Relaxed),
            "avg_value_latency_ms": self.avg_latency_ms(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_latency() {
        let m = Metrics::new();
        assert_eq!(m.avg_latency_ms(), 0);

        m.record_value(100);
        m.record_value(300);
        assert_eq!(m.avg_latency_ms(), 200);
        assert_eq!(m.to_json()["values_decoded"], 2);
    }

    #[test]
    fn values_without_latency_do_not_skew_average() {
        let m = Metrics::new();
        m.record_value(100);
        m.record_decoded();
        assert_eq!(m.avg_latency_ms(), 100);
        assert_eq!(m.to_json()["values_decoded"], 2);
    }
}
