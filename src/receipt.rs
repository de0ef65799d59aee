//! Random-value extraction from transaction receipts.
//!
//! The randomness provider emits a `Rand` event whose data carries a Cairo
//! `u256` as two felts, `[low, high]`. Receipts arrive as raw JSON from the
//! node and no schema is assumed: anything missing or malformed decodes to
//! "no value yet" rather than an error.

use num_bigint::BigUint;
use serde_json::Value;
use tracing::debug;

/// Selector of the provider's `Rand` event on the Sepolia deployment.
pub const RAND_EVENT_KEY: &str =
    "0x336e205c25d23b190b5ce9bca58f9a9d2f3d1866451ce0abfc5645be6bff03d";

/// Bit width of each half of a Cairo `u256`.
const U128_BITS: u32 = 128;

/// Why a receipt did not yield a value.
///
/// Callers only see `None`; the variants exist for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMiss {
    NoReceipt,
    NoEvents,
    NoMatchingEvent,
    EmptyData,
    Malformed,
}

/// Extract the random value carried by the first event keyed by `event_key`,
/// rendered as a decimal string.
pub fn decode_random_value(receipt: Option<&Value>, event_key: &str) -> Option<String> {
    match try_decode_random_value(receipt, event_key) {
        Ok(value) => Some(value.to_string()),
        Err(miss) => {
            debug!(?miss, "No random value in receipt");
            None
        }
    }
}

/// Same as [`decode_random_value`] but keeps the integer and the miss reason.
pub fn try_decode_random_value(
    receipt: Option<&Value>,
    event_key: &str,
) -> Result<BigUint, DecodeMiss> {
    let receipt = receipt
        .filter(|r| !r.is_null())
        .ok_or(DecodeMiss::NoReceipt)?;

    let events = receipt
        .get("events")
        .and_then(Value::as_array)
        .ok_or(DecodeMiss::NoEvents)?;

    let event = events
        .iter()
        .find(|event| first_key(event) == Some(event_key))
        .ok_or(DecodeMiss::NoMatchingEvent)?;

    let data = event
        .get("data")
        .and_then(Value::as_array)
        .filter(|data| !data.is_empty())
        .ok_or(DecodeMiss::EmptyData)?;

    match data.as_slice() {
        [single] => parse_felt_value(single).ok_or(DecodeMiss::Malformed),
        [low, high, ..] => {
            let low = parse_felt_value(low).ok_or(DecodeMiss::Malformed)?;
            let high = parse_felt_value(high).ok_or(DecodeMiss::Malformed)?;
            Ok(u256_from_parts(&low, &high))
        }
        [] => Err(DecodeMiss::EmptyData),
    }
}

/// Combine the halves of a Cairo `u256`: `(high << 128) + low`.
pub fn u256_from_parts(low: &BigUint, high: &BigUint) -> BigUint {
    (high << U128_BITS) + low
}

/// Parse a felt rendered as decimal or `0x`-prefixed hexadecimal.
///
/// The empty string (and a bare `0x`) is rejected rather than read as zero.
pub fn parse_felt(raw: &str) -> Option<BigUint> {
    let raw = raw.trim();
    let (digits, radix) = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (raw, 10),
    };

    // num-bigint tolerates `_` separators and a leading `+`; felts never carry either.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    BigUint::parse_bytes(digits.as_bytes(), radix)
}

/// Data items are normally strings. A bare JSON number is accepted only when it
/// is a non-negative integer within `u64`; larger numbers such as `1e30` have
/// already lost precision and are rejected.
fn parse_felt_value(value: &Value) -> Option<BigUint> {
    match value {
        Value::String(s) => parse_felt(s),
        Value::Number(n) => n.as_u64().map(BigUint::from),
        _ => None,
    }
}

fn first_key(event: &Value) -> Option<&str> {
    event
        .get("keys")
        .and_then(Value::as_array)
        .and_then(|keys| keys.first())
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = RAND_EVENT_KEY;

    fn receipt_with(data: Value) -> Value {
        json!({
            "transaction_hash": "0x1",
            "events": [
                { "keys": ["0x99"], "data": ["0x7"] },
                { "keys": [KEY], "data": data },
            ]
        })
    }

    #[test]
    fn absent_receipt_is_no_value() {
        assert_eq!(decode_random_value(None, KEY), None);
        assert_eq!(decode_random_value(Some(&Value::Null), KEY), None);
    }

    #[test]
    fn receipt_without_events_is_no_value() {
        let receipt = json!({ "transaction_hash": "0x1" });
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::NoEvents)
        );

        let receipt = json!({ "events": "not-a-list" });
        assert_eq!(decode_random_value(Some(&receipt), KEY), None);
    }

    #[test]
    fn no_matching_key_is_no_value() {
        let receipt = json!({
            "events": [
                { "keys": ["0x1234"], "data": ["0x5", "0x0"] },
                { "keys": [], "data": ["0x5"] },
                { "data": ["0x5"] },
            ]
        });
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::NoMatchingEvent)
        );
    }

    #[test]
    fn key_comparison_is_textual() {
        // Same number, different rendering.
        let padded = KEY.replacen("0x", "0x0", 1);
        let receipt = json!({ "events": [{ "keys": [padded], "data": ["1"] }] });
        assert_eq!(decode_random_value(Some(&receipt), KEY), None);
    }

    #[test]
    fn only_first_key_is_matched() {
        let receipt = json!({ "events": [{ "keys": ["0x1", KEY], "data": ["1"] }] });
        assert_eq!(decode_random_value(Some(&receipt), KEY), None);
    }

    #[test]
    fn non_string_first_key_never_matches() {
        let receipt = json!({
            "events": [
                { "keys": [123], "data": ["1"] },
                { "keys": [null] },
            ]
        });
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::NoMatchingEvent)
        );
    }

    #[test]
    fn oversized_json_number_is_malformed() {
        let receipt = receipt_with(json!([1e30]));
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::Malformed)
        );

        let receipt = receipt_with(json!([42]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("42"));
    }

    #[test]
    fn combines_low_and_high() {
        let receipt = receipt_with(json!(["5", "0"]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("5"));

        let receipt = receipt_with(json!(["0", "1"]));
        assert_eq!(
            decode_random_value(Some(&receipt), KEY).as_deref(),
            Some("340282366920938463463374607431768211456")
        );
    }

    #[test]
    fn combines_hex_parts() {
        let receipt = receipt_with(json!([
            "0xffffffffffffffffffffffffffffffff",
            "0xffffffffffffffffffffffffffffffff"
        ]));
        assert_eq!(
            decode_random_value(Some(&receipt), KEY).as_deref(),
            Some("115792089237316195423570985008687907853269984665640564039457584007913129639935")
        );
    }

    #[test]
    fn zero_pair_decodes_to_zero() {
        let receipt = receipt_with(json!(["0x0", "0x0"]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("0"));
    }

    #[test]
    fn single_element_is_returned_directly() {
        let receipt = receipt_with(json!(["42"]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("42"));

        let receipt = receipt_with(json!([42]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("42"));
    }

    #[test]
    fn extra_data_elements_are_ignored() {
        let receipt = receipt_with(json!(["0x1", "0x0", "0xdead"]));
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("1"));
    }

    #[test]
    fn empty_or_missing_data_is_no_value() {
        let receipt = receipt_with(json!([]));
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::EmptyData)
        );

        let receipt = json!({ "events": [{ "keys": [KEY] }] });
        assert_eq!(
            try_decode_random_value(Some(&receipt), KEY),
            Err(DecodeMiss::EmptyData)
        );
    }

    #[test]
    fn non_numeric_data_is_no_value() {
        for data in [
            json!(["not-a-number"]),
            json!(["0x5", "not-a-number"]),
            json!(["", "0x0"]),
            json!(["0x", "0x0"]),
            json!(["1_000"]),
            json!(["-5"]),
            json!([null, "0x0"]),
            json!([{ "low": 1 }]),
        ] {
            let receipt = receipt_with(data);
            assert_eq!(
                try_decode_random_value(Some(&receipt), KEY),
                Err(DecodeMiss::Malformed)
            );
        }
    }

    #[test]
    fn first_matching_event_wins() {
        let receipt = json!({
            "events": [
                { "keys": [KEY], "data": ["0x1", "0x0"] },
                { "keys": [KEY], "data": ["0x2", "0x0"] },
            ]
        });
        assert_eq!(decode_random_value(Some(&receipt), KEY).as_deref(), Some("1"));
    }

    #[test]
    fn malformed_first_match_does_not_fall_through() {
        let receipt = json!({
            "events": [
                { "keys": [KEY], "data": ["garbage"] },
                { "keys": [KEY], "data": ["0x2", "0x0"] },
            ]
        });
        assert_eq!(decode_random_value(Some(&receipt), KEY), None);
    }

    #[test]
    fn decoding_is_repeatable() {
        let receipt = receipt_with(json!(["0xabc", "0x1"]));
        let before = receipt.clone();
        let first = decode_random_value(Some(&receipt), KEY);
        let second = decode_random_value(Some(&receipt), KEY);
        assert_eq!(first, second);
        assert_eq!(receipt, before);
    }

    #[test]
    fn parses_felt_encodings() {
        assert_eq!(parse_felt("0x10"), Some(BigUint::from(16u32)));
        assert_eq!(parse_felt("0X10"), Some(BigUint::from(16u32)));
        assert_eq!(parse_felt(" 10 "), Some(BigUint::from(10u32)));
        assert_eq!(parse_felt("0"), Some(BigUint::from(0u32)));
        assert_eq!(parse_felt("+10"), None);
        assert_eq!(parse_felt("0xg"), None);
        assert_eq!(parse_felt("12a"), None);
        assert_eq!(parse_felt(""), None);
        assert_eq!(parse_felt("0x"), None);
    }
}
