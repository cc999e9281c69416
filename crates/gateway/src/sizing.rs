//! Payload size accounting for the two hops.
//!
//! The worker hop sizes are estimates. Text uses a constant ratio against the
//! JSON size; audio drops the base64 inflation and adds a fixed framing cost.

use serde::Serialize;

/// Estimated binary size of a text request relative to its JSON size.
pub const TEXT_BINARY_RATIO: f64 = 0.6;

/// Fixed bytes attributed to the JSON object wrapping an audio blob.
pub const JSON_WRAPPER_OVERHEAD_BYTES: usize = 100;

/// Fixed bytes attributed to binary field tags around an audio blob.
pub const BINARY_FRAMING_OVERHEAD_BYTES: usize = 20;

/// Length of the canonical JSON serialization of `value`.
pub fn json_size<T: Serialize>(value: &T) -> serde_json::Result<usize> {
    serde_json::to_vec(value).map(|bytes| bytes.len())
}

pub fn estimate_text_worker_bytes(gateway_bytes: usize) -> usize {
    (gateway_bytes as f64 * TEXT_BINARY_RATIO).floor() as usize
}

/// Padded base64 length of `raw_len` bytes.
pub fn base64_len(raw_len: usize) -> usize {
    raw_len.div_ceil(3) * 4
}

/// Largest raw length whose base64 form may be `encoded_len` bytes long.
pub fn decoded_len_upper_bound(encoded_len: usize) -> usize {
    encoded_len.div_ceil(4) * 3
}

pub fn audio_gateway_bytes(raw_len: usize) -> usize {
    base64_len(raw_len) + JSON_WRAPPER_OVERHEAD_BYTES
}

pub fn audio_worker_bytes(raw_len: usize) -> usize {
    raw_len + BINARY_FRAMING_OVERHEAD_BYTES
}

/// `(1 - worker/gateway) * 100` with one decimal place, clamped to 0..=100.
pub fn size_reduction(gateway_bytes: usize, worker_bytes: usize) -> String {
    if gateway_bytes == 0 {
        return "0.0%".to_string();
    }
    let pct = (1.0 - worker_bytes as f64 / gateway_bytes as f64) * 100.0;
    format!("{:.1}%", pct.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_estimate_floors() {
        assert_eq!(estimate_text_worker_bytes(100), 60);
        assert_eq!(estimate_text_worker_bytes(57), 34);
        assert_eq!(estimate_text_worker_bytes(0), 0);
        assert_eq!(size_reduction(100, 60), "40.0%");
    }

    #[test]
    fn test_base64_len() {
        assert_eq!(base64_len(0), 0);
        assert_eq!(base64_len(1), 4);
        assert_eq!(base64_len(3), 4);
        assert_eq!(base64_len(4), 8);
        assert_eq!(decoded_len_upper_bound(8), 6);
    }

    #[test]
    fn test_audio_10k_scenario() {
        let gateway = audio_gateway_bytes(10240);
        let worker = audio_worker_bytes(10240);
        assert_eq!(gateway, 13756);
        assert_eq!(worker, 10260);
        assert_eq!(size_reduction(gateway, worker), "25.4%");
    }

    #[test]
    fn test_reduction_is_clamped() {
        assert_eq!(size_reduction(10, 20), "0.0%");
        assert_eq!(size_reduction(10, 0), "100.0%");
        assert_eq!(size_reduction(0, 5), "0.0%");
    }
}
