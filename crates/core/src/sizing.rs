// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shard size calculation.
//!
//! Every stored document is capped at [`DOCUMENT_LIMIT`]. Binary payloads
//! embedded in a document are Base64 encoded (roughly a third larger) and
//! share the document with record metadata, so the largest raw chunk that
//! can be written safely is well below the limit:
//!
//! ```text
//! safe = floor((DOCUMENT_LIMIT - METADATA_RESERVE) / BASE64_EXPANSION * SAFETY_MARGIN)
//! ```
//!
//! All functions here are pure.

use thiserror::Error;

/// Maximum size of a single stored document (16 MiB)
pub const DOCUMENT_LIMIT: u64 = 16 * 1024 * 1024;

/// Space reserved for record metadata (1 MiB)
pub const METADATA_RESERVE: u64 = 1024 * 1024;

/// Size growth of Base64 text over raw bytes
pub const BASE64_EXPANSION: f64 = 1.33;

/// Extra headroom applied on top of the encoding estimate
pub const SAFETY_MARGIN: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("compression ratio must be in (0, 1], got {0}")]
    InvalidRatio(f64),
}

/// Largest raw chunk that fits a document once encoded.
pub fn safe_shard_size() -> u64 {
    let usable = (DOCUMENT_LIMIT - METADATA_RESERVE) as f64;
    (usable / BASE64_EXPANSION * SAFETY_MARGIN).floor() as u64
}

/// Largest raw chunk when the payload is expected to shrink to
/// `ratio` of its size before it is written.
///
/// Better compression (smaller ratio) allows a larger raw chunk.
pub fn safe_shard_size_for_ratio(ratio: f64) -> Result<u64, SizingError> {
    validate_ratio(ratio)?;
    Ok((safe_shard_size() as f64 / ratio).floor() as u64)
}

pub(crate) fn validate_ratio(ratio: f64) -> Result<(), SizingError> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(())
    } else {
        Err(SizingError::InvalidRatio(ratio))
    }
}

/// Number of safe shards needed to hold `total_size` bytes.
pub fn shard_count(total_size: u64) -> u64 {
    shard_count_with(total_size, safe_shard_size())
}

/// Number of `shard_size` chunks needed to hold `total_size` bytes.
pub fn shard_count_with(total_size: u64, shard_size: u64) -> u64 {
    if shard_size == 0 {
        return 0;
    }
    total_size.div_ceil(shard_size)
}

/// Whether a raw chunk still fits a document after Base64 encoding.
pub fn is_safe_raw_size(size: u64) -> bool {
    let encoded = (size as f64 * BASE64_EXPANSION).ceil() as u64;
    is_safe_encoded_size(encoded)
}

/// Whether an already-encoded payload fits a document with the
/// metadata reserve.
pub fn is_safe_encoded_size(size: u64) -> bool {
    size.saturating_add(METADATA_RESERVE) <= DOCUMENT_LIMIT
}

/// Human-readable byte count (`"512 B"`, `"1.50 MiB"`).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{:.2} {}", value, unit)
}

#[cfg(test)]
#[path = "sizing_tests.rs"]
mod tests;
