// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic shard sizing.
//!
//! Inspects a payload before it is written, guesses what kind of data it
//! is and how well it will compress, and turns that into a shard size the
//! document store can accept.

use crate::codec::{self, CompressionType};
use crate::sizing;
use serde::Serialize;
use std::fmt;

/// Leading bytes inspected when classifying a payload
pub const CLASSIFY_SAMPLE: usize = 1000;

/// Leading bytes inspected for a JSON opener
pub const JSON_SNIFF_LEN: usize = 100;

/// Payloads up to this size get a real trial compression
pub const TRIAL_COMPRESSION_LIMIT: usize = 10 * 1024;

/// Inputs below this size get extra headroom
pub const SMALL_INPUT: u64 = 1024 * 1024;

/// Inputs above this size are sized conservatively
pub const LARGE_INPUT: u64 = 50 * 1024 * 1024;

/// Upper bound on recommended shards per payload
pub const MAX_SHARDS: u64 = 100;

const MEASURED_WEIGHT: f64 = 0.7;
const MIN_RATIO: f64 = 0.1;
const MAX_RATIO: f64 = 1.0;

/// Coarse classification of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Json,
    Text,
    /// Mixed binary and text, typical of client database pages
    Session,
    Binary,
    Unknown,
}

impl DataType {
    /// Baseline compressed/original ratio; lower compresses better.
    pub fn baseline_ratio(&self) -> f64 {
        match self {
            DataType::Json => 0.3,
            DataType::Text => 0.4,
            DataType::Session => 0.6,
            DataType::Binary => 0.8,
            DataType::Unknown => 0.7,
        }
    }

    fn size_factor(&self) -> f64 {
        match self {
            DataType::Json | DataType::Text => 1.1,
            DataType::Binary => 0.9,
            DataType::Session | DataType::Unknown => 1.0,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Json => "json",
            DataType::Text => "text",
            DataType::Session => "session",
            DataType::Binary => "binary",
            DataType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e | b'\t' | b'\n' | b'\r')
}

/// Classify a payload from its leading bytes.
pub fn detect_data_type(data: &[u8]) -> DataType {
    if data.is_empty() {
        return DataType::Unknown;
    }

    let sample = &data[..data.len().min(CLASSIFY_SAMPLE)];
    let printable = sample.iter().filter(|b| is_printable(**b)).count();
    let ratio = printable as f64 / sample.len() as f64;

    if ratio > 0.8 {
        let head = &data[..data.len().min(JSON_SNIFF_LEN)];
        let first = head.iter().find(|b| !b.is_ascii_whitespace());
        match first {
            Some(b'{') | Some(b'[') => DataType::Json,
            _ => DataType::Text,
        }
    } else if ratio > 0.3 {
        DataType::Session
    } else {
        DataType::Binary
    }
}

/// Estimate the compressed/original ratio of `data` under `algorithm`.
///
/// Small payloads are trial-compressed and the measurement is blended
/// with the static estimate. The result is always in `[0.1, 1.0]`.
pub fn estimate_compression_ratio(data: &[u8], algorithm: CompressionType) -> f64 {
    // Nothing shrinks without a codec.
    if algorithm == CompressionType::None {
        return MAX_RATIO;
    }

    let data_type = detect_data_type(data);
    let efficiency = algorithm.efficiency();
    let estimate = data_type.baseline_ratio() * efficiency + (1.0 - efficiency);

    if data.is_empty() || data.len() > TRIAL_COMPRESSION_LIMIT {
        return estimate.clamp(MIN_RATIO, MAX_RATIO);
    }

    match codec::compress(data, algorithm) {
        Ok(compressed) => {
            let measured = compressed.len() as f64 / data.len() as f64;
            let blended = measured * MEASURED_WEIGHT + estimate * (1.0 - MEASURED_WEIGHT);
            blended.clamp(MIN_RATIO, MAX_RATIO)
        }
        Err(e) => {
            tracing::debug!(error = %e, %algorithm, "trial compression failed, using estimate");
            estimate.clamp(MIN_RATIO, MAX_RATIO)
        }
    }
}

/// Shard size for `data` once written with `algorithm`.
///
/// Never exceeds [`sizing::safe_shard_size`].
pub fn optimal_shard_size(data: &[u8], algorithm: CompressionType) -> u64 {
    let safe = sizing::safe_shard_size();
    if data.is_empty() {
        return safe;
    }

    let data_type = detect_data_type(data);
    let ratio = estimate_compression_ratio(data, algorithm);
    // ratio is clamped into (0, 1] above, so this cannot fail
    let base = sizing::safe_shard_size_for_ratio(ratio).unwrap_or(safe) as f64;

    let len = data.len() as u64;
    let size_factor = if len < SMALL_INPUT {
        1.2
    } else if len > LARGE_INPUT {
        0.9
    } else {
        1.0
    };

    let adjusted = (base * size_factor * data_type.size_factor()).floor() as u64;
    adjusted.min(safe)
}

/// Recommended shard count for `total_size`, capped at [`MAX_SHARDS`].
///
/// Returns the count and whether the cap was applied.
pub fn recommended_shard_count(total_size: u64, shard_size: u64) -> (u64, bool) {
    let needed = sizing::shard_count_with(total_size, shard_size);
    if needed > MAX_SHARDS {
        tracing::warn!(
            needed,
            max = MAX_SHARDS,
            total = %sizing::format_bytes(total_size),
            "shard count capped"
        );
        (MAX_SHARDS, true)
    } else {
        (needed, false)
    }
}

/// Sizing decision for one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardPlan {
    pub data_type: DataType,
    pub estimated_ratio: f64,
    pub shard_size: u64,
    pub shard_count: u64,
    pub capped: bool,
}

/// Run the full sizing analysis for `data`.
pub fn analyze(data: &[u8], algorithm: CompressionType) -> ShardPlan {
    let data_type = detect_data_type(data);
    let estimated_ratio = estimate_compression_ratio(data, algorithm);
    let shard_size = optimal_shard_size(data, algorithm);
    let expected = (data.len() as f64 * estimated_ratio).ceil() as u64;
    let (shard_count, capped) = recommended_shard_count(expected, shard_size);

    tracing::debug!(
        %data_type,
        estimated_ratio,
        shard_size,
        shard_count,
        "shard plan"
    );

    ShardPlan {
        data_type,
        estimated_ratio,
        shard_size,
        shard_count,
        capped,
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod tests;
