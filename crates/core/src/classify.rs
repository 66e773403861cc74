// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure classifiers.
//!
//! Each analysis is built from the context of a failure and returns a
//! [`Recommendation`]: what to switch to, whether a retry makes sense and
//! why. Recommendations are advisory; nothing here performs I/O or
//! retries on its own.

use crate::codec::CompressionType;
use crate::sizing::format_bytes;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Advice produced by a classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<A> {
    pub action: A,
    pub should_retry: bool,
    pub description: String,
}

impl<A: fmt::Display> fmt::Display for Recommendation<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.action, self.description)
    }
}

// =============================================================================
// Shard size
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "action")]
pub enum ShardAction {
    /// Payload fits; nothing to change
    Proceed,
    CompressAndRetry,
    Split { shards: u64 },
    UseOverflow,
}

impl fmt::Display for ShardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShardAction::Proceed => f.write_str("proceed"),
            ShardAction::CompressAndRetry => f.write_str("compress-and-retry"),
            ShardAction::Split { shards } => write!(f, "split({})", shards),
            ShardAction::UseOverflow => f.write_str("use-overflow"),
        }
    }
}

/// A payload that came out larger than the shard limit
#[derive(Debug, Clone)]
pub struct ShardSizeAnalysis {
    pub session_id: String,
    pub actual_size: u64,
    pub limit: u64,
}

impl ShardSizeAnalysis {
    pub fn new(session_id: impl Into<String>, actual_size: u64, limit: u64) -> Self {
        Self {
            session_id: session_id.into(),
            actual_size,
            limit,
        }
    }

    /// `actual / limit`; infinite when the limit is zero
    pub fn overshoot_ratio(&self) -> f64 {
        if self.limit == 0 {
            return f64::INFINITY;
        }
        self.actual_size as f64 / self.limit as f64
    }

    pub fn handling_strategy(&self) -> Recommendation<ShardAction> {
        let ratio = self.overshoot_ratio();
        let sizes = format!(
            "{} against a {} limit",
            format_bytes(self.actual_size),
            format_bytes(self.limit)
        );

        if ratio <= 1.0 {
            Recommendation {
                action: ShardAction::Proceed,
                should_retry: false,
                description: format!("payload fits ({})", sizes),
            }
        } else if ratio <= 1.2 {
            Recommendation {
                action: ShardAction::CompressAndRetry,
                should_retry: true,
                description: format!(
                    "{} is within 20% of the limit; compressing should bring it under",
                    sizes
                ),
            }
        } else if ratio <= 2.0 {
            let shards = ratio.ceil() as u64;
            Recommendation {
                action: ShardAction::Split { shards },
                should_retry: true,
                description: format!("{} needs splitting into {} shards", sizes, shards),
            }
        } else {
            Recommendation {
                action: ShardAction::UseOverflow,
                should_retry: true,
                description: format!(
                    "{} is more than twice the limit; move the file group to overflow storage",
                    sizes
                ),
            }
        }
    }
}

// =============================================================================
// Compression
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "action")]
pub enum CompressionAction {
    LowerLevel,
    SkipCompression,
    SwitchAlgorithm { to: CompressionType },
    FallbackUncompressed,
}

impl fmt::Display for CompressionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionAction::LowerLevel => f.write_str("lower-level"),
            CompressionAction::SkipCompression => f.write_str("skip-compression"),
            CompressionAction::SwitchAlgorithm { to } => write!(f, "switch-algorithm({})", to),
            CompressionAction::FallbackUncompressed => f.write_str("fallback-uncompressed"),
        }
    }
}

const MEMORY_SIGNATURES: &[&str] = &["out of memory", "memory", "alloc", "oom"];
const CORRUPTION_SIGNATURES: &[&str] = &["corrupt", "invalid", "checksum", "crc", "malformed"];
const TIMEOUT_SIGNATURES: &[&str] = &["timed out", "timeout", "deadline"];

fn mentions(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// A compression or decompression failure
#[derive(Debug, Clone)]
pub struct CompressionFailureAnalysis {
    pub session_id: String,
    pub algorithm: CompressionType,
    pub original_size: u64,
    pub cause: String,
}

impl CompressionFailureAnalysis {
    pub fn new(
        session_id: impl Into<String>,
        algorithm: CompressionType,
        original_size: u64,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            algorithm,
            original_size,
            cause: cause.into(),
        }
    }

    pub fn handling_strategy(&self) -> Recommendation<CompressionAction> {
        let cause = self.cause.to_lowercase();
        let size = format_bytes(self.original_size);

        if mentions(&cause, MEMORY_SIGNATURES) {
            Recommendation {
                action: CompressionAction::LowerLevel,
                should_retry: true,
                description: format!(
                    "{} ran out of memory on {}; retry at a lower level",
                    self.algorithm, size
                ),
            }
        } else if mentions(&cause, CORRUPTION_SIGNATURES) {
            Recommendation {
                action: CompressionAction::SkipCompression,
                should_retry: true,
                description: format!(
                    "{} stream looked corrupt; store {} uncompressed",
                    self.algorithm, size
                ),
            }
        } else if mentions(&cause, TIMEOUT_SIGNATURES) {
            let to = self.algorithm.alternative();
            Recommendation {
                action: CompressionAction::SwitchAlgorithm { to },
                should_retry: true,
                description: format!("{} timed out on {}; try {}", self.algorithm, size, to),
            }
        } else {
            Recommendation {
                action: CompressionAction::FallbackUncompressed,
                should_retry: true,
                description: format!(
                    "unrecognized {} failure ({}); store uncompressed",
                    self.algorithm, self.cause
                ),
            }
        }
    }
}

// =============================================================================
// Document store
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "action")]
pub enum DocumentStoreAction {
    ImmediateRetry,
    DelayedRetry {
        #[serde(with = "humantime_serde")]
        delay: Duration,
    },
    SwitchConnection,
    FallbackToLocal,
    Reject,
}

impl fmt::Display for DocumentStoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStoreAction::ImmediateRetry => f.write_str("immediate-retry"),
            DocumentStoreAction::DelayedRetry { delay } => {
                write!(f, "delayed-retry({}ms)", delay.as_millis())
            }
            DocumentStoreAction::SwitchConnection => f.write_str("switch-connection"),
            DocumentStoreAction::FallbackToLocal => f.write_str("fallback-to-local"),
            DocumentStoreAction::Reject => f.write_str("reject"),
        }
    }
}

/// Broad cause categories recognized in document store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentStoreCause {
    ConnectionPool,
    Authentication,
    DocumentTooLarge,
    DiskSpace,
    LockContention,
    Timeout,
    Topology,
    Index,
    Connectivity,
    Unknown,
}

// Checked in order; the first matching category wins.
const CAUSE_SIGNATURES: &[(DocumentStoreCause, &[&str])] = &[
    (
        DocumentStoreCause::ConnectionPool,
        &["pool", "too many connections"],
    ),
    (
        DocumentStoreCause::Authentication,
        &["unauthorized", "authentication", "auth failed", "permission denied", "forbidden"],
    ),
    (
        DocumentStoreCause::DocumentTooLarge,
        &["too large", "document size", "exceeds maximum", "bsonobjecttoolarge"],
    ),
    (
        DocumentStoreCause::DiskSpace,
        &["disk full", "no space", "quota exceeded"],
    ),
    (
        DocumentStoreCause::LockContention,
        &["lock contention", "locked", "deadlock", "write conflict", "lock wait"],
    ),
    (DocumentStoreCause::Timeout, &["timed out", "timeout"]),
    (
        DocumentStoreCause::Topology,
        &["not primary", "not master", "replica", "topology", "election", "stepped down"],
    ),
    (DocumentStoreCause::Index, &["index", "duplicate key"]),
    (
        DocumentStoreCause::Connectivity,
        &[
            "connection refused",
            "connection reset",
            "connection closed",
            "broken pipe",
            "unreachable",
            "network",
            "dns",
        ],
    ),
];

const CONNECTIVITY_DELAY: Duration = Duration::from_secs(2);
const LOCK_DELAY: Duration = Duration::from_millis(200);
const UNKNOWN_DELAY: Duration = Duration::from_secs(5);

/// A failed document store call
#[derive(Debug, Clone)]
pub struct DocumentStoreFailureAnalysis {
    pub session_id: String,
    pub operation: String,
    pub cause: String,
}

impl DocumentStoreFailureAnalysis {
    pub fn new(
        session_id: impl Into<String>,
        operation: impl Into<String>,
        cause: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            operation: operation.into(),
            cause: cause.into(),
        }
    }

    pub fn cause_category(&self) -> DocumentStoreCause {
        let cause = self.cause.to_lowercase();
        CAUSE_SIGNATURES
            .iter()
            .find(|(_, needles)| mentions(&cause, needles))
            .map(|(category, _)| *category)
            .unwrap_or(DocumentStoreCause::Unknown)
    }

    pub fn handling_strategy(&self) -> Recommendation<DocumentStoreAction> {
        let op = &self.operation;
        let (action, description) = match self.cause_category() {
            DocumentStoreCause::ConnectionPool => (
                DocumentStoreAction::SwitchConnection,
                format!("{} exhausted the connection pool; use a fresh connection", op),
            ),
            DocumentStoreCause::Authentication => (
                DocumentStoreAction::Reject,
                format!("{} was not authorized; check database credentials", op),
            ),
            DocumentStoreCause::DocumentTooLarge => (
                DocumentStoreAction::Reject,
                format!("{} exceeded the document size limit; use overflow storage", op),
            ),
            DocumentStoreCause::DiskSpace => (
                DocumentStoreAction::FallbackToLocal,
                format!("database is out of space during {}; keep a local copy", op),
            ),
            DocumentStoreCause::LockContention => (
                DocumentStoreAction::DelayedRetry { delay: LOCK_DELAY },
                format!("{} hit lock contention; retry shortly", op),
            ),
            DocumentStoreCause::Timeout => (
                DocumentStoreAction::ImmediateRetry,
                format!("{} timed out; retry now", op),
            ),
            DocumentStoreCause::Topology => (
                DocumentStoreAction::SwitchConnection,
                format!("{} hit a replica set change; reconnect to the new primary", op),
            ),
            DocumentStoreCause::Index => (
                DocumentStoreAction::Reject,
                format!("{} violated an index constraint", op),
            ),
            DocumentStoreCause::Connectivity => (
                DocumentStoreAction::DelayedRetry {
                    delay: CONNECTIVITY_DELAY,
                },
                format!("database unreachable during {}; retry after a pause", op),
            ),
            DocumentStoreCause::Unknown => (
                DocumentStoreAction::DelayedRetry {
                    delay: UNKNOWN_DELAY,
                },
                format!("unrecognized failure during {}: {}", op, self.cause),
            ),
        };

        let should_retry = matches!(
            action,
            DocumentStoreAction::ImmediateRetry
                | DocumentStoreAction::DelayedRetry { .. }
                | DocumentStoreAction::SwitchConnection
        );

        Recommendation {
            action,
            should_retry,
            description,
        }
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
