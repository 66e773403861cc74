// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage monitor: process-wide counters, per-session metrics and a
//! bounded history of recent failures.
//!
//! Counters are atomics; the session map and the history each guard only
//! their own mutation, so recording never blocks a storage call.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use sv_core::{CompressionType, ErrorKind, MonitorConfig, StorageError};

/// Metrics for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub size: u64,
    pub shard_count: u64,
    pub last_update: DateTime<Utc>,
    pub operation_count: u64,
    pub compression_ratio: f64,
}

/// One entry in the failure history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub operation: String,
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Serializable view of the monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    pub total_operations: u64,
    pub failures: u64,
    pub total_bytes: u64,
    pub active_shards: u64,
    pub compression_savings: u64,
    pub oversize_shards: u64,
    pub compression_failures: u64,
    pub average_operation_ms: f64,
    pub success_rate: f64,
    pub compression_savings_rate: f64,
    pub sessions: usize,
    pub recent_failures: Vec<ExceptionRecord>,
}

#[derive(Debug)]
pub struct StorageMonitor {
    total_operations: AtomicU64,
    total_time_us: AtomicU64,
    total_bytes: AtomicU64,
    active_shards: AtomicU64,
    compression_savings: AtomicU64,
    failures: AtomicU64,
    oversize_shards: AtomicU64,
    compression_failures: AtomicU64,
    sessions: DashMap<String, SessionMetrics>,
    history: Mutex<VecDeque<ExceptionRecord>>,
    history_size: usize,
}

impl StorageMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        let history_size = config.history_size.max(1);
        Self {
            total_operations: AtomicU64::new(0),
            total_time_us: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            active_shards: AtomicU64::new(0),
            compression_savings: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            oversize_shards: AtomicU64::new(0),
            compression_failures: AtomicU64::new(0),
            sessions: DashMap::new(),
            history: Mutex::new(VecDeque::with_capacity(history_size)),
            history_size,
        }
    }

    /// Count one storage call and its duration.
    pub fn record_operation(&self, session_id: &str, elapsed: Duration) {
        self.total_operations.fetch_add(1, Ordering::Relaxed);
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_time_us.fetch_add(micros, Ordering::Relaxed);
        if let Some(mut metrics) = self.sessions.get_mut(session_id) {
            metrics.operation_count += 1;
        }
    }

    /// Record a committed store.
    pub fn record_store(
        &self,
        session_id: &str,
        original_size: u64,
        stored_size: u64,
        shard_count: u64,
        now: DateTime<Utc>,
    ) {
        self.total_bytes.fetch_add(original_size, Ordering::Relaxed);
        self.compression_savings
            .fetch_add(original_size.saturating_sub(stored_size), Ordering::Relaxed);

        let compression_ratio = if original_size == 0 {
            1.0
        } else {
            stored_size as f64 / original_size as f64
        };

        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionMetrics {
                size: 0,
                shard_count: 0,
                last_update: now,
                operation_count: 0,
                compression_ratio: 1.0,
            });
        let previous_shards = entry.shard_count;
        entry.size = original_size;
        entry.shard_count = shard_count;
        entry.last_update = now;
        entry.operation_count += 1;
        entry.compression_ratio = compression_ratio;
        drop(entry);

        self.adjust_active_shards(previous_shards, shard_count);
    }

    /// Record a completed load.
    pub fn record_load(&self, session_id: &str, bytes: u64, now: DateTime<Utc>) {
        self.total_bytes.fetch_add(bytes, Ordering::Relaxed);
        if let Some(mut metrics) = self.sessions.get_mut(session_id) {
            metrics.last_update = now;
            metrics.operation_count += 1;
        }
    }

    /// Record a surfaced failure.
    pub fn record_failure(&self, error: &StorageError, size: Option<u64>) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        match error.kind {
            ErrorKind::DocumentSizeExceeded | ErrorKind::ShardSizeExceeded => {
                self.oversize_shards.fetch_add(1, Ordering::Relaxed);
            }
            ErrorKind::CompressionFailed => {
                self.compression_failures.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        self.push_history(ExceptionRecord {
            timestamp: error.timestamp,
            session_id: error.session_id.clone(),
            operation: error.operation.clone(),
            kind: error.kind,
            message: error.message.clone(),
            size,
        });
    }

    /// Record a payload that would not fit a document and was rerouted.
    pub fn record_oversize(&self, session_id: &str, size: u64, message: &str) {
        self.oversize_shards.fetch_add(1, Ordering::Relaxed);
        self.push_history(ExceptionRecord {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            operation: "store".to_string(),
            kind: ErrorKind::ShardSizeExceeded,
            message: message.to_string(),
            size: Some(size),
        });
    }

    /// Record a compression failure that was absorbed by a fallback.
    pub fn record_compression_failure(
        &self,
        session_id: &str,
        algorithm: CompressionType,
        size: u64,
        message: &str,
    ) {
        self.compression_failures.fetch_add(1, Ordering::Relaxed);
        self.push_history(ExceptionRecord {
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
            operation: format!("compress.{algorithm}"),
            kind: ErrorKind::CompressionFailed,
            message: message.to_string(),
            size: Some(size),
        });
    }

    pub fn remove_session(&self, session_id: &str) {
        if let Some((_, metrics)) = self.sessions.remove(session_id) {
            self.adjust_active_shards(metrics.shard_count, 0);
        }
    }

    pub fn session(&self, session_id: &str) -> Option<SessionMetrics> {
        self.sessions.get(session_id).map(|m| m.clone())
    }

    /// Oldest first
    pub fn recent_failures(&self) -> Vec<ExceptionRecord> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn total_operations(&self) -> u64 {
        self.total_operations.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn active_shards(&self) -> u64 {
        self.active_shards.load(Ordering::Relaxed)
    }

    pub fn average_operation_time(&self) -> Duration {
        let ops = self.total_operations();
        if ops == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.total_time_us.load(Ordering::Relaxed) / ops)
    }

    /// Fraction of operations that did not surface a failure
    pub fn success_rate(&self) -> f64 {
        let ops = self.total_operations();
        if ops == 0 {
            return 1.0;
        }
        let ok = ops.saturating_sub(self.failures());
        ok as f64 / ops as f64
    }

    /// Bytes saved by compression over bytes stored
    pub fn compression_savings_rate(&self) -> f64 {
        let total = self.total_bytes.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.compression_savings.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            total_operations: self.total_operations(),
            failures: self.failures(),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            active_shards: self.active_shards(),
            compression_savings: self.compression_savings.load(Ordering::Relaxed),
            oversize_shards: self.oversize_shards.load(Ordering::Relaxed),
            compression_failures: self.compression_failures.load(Ordering::Relaxed),
            average_operation_ms: self.average_operation_time().as_secs_f64() * 1000.0,
            success_rate: self.success_rate(),
            compression_savings_rate: self.compression_savings_rate(),
            sessions: self.sessions.len(),
            recent_failures: self.recent_failures(),
        }
    }

    fn push_history(&self, record: ExceptionRecord) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() == self.history_size {
            history.pop_front();
        }
        history.push_back(record);
    }

    fn adjust_active_shards(&self, previous: u64, current: u64) {
        if current >= previous {
            self.active_shards
                .fetch_add(current - previous, Ordering::Relaxed);
        } else {
            let delta = previous - current;
            // Saturate so a racing remove cannot wrap the counter
            let _ = self
                .active_shards
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                    Some(v.saturating_sub(delta))
                });
        }
    }
}

impl Default for StorageMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
