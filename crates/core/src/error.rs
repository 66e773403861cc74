// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error taxonomy.
//!
//! Every engine operation fails with a [`StorageError`]. Retry and
//! escalation decisions are made from the [`ErrorKind`] alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure categories for storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Network,
    TemporaryFailure,
    Timeout,
    DocumentSizeExceeded,
    InvalidData,
    AuthenticationFailed,
    CircuitBreakerOpen,
    OperationInterrupted,
    MaxRetriesExceeded,
    CompressionFailed,
    DocumentStoreOperationFailed,
    ShardSizeExceeded,
    Database,
    SessionNotFound,
    IncompleteSession,
    Unknown,
}

/// How the retry loop treats a failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry up to the configured attempt ceiling
    Retry,
    /// Surface immediately
    FailFast,
    /// Unclassified; allow a single retry
    RetryOnce,
}

impl ErrorKind {
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            ErrorKind::Network | ErrorKind::TemporaryFailure | ErrorKind::Timeout => {
                RetryPolicy::Retry
            }
            ErrorKind::DocumentSizeExceeded
            | ErrorKind::ShardSizeExceeded
            | ErrorKind::InvalidData
            | ErrorKind::AuthenticationFailed
            | ErrorKind::CircuitBreakerOpen
            | ErrorKind::OperationInterrupted
            | ErrorKind::MaxRetriesExceeded
            | ErrorKind::CompressionFailed
            | ErrorKind::SessionNotFound
            | ErrorKind::IncompleteSession => RetryPolicy::FailFast,
            ErrorKind::DocumentStoreOperationFailed | ErrorKind::Database | ErrorKind::Unknown => {
                RetryPolicy::RetryOnce
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retry_policy() == RetryPolicy::Retry
    }

    /// Failures that need operator attention rather than waiting out.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            ErrorKind::DocumentSizeExceeded
                | ErrorKind::ShardSizeExceeded
                | ErrorKind::InvalidData
                | ErrorKind::AuthenticationFailed
                | ErrorKind::CircuitBreakerOpen
                | ErrorKind::MaxRetriesExceeded
                | ErrorKind::IncompleteSession
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::TemporaryFailure => "temporary-failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::DocumentSizeExceeded => "document-size-exceeded",
            ErrorKind::InvalidData => "invalid-data",
            ErrorKind::AuthenticationFailed => "authentication-failed",
            ErrorKind::CircuitBreakerOpen => "circuit-breaker-open",
            ErrorKind::OperationInterrupted => "operation-interrupted",
            ErrorKind::MaxRetriesExceeded => "max-retries-exceeded",
            ErrorKind::CompressionFailed => "compression-failed",
            ErrorKind::DocumentStoreOperationFailed => "document-store-operation-failed",
            ErrorKind::ShardSizeExceeded => "shard-size-exceeded",
            ErrorKind::Database => "database",
            ErrorKind::SessionNotFound => "session-not-found",
            ErrorKind::IncompleteSession => "incomplete-session",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure returned by every storage operation
#[derive(Debug, Clone, Error)]
#[error("{kind} during {operation} for session {session_id}: {message}")]
pub struct StorageError {
    pub kind: ErrorKind,
    pub session_id: String,
    pub operation: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StorageError {
    pub fn new(
        kind: ErrorKind,
        session_id: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            session_id: session_id.into(),
            operation: operation.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn is_critical(&self) -> bool {
        self.kind.is_critical()
    }

    pub fn invalid_data(
        session_id: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidData, session_id, operation, message)
    }

    pub fn incomplete(session_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompleteSession, session_id, "load", message)
    }

    pub fn not_found(session_id: impl Into<String>, operation: impl Into<String>) -> Self {
        let session_id = session_id.into();
        let message = format!("no session record for {}", session_id);
        Self::new(ErrorKind::SessionNotFound, session_id, operation, message)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
