// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver errors shared by the document and blob stores

use sv_core::{ErrorKind, StorageError};
use thiserror::Error;

/// Failure reported by a store driver.
///
/// Cloneable so fakes can replay an injected fault more than once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("authentication failed: {0}")]
    Unauthorized(String),
    #[error("document too large: {size} bytes exceeds the {limit} byte limit")]
    DocumentTooLarge { size: u64, limit: u64 },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store busy: {0}")]
    Busy(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Position in the engine's failure taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Unavailable(_) => ErrorKind::Network,
            StoreError::Timeout(_) => ErrorKind::Timeout,
            StoreError::Unauthorized(_) => ErrorKind::AuthenticationFailed,
            StoreError::DocumentTooLarge { .. } => ErrorKind::DocumentSizeExceeded,
            StoreError::NotFound(_) => ErrorKind::SessionNotFound,
            StoreError::Busy(_) => ErrorKind::TemporaryFailure,
            StoreError::Io(_) => ErrorKind::Database,
            StoreError::Serialization(_) => ErrorKind::InvalidData,
            StoreError::Other(_) => ErrorKind::DocumentStoreOperationFailed,
        }
    }

    /// Lift into the engine error for `operation` on `session_id`
    pub fn at(&self, session_id: &str, operation: &str) -> StorageError {
        StorageError::new(self.kind(), session_id, operation, self.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind as Io;
        match e.kind() {
            Io::NotFound => StoreError::NotFound(e.to_string()),
            Io::TimedOut => StoreError::Timeout(e.to_string()),
            Io::PermissionDenied => StoreError::Unauthorized(e.to_string()),
            Io::ConnectionRefused | Io::ConnectionReset | Io::ConnectionAborted => {
                StoreError::Unavailable(e.to_string())
            }
            Io::WouldBlock | Io::Interrupted => StoreError::Busy(e.to_string()),
            _ => StoreError::Io(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
