// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory document store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{encode_document, DocumentStore};
use crate::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sv_core::SessionRecord;

/// Document store operations, used to target injected faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentOp {
    Get,
    Upsert,
    Delete,
    Touch,
    ListIds,
}

/// Recorded document store call
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentCall {
    Get { id: String },
    Upsert { id: String },
    Delete { id: String },
    Touch { id: String, at: DateTime<Utc> },
    ListIds,
}

impl DocumentCall {
    pub fn op(&self) -> DocumentOp {
        match self {
            DocumentCall::Get { .. } => DocumentOp::Get,
            DocumentCall::Upsert { .. } => DocumentOp::Upsert,
            DocumentCall::Delete { .. } => DocumentOp::Delete,
            DocumentCall::Touch { .. } => DocumentOp::Touch,
            DocumentCall::ListIds => DocumentOp::ListIds,
        }
    }
}

#[derive(Default)]
struct Faults {
    queued: HashMap<DocumentOp, VecDeque<StoreError>>,
    sticky: HashMap<DocumentOp, StoreError>,
}

/// Fake document store for testing
///
/// Records every call and fails on demand. Serialized records are size
/// checked exactly like the real driver.
#[derive(Clone, Default)]
pub struct FakeDocumentStore {
    records: Arc<Mutex<BTreeMap<String, SessionRecord>>>,
    calls: Arc<Mutex<Vec<DocumentCall>>>,
    faults: Arc<Mutex<Faults>>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl FakeDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DocumentCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of recorded calls of one kind
    pub fn call_count(&self, op: DocumentOp) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    /// Seed a record without recording a call
    pub fn insert(&self, record: SessionRecord) {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id.clone(), record);
    }

    /// Peek at a record without recording a call
    pub fn record(&self, id: &str) -> Option<SessionRecord> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail the next call of `op` with `error`. Queued faults fire in order.
    pub fn fail_next(&self, op: DocumentOp, error: StoreError) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .queued
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Fail every call of `op` until [`heal`](Self::heal) is called
    pub fn fail_always(&self, op: DocumentOp, error: StoreError) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sticky
            .insert(op, error);
    }

    /// Drop all injected faults
    pub fn heal(&self) {
        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        faults.queued.clear();
        faults.sticky.clear();
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(|e| e.into_inner()) = Some(latency);
    }

    async fn enter(&self, call: DocumentCall) -> Result<(), StoreError> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);

        let latency = *self.latency.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(error) = faults.queued.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(error);
        }
        match faults.sticky.get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn get(&self, id: &str) -> Result<Option<SessionRecord>, StoreError> {
        self.enter(DocumentCall::Get { id: id.to_string() }).await?;
        Ok(self.record(id))
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.enter(DocumentCall::Upsert {
            id: record.id.clone(),
        })
        .await?;
        encode_document(record)?;
        self.insert(record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.enter(DocumentCall::Delete { id: id.to_string() })
            .await?;
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id)
            .is_some())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StoreError> {
        self.enter(DocumentCall::Touch {
            id: id.to_string(),
            at,
        })
        .await?;
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        match records.get_mut(id) {
            Some(record) => {
                record.last_updated = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        self.enter(DocumentCall::ListIds).await?;
        Ok(self
            .records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
